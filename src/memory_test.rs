#![allow(clippy::float_cmp)]

use std::time::Duration;

use uuid::Uuid;

use super::*;
use crate::model::{Arrowhead, CardContent, ConnectionMeta, CreatedBy};

fn card(x: f64, y: f64) -> Shape {
    Shape::new(Point::new(x, y), CardContent::Note { text: "n".into() })
}

fn link(parent: ShapeId, child: ShapeId) -> Connection {
    Connection {
        id: Uuid::new_v4(),
        start: Point::new(0.0, 0.0),
        end: Point::new(10.0, 10.0),
        arrowhead_start: Arrowhead::None,
        arrowhead_end: Arrowhead::None,
        z_index: 0,
        meta: ConnectionMeta { is_parent_child_connection: true, parent_id: parent, child_id: child, created_by: CreatedBy::System },
    }
}

fn linked_pair(scene: &mut MemoryScene) -> (ShapeId, ShapeId, ShapeId) {
    let a = card(0.0, 0.0);
    let b = card(0.0, 400.0);
    let (a_id, b_id) = (a.id, b.id);
    scene.create_shape(a).unwrap();
    scene.create_shape(b).unwrap();
    let conn = link(a_id, b_id);
    let conn_id = conn.id;
    scene.create_connection(conn).unwrap();
    scene.create_binding(Binding::centered(conn_id, a_id, Terminal::Start, 0.5)).unwrap();
    scene.create_binding(Binding::centered(conn_id, b_id, Terminal::End, 0.5)).unwrap();
    (a_id, b_id, conn_id)
}

// =============================================================
// Records
// =============================================================

#[test]
fn new_scene_is_empty() {
    let scene = MemoryScene::new();
    assert!(scene.is_empty());
    assert_eq!(scene.len(), 0);
    assert!(scene.commits_synchronously());
}

#[test]
fn create_and_get_shape() {
    let mut scene = MemoryScene::new();
    let shape = card(5.0, 6.0);
    let id = shape.id;
    scene.create_shape(shape).unwrap();
    assert_eq!(scene.shape(id).unwrap().x, 5.0);
    assert_eq!(scene.page_bounds(id).unwrap(), Aabb::new(5.0, 6.0, 280.0, 160.0));
}

#[test]
fn create_duplicate_shape_rejected() {
    let mut scene = MemoryScene::new();
    let shape = card(0.0, 0.0);
    scene.create_shape(shape.clone()).unwrap();
    assert_eq!(scene.create_shape(shape.clone()), Err(SceneError::Duplicate(shape.id)));
}

#[test]
fn shapes_excludes_connections() {
    let mut scene = MemoryScene::new();
    linked_pair(&mut scene);
    assert_eq!(scene.shapes().len(), 2);
    assert_eq!(scene.connections().len(), 1);
    assert_eq!(scene.len(), 3);
}

#[test]
fn update_shape_applies_present_fields() {
    let mut scene = MemoryScene::new();
    let shape = card(0.0, 0.0);
    let id = shape.id;
    scene.create_shape(shape).unwrap();
    scene.update_shape(id, ShapeUpdate { y: Some(99.0), measured_height: Some(500.0), ..Default::default() }).unwrap();
    let got = scene.shape(id).unwrap();
    assert_eq!(got.x, 0.0);
    assert_eq!(got.y, 99.0);
    assert_eq!(got.effective_height(), 500.0);
}

#[test]
fn update_missing_shape_fails() {
    let mut scene = MemoryScene::new();
    let id = Uuid::new_v4();
    assert_eq!(scene.update_shape(id, ShapeUpdate::default()), Err(SceneError::NotFound(id)));
}

#[test]
fn binding_requires_existing_endpoints() {
    let mut scene = MemoryScene::new();
    let shape = card(0.0, 0.0);
    let shape_id = shape.id;
    scene.create_shape(shape).unwrap();
    let missing_conn = Uuid::new_v4();
    let result = scene.create_binding(Binding::centered(missing_conn, shape_id, Terminal::Start, 0.5));
    assert_eq!(result, Err(SceneError::NotFound(missing_conn)));
}

#[test]
fn binding_queries_filter_by_direction() {
    let mut scene = MemoryScene::new();
    let (a, b, conn) = linked_pair(&mut scene);
    assert_eq!(scene.bindings_from_shape(conn, BindingKind::Arrow).len(), 2);
    let to_a = scene.bindings_to_shape(a, BindingKind::Arrow);
    assert_eq!(to_a.len(), 1);
    assert_eq!(to_a[0].terminal, Terminal::Start);
    let to_b = scene.bindings_to_shape(b, BindingKind::Arrow);
    assert_eq!(to_b[0].terminal, Terminal::End);
}

// =============================================================
// Delete + undo
// =============================================================

#[test]
fn delete_removes_bindings_touching_targets() {
    let mut scene = MemoryScene::new();
    let (a, b, conn) = linked_pair(&mut scene);
    scene.delete_shapes(&[a, conn]).unwrap();
    assert!(scene.shape(a).is_none());
    assert!(scene.connection(conn).is_none());
    assert!(scene.shape(b).is_some());
    assert!(scene.bindings().is_empty());
}

#[test]
fn delete_is_one_history_entry() {
    let mut scene = MemoryScene::new();
    let (a, b, conn) = linked_pair(&mut scene);
    let before = scene.history().len();
    scene.delete_shapes(&[a, b, conn]).unwrap();
    assert_eq!(scene.history().len(), before + 1);
    assert!(matches!(scene.history().last(), Some(HistoryEntry::Delete(_))));
}

#[test]
fn delete_missing_ids_is_noop() {
    let mut scene = MemoryScene::new();
    scene.delete_shapes(&[Uuid::new_v4()]).unwrap();
    scene.delete_shapes(&[]).unwrap();
    assert!(scene.history().is_empty());
}

#[test]
fn undo_restores_whole_batch() {
    let mut scene = MemoryScene::new();
    let (a, b, conn) = linked_pair(&mut scene);
    scene.delete_shapes(&[a, conn]).unwrap();
    assert!(scene.undo());
    assert!(scene.shape(a).is_some());
    assert!(scene.shape(b).is_some());
    assert!(scene.connection(conn).is_some());
    assert_eq!(scene.bindings().len(), 2);
}

#[test]
fn undo_on_empty_history() {
    let mut scene = MemoryScene::new();
    assert!(!scene.undo());
}

// =============================================================
// Draw order
// =============================================================

#[test]
fn new_records_stack_on_top() {
    let mut scene = MemoryScene::new();
    let a = card(0.0, 0.0);
    let b = card(0.0, 0.0);
    let (a_id, b_id) = (a.id, b.id);
    scene.create_shape(a).unwrap();
    scene.create_shape(b).unwrap();
    assert!(scene.shape(b_id).unwrap().z_index > scene.shape(a_id).unwrap().z_index);
}

#[test]
fn send_to_back_goes_below_everything() {
    let mut scene = MemoryScene::new();
    let (a, b, conn) = linked_pair(&mut scene);
    scene.send_to_back(&[conn]);
    let conn_z = scene.connection(conn).unwrap().z_index;
    assert!(conn_z < scene.shape(a).unwrap().z_index);
    assert!(conn_z < scene.shape(b).unwrap().z_index);
    assert_eq!(scene.snapshot().connections[0].id, conn);
}

// =============================================================
// Commit lag
// =============================================================

#[tokio::test]
async fn lagged_bindings_publish_after_frames() {
    let mut scene = MemoryScene::new().with_commit_lag(2);
    assert!(!scene.commits_synchronously());
    let (_, _, conn) = linked_pair(&mut scene);
    assert!(scene.bindings_from_shape(conn, BindingKind::Arrow).is_empty());
    assert_eq!(scene.pending_bindings(), 2);

    scene.after_frames(1).await;
    assert!(scene.bindings_from_shape(conn, BindingKind::Arrow).is_empty());

    scene.after_frames(1).await;
    assert_eq!(scene.bindings_from_shape(conn, BindingKind::Arrow).len(), 2);
    assert_eq!(scene.pending_bindings(), 0);
    assert_eq!(scene.frames(), 2);
}

#[test]
fn delete_discards_pending_bindings() {
    let mut scene = MemoryScene::new().with_commit_lag(3);
    let (a, _, conn) = linked_pair(&mut scene);
    scene.delete_shapes(&[a, conn]).unwrap();
    assert_eq!(scene.pending_bindings(), 0);
}

// =============================================================
// Faults
// =============================================================

#[test]
fn faults_fire_once() {
    let mut scene = MemoryScene::new();
    scene.inject(Fault::CreateShape);
    assert!(scene.create_shape(card(0.0, 0.0)).is_err());
    assert!(scene.create_shape(card(0.0, 0.0)).is_ok());
}

#[test]
fn dropped_binding_reports_success_but_stores_nothing() {
    let mut scene = MemoryScene::new();
    scene.inject(Fault::DropBinding(Terminal::End));
    let (_, b, conn) = linked_pair(&mut scene);
    assert_eq!(scene.bindings_from_shape(conn, BindingKind::Arrow).len(), 1);
    assert!(scene.bindings_to_shape(b, BindingKind::Arrow).is_empty());
}

// =============================================================
// Camera
// =============================================================

#[test]
fn center_on_point_moves_camera() {
    let mut scene = MemoryScene::new().with_viewport(1000.0, 600.0);
    let target = Point::new(321.0, -45.0);
    scene
        .center_on_point(target, CenterOptions { animation: Some(Duration::from_millis(300)) })
        .unwrap();
    let center = scene.viewport_center();
    assert!((center.x - target.x).abs() < 1e-9);
    assert!((center.y - target.y).abs() < 1e-9);
    assert!(scene.last_pan_animated());
}

// =============================================================
// Snapshot
// =============================================================

#[test]
fn snapshot_roundtrips_through_json() {
    let mut scene = MemoryScene::new();
    linked_pair(&mut scene);
    let snapshot = scene.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let back: SceneSnapshot = serde_json::from_str(&json).unwrap();

    let mut restored = MemoryScene::new();
    restored.load_snapshot(back);
    assert_eq!(restored.snapshot(), snapshot);
    assert!(restored.history().is_empty());
}
