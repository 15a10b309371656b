//! In-memory scene store implementing the Scene Access Facade.
//!
//! This is the host-side reference store: the demo binary runs on it and the
//! tests drive the engine through it. It keeps cards, connections, and
//! bindings in separate maps, records an undo history where a batch delete is
//! exactly one entry, owns the camera, and can simulate a store that only
//! publishes bindings a few frames after they were written.
//!
//! `Fault`s make the next matching facade call fail (or silently drop a
//! binding) so rollback paths can be exercised deterministically.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::geometry::{Aabb, Point, Size};
use crate::model::{Binding, BindingId, BindingKind, Connection, Shape, ShapeId, Terminal};
use crate::scene::{CenterOptions, SceneAccess, SceneError, ShapeUpdate};

// =============================================================================
// TYPES
// =============================================================================

/// One-shot failure injected into the next matching facade call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    CreateShape,
    CreateConnection,
    /// `create_binding` for this terminal returns an error.
    CreateBinding(Terminal),
    /// `create_binding` for this terminal reports success but stores nothing.
    DropBinding(Terminal),
    CenterOnPoint,
    DeleteShapes,
}

/// Records removed by one `delete_shapes` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovedRecords {
    pub shapes: Vec<Shape>,
    pub connections: Vec<Connection>,
    pub bindings: Vec<Binding>,
}

impl RemovedRecords {
    fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.connections.is_empty() && self.bindings.is_empty()
    }
}

/// A single undoable step.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    CreateShape(ShapeId),
    CreateConnection(ShapeId),
    CreateBinding(BindingId),
    Delete(RemovedRecords),
}

/// Serializable copy of every committed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub shapes: Vec<Shape>,
    pub connections: Vec<Connection>,
    pub bindings: Vec<Binding>,
}

struct PendingBinding {
    frames_left: u32,
    binding: Binding,
}

// =============================================================================
// STORE
// =============================================================================

pub struct MemoryScene {
    shapes: HashMap<ShapeId, Shape>,
    connections: HashMap<ShapeId, Connection>,
    bindings: HashMap<BindingId, Binding>,
    pending: Vec<PendingBinding>,
    commit_lag: u32,
    history: Vec<HistoryEntry>,
    faults: HashSet<Fault>,
    camera: Camera,
    frames: u64,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// Create an empty scene whose writes are visible immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shapes: HashMap::new(),
            connections: HashMap::new(),
            bindings: HashMap::new(),
            pending: Vec::new(),
            commit_lag: 0,
            history: Vec::new(),
            faults: HashSet::new(),
            camera: Camera::default(),
            frames: 0,
        }
    }

    /// Publish new bindings only after `frames` render passes.
    #[must_use]
    pub fn with_commit_lag(mut self, frames: u32) -> Self {
        self.commit_lag = frames;
        self
    }

    #[must_use]
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.camera = Camera::with_viewport(Size::new(width, height));
        self
    }

    /// Arm a one-shot fault.
    pub fn inject(&mut self, fault: Fault) {
        self.faults.insert(fault);
    }

    fn take_fault(&mut self, fault: Fault) -> bool {
        self.faults.remove(&fault)
    }

    fn next_z(&self) -> i64 {
        let shapes = self.shapes.values().map(|s| s.z_index);
        let connections = self.connections.values().map(|c| c.z_index);
        shapes.chain(connections).max().map_or(0, |z| z + 1)
    }

    fn min_z(&self) -> i64 {
        let shapes = self.shapes.values().map(|s| s.z_index);
        let connections = self.connections.values().map(|c| c.z_index);
        shapes.chain(connections).min().unwrap_or(0)
    }

    fn exists(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id) || self.connections.contains_key(&id)
    }

    // --- Queries ---

    /// Every committed connection, sorted by id.
    #[must_use]
    pub fn connections(&self) -> Vec<Connection> {
        let mut out: Vec<Connection> = self.connections.values().cloned().collect();
        out.sort_by_key(|c| c.id);
        out
    }

    /// Every committed binding, sorted by id.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        let mut out: Vec<Binding> = self.bindings.values().cloned().collect();
        out.sort_by_key(|b| b.id);
        out
    }

    /// Bindings written but not yet visible to queries.
    #[must_use]
    pub fn pending_bindings(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Page-space point at the center of the viewport.
    #[must_use]
    pub fn viewport_center(&self) -> Point {
        self.camera.focus()
    }

    #[must_use]
    pub fn last_pan_animated(&self) -> bool {
        self.camera.last_pan_animated()
    }

    /// Render passes completed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of cards plus connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len() + self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.connections.is_empty()
    }

    // --- Snapshot ---

    /// Copy every committed record, sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        let mut connections = self.connections();
        connections.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        SceneSnapshot { shapes: self.shapes(), connections, bindings: self.bindings() }
    }

    /// Replace all records with a snapshot. Clears history and pending writes.
    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) {
        self.shapes = snapshot.shapes.into_iter().map(|s| (s.id, s)).collect();
        self.connections = snapshot.connections.into_iter().map(|c| (c.id, c)).collect();
        self.bindings = snapshot.bindings.into_iter().map(|b| (b.id, b)).collect();
        self.pending.clear();
        self.history.clear();
    }

    // --- Frames ---

    /// Advance one render pass, publishing bindings whose lag has elapsed.
    pub fn tick(&mut self) {
        self.frames += 1;
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut p in self.pending.drain(..) {
            p.frames_left = p.frames_left.saturating_sub(1);
            if p.frames_left == 0 {
                self.bindings.insert(p.binding.id, p.binding);
            } else {
                still_pending.push(p);
            }
        }
        self.pending = still_pending;
    }

    // --- Undo ---

    /// Revert the most recent history entry. Returns `false` when empty.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop() else {
            return false;
        };
        match entry {
            HistoryEntry::CreateShape(id) => {
                self.shapes.remove(&id);
            }
            HistoryEntry::CreateConnection(id) => {
                self.connections.remove(&id);
            }
            HistoryEntry::CreateBinding(id) => {
                self.bindings.remove(&id);
                self.pending.retain(|p| p.binding.id != id);
            }
            HistoryEntry::Delete(removed) => {
                for shape in removed.shapes {
                    self.shapes.insert(shape.id, shape);
                }
                for connection in removed.connections {
                    self.connections.insert(connection.id, connection);
                }
                for binding in removed.bindings {
                    self.bindings.insert(binding.id, binding);
                }
            }
        }
        true
    }
}

// =============================================================================
// FACADE
// =============================================================================

#[async_trait]
impl SceneAccess for MemoryScene {
    fn shape(&self, id: ShapeId) -> Option<Shape> {
        self.shapes.get(&id).cloned()
    }

    fn shapes(&self) -> Vec<Shape> {
        let mut out: Vec<Shape> = self.shapes.values().cloned().collect();
        out.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        out
    }

    fn connection(&self, id: ShapeId) -> Option<Connection> {
        self.connections.get(&id).cloned()
    }

    fn page_bounds(&self, id: ShapeId) -> Option<Aabb> {
        if let Some(shape) = self.shapes.get(&id) {
            return Some(shape.bounds());
        }
        self.connections.get(&id).map(Connection::bounds)
    }

    fn create_shape(&mut self, mut shape: Shape) -> Result<(), SceneError> {
        if self.take_fault(Fault::CreateShape) {
            return Err(SceneError::Rejected { op: "create_shape", reason: "injected fault".into() });
        }
        if self.exists(shape.id) {
            return Err(SceneError::Duplicate(shape.id));
        }
        shape.z_index = self.next_z();
        self.history.push(HistoryEntry::CreateShape(shape.id));
        self.shapes.insert(shape.id, shape);
        Ok(())
    }

    fn update_shape(&mut self, id: ShapeId, update: ShapeUpdate) -> Result<(), SceneError> {
        let shape = self.shapes.get_mut(&id).ok_or(SceneError::NotFound(id))?;
        if let Some(x) = update.x {
            shape.x = x;
        }
        if let Some(y) = update.y {
            shape.y = y;
        }
        if let Some(h) = update.measured_height {
            shape.measured_height = Some(h);
        }
        if let Some(flow) = update.flow_id {
            shape.flow_id = Some(flow);
        }
        Ok(())
    }

    fn create_connection(&mut self, mut connection: Connection) -> Result<(), SceneError> {
        if self.take_fault(Fault::CreateConnection) {
            return Err(SceneError::Rejected { op: "create_connection", reason: "injected fault".into() });
        }
        if self.exists(connection.id) {
            return Err(SceneError::Duplicate(connection.id));
        }
        connection.z_index = self.next_z();
        self.history.push(HistoryEntry::CreateConnection(connection.id));
        self.connections.insert(connection.id, connection);
        Ok(())
    }

    fn delete_shapes(&mut self, ids: &[ShapeId]) -> Result<(), SceneError> {
        if self.take_fault(Fault::DeleteShapes) {
            return Err(SceneError::Rejected { op: "delete_shapes", reason: "injected fault".into() });
        }
        let targets: HashSet<ShapeId> = ids.iter().copied().collect();
        let mut removed = RemovedRecords::default();

        for id in &targets {
            if let Some(shape) = self.shapes.remove(id) {
                removed.shapes.push(shape);
            }
            if let Some(connection) = self.connections.remove(id) {
                removed.connections.push(connection);
            }
        }

        let touching: Vec<BindingId> = self
            .bindings
            .values()
            .filter(|b| targets.contains(&b.from_id) || targets.contains(&b.to_id))
            .map(|b| b.id)
            .collect();
        for id in touching {
            if let Some(binding) = self.bindings.remove(&id) {
                removed.bindings.push(binding);
            }
        }
        self.pending
            .retain(|p| !targets.contains(&p.binding.from_id) && !targets.contains(&p.binding.to_id));

        if !removed.is_empty() {
            self.history.push(HistoryEntry::Delete(removed));
        }
        Ok(())
    }

    fn create_binding(&mut self, binding: Binding) -> Result<(), SceneError> {
        if self.take_fault(Fault::CreateBinding(binding.terminal)) {
            return Err(SceneError::Rejected { op: "create_binding", reason: "injected fault".into() });
        }
        if !self.connections.contains_key(&binding.from_id) {
            return Err(SceneError::NotFound(binding.from_id));
        }
        if !self.shapes.contains_key(&binding.to_id) {
            return Err(SceneError::NotFound(binding.to_id));
        }
        if self.take_fault(Fault::DropBinding(binding.terminal)) {
            return Ok(());
        }
        self.history.push(HistoryEntry::CreateBinding(binding.id));
        if self.commit_lag == 0 {
            self.bindings.insert(binding.id, binding);
        } else {
            self.pending.push(PendingBinding { frames_left: self.commit_lag, binding });
        }
        Ok(())
    }

    fn bindings_to_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding> {
        let mut out: Vec<Binding> = self
            .bindings
            .values()
            .filter(|b| b.to_id == id && b.kind == kind)
            .cloned()
            .collect();
        out.sort_by_key(|b| b.id);
        out
    }

    fn bindings_from_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding> {
        let mut out: Vec<Binding> = self
            .bindings
            .values()
            .filter(|b| b.from_id == id && b.kind == kind)
            .cloned()
            .collect();
        out.sort_by_key(|b| b.id);
        out
    }

    fn send_to_back(&mut self, ids: &[ShapeId]) {
        let mut z = self.min_z() - 1;
        for id in ids {
            if let Some(shape) = self.shapes.get_mut(id) {
                shape.z_index = z;
                z -= 1;
            } else if let Some(connection) = self.connections.get_mut(id) {
                connection.z_index = z;
                z -= 1;
            }
        }
    }

    fn center_on_point(&mut self, point: Point, options: CenterOptions) -> Result<(), SceneError> {
        if self.take_fault(Fault::CenterOnPoint) {
            return Err(SceneError::Rejected { op: "center_on_point", reason: "injected fault".into() });
        }
        self.camera.pan_to(point, options.animation);
        Ok(())
    }

    async fn after_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            tokio::task::yield_now().await;
            self.tick();
        }
    }

    fn commits_synchronously(&self) -> bool {
        self.commit_lag == 0
    }
}
