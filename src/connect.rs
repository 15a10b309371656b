//! Connection builder: parent→child connections bound at both terminals.
//!
//! DESIGN
//! ======
//! A connection record only carries point hints; what keeps it attached to
//! the cards are two binding records, `start → parent` and `end → child`.
//! If either binding cannot be written the half-built connection is deleted
//! before the error is returned, so callers never see a connection that
//! could escape a child-keyed cascade.

#[cfg(test)]
#[path = "connect_test.rs"]
mod connect_test;

use uuid::Uuid;

use crate::consts::CENTER_ANCHOR;
use crate::error::{EngineError, EngineResult};
use crate::model::{Arrowhead, Binding, BindingKind, Connection, ConnectionMeta, CreatedBy, ShapeId, Terminal};
use crate::scene::{SceneAccess, SceneError};

/// Create a parent→child connection and bind both terminals.
///
/// # Errors
///
/// - `SelfLoop` if `parent_id == child_id`.
/// - `BoundsUnavailable` if either card's page bounds cannot be resolved.
/// - `ArrowCreationFailed` if the connection or either binding is refused.
pub fn connect<S>(scene: &mut S, parent_id: ShapeId, child_id: ShapeId) -> EngineResult<ShapeId>
where
    S: SceneAccess + ?Sized,
{
    if parent_id == child_id {
        return Err(EngineError::SelfLoop(parent_id));
    }
    let parent_bounds = scene
        .page_bounds(parent_id)
        .ok_or(EngineError::BoundsUnavailable(parent_id))?;
    let child_bounds = scene
        .page_bounds(child_id)
        .ok_or(EngineError::BoundsUnavailable(child_id))?;

    let connection = Connection {
        id: Uuid::new_v4(),
        start: parent_bounds.center(),
        end: child_bounds.center(),
        arrowhead_start: Arrowhead::None,
        arrowhead_end: Arrowhead::None,
        z_index: 0,
        meta: ConnectionMeta { is_parent_child_connection: true, parent_id, child_id, created_by: CreatedBy::System },
    };
    let connection_id = connection.id;
    scene
        .create_connection(connection)
        .map_err(EngineError::ArrowCreationFailed)?;

    if let Err(e) = bind_terminals(scene, connection_id, parent_id, child_id) {
        if let Err(cleanup) = scene.delete_shapes(&[connection_id]) {
            tracing::warn!(%connection_id, error = %cleanup, "failed to discard half-built connection");
        }
        return Err(EngineError::ArrowCreationFailed(e));
    }

    scene.send_to_back(&[connection_id]);
    tracing::debug!(%connection_id, %parent_id, %child_id, "connection created");
    Ok(connection_id)
}

fn bind_terminals<S>(scene: &mut S, connection_id: ShapeId, parent_id: ShapeId, child_id: ShapeId) -> Result<(), SceneError>
where
    S: SceneAccess + ?Sized,
{
    scene.create_binding(Binding::centered(connection_id, parent_id, Terminal::Start, CENTER_ANCHOR))?;
    scene.create_binding(Binding::centered(connection_id, child_id, Terminal::End, CENTER_ANCHOR))
}

/// Count bindings on `connection_id` for each terminal, as `(starts, ends)`.
///
/// Only bindings pointing at the expected card are counted.
#[must_use]
pub fn terminal_counts<S>(scene: &S, connection_id: ShapeId, parent_id: ShapeId, child_id: ShapeId) -> (usize, usize)
where
    S: SceneAccess + ?Sized,
{
    let bindings = scene.bindings_from_shape(connection_id, BindingKind::Arrow);
    let starts = bindings
        .iter()
        .filter(|b| b.terminal == Terminal::Start && b.to_id == parent_id)
        .count();
    let ends = bindings
        .iter()
        .filter(|b| b.terminal == Terminal::End && b.to_id == child_id)
        .count();
    (starts, ends)
}

/// The card bound at the other terminal of `connection_id`, if any.
fn far_end<S>(scene: &S, connection_id: ShapeId, terminal: Terminal) -> Option<ShapeId>
where
    S: SceneAccess + ?Sized,
{
    scene
        .bindings_from_shape(connection_id, BindingKind::Arrow)
        .into_iter()
        .find(|b| b.terminal == terminal)
        .map(|b| b.to_id)
}

fn is_parent_child<S>(scene: &S, connection_id: ShapeId) -> bool
where
    S: SceneAccess + ?Sized,
{
    scene
        .connection(connection_id)
        .is_some_and(|c| c.meta.is_parent_child_connection)
}

/// Parent of `child_id`, read through its incoming `end` binding.
#[must_use]
pub fn parent_of<S>(scene: &S, child_id: ShapeId) -> Option<ShapeId>
where
    S: SceneAccess + ?Sized,
{
    scene
        .bindings_to_shape(child_id, BindingKind::Arrow)
        .into_iter()
        .filter(|b| b.terminal == Terminal::End && is_parent_child(scene, b.from_id))
        .find_map(|b| far_end(scene, b.from_id, Terminal::Start))
}

/// Children of `parent_id`, read through its outgoing `start` bindings.
#[must_use]
pub fn children_of<S>(scene: &S, parent_id: ShapeId) -> Vec<ShapeId>
where
    S: SceneAccess + ?Sized,
{
    scene
        .bindings_to_shape(parent_id, BindingKind::Arrow)
        .into_iter()
        .filter(|b| b.terminal == Terminal::Start && is_parent_child(scene, b.from_id))
        .filter_map(|b| far_end(scene, b.from_id, Terminal::End))
        .collect()
}
