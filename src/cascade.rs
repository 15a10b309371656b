//! Cascade resolver: delete cards together with every connection bound to them.
//!
//! DESIGN
//! ======
//! Connections are leaves: nothing binds to a connection, so collecting the
//! `from_id` of every binding that points at a target is a complete closure
//! in one hop. The targets and the discovered connections are then deleted
//! in a single facade call so the host records one undo step.

#[cfg(test)]
#[path = "cascade_test.rs"]
mod cascade_test;

use std::collections::BTreeSet;

use crate::model::{BindingKind, ShapeId};
use crate::scene::{SceneAccess, SceneError};

/// What a cascade delete removed, by requested id count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadeReport {
    /// Ids passed in by the caller.
    pub targets: usize,
    /// Connections discovered through bindings that were not already targets.
    pub connections: usize,
}

/// Connections bound to any of `targets`, excluding the targets themselves.
#[must_use]
pub fn resolve_cascade<S>(scene: &S, targets: &BTreeSet<ShapeId>) -> BTreeSet<ShapeId>
where
    S: SceneAccess + ?Sized,
{
    targets
        .iter()
        .flat_map(|id| scene.bindings_to_shape(*id, BindingKind::Arrow))
        .map(|b| b.from_id)
        .filter(|from| !targets.contains(from))
        .collect()
}

/// Delete `targets` and every connection bound to them as one undo step.
///
/// Empty input, or ids already gone from the scene, are no-ops.
///
/// # Errors
///
/// Returns `SceneError` if the host fails the batch delete.
pub fn cascade_delete<S>(scene: &mut S, targets: &BTreeSet<ShapeId>) -> Result<CascadeReport, SceneError>
where
    S: SceneAccess + ?Sized,
{
    if targets.is_empty() {
        return Ok(CascadeReport::default());
    }
    let connections = resolve_cascade(scene, targets);
    let batch: Vec<ShapeId> = targets.iter().chain(connections.iter()).copied().collect();
    scene.delete_shapes(&batch)?;

    tracing::debug!(targets = targets.len(), connections = connections.len(), "cascade delete");
    Ok(CascadeReport { targets: targets.len(), connections: connections.len() })
}
