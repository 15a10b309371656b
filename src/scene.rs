//! Scene Access Facade: the host canvas store the engine reads and writes.
//!
//! DESIGN
//! ======
//! The engine never owns scene state. Every operation takes the facade as an
//! explicit `&S` / `&mut S` parameter. Hosts implement this trait over their
//! own store; `MemoryScene` is the in-process implementation used by the
//! demo binary and the tests.
//!
//! `after_frames` is the only suspension point the engine uses. Hosts whose
//! binding writes are visible immediately report `commits_synchronously()`
//! so the engine can skip the wait entirely.

use std::time::Duration;

use async_trait::async_trait;

use crate::geometry::{Aabb, Point};
use crate::model::{Binding, BindingKind, Connection, FlowId, Shape, ShapeId};

// =============================================================================
// TYPES
// =============================================================================

/// Failure reported by the host store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("record not found: {0}")]
    NotFound(ShapeId),
    #[error("duplicate record id: {0}")]
    Duplicate(ShapeId),
    #[error("scene rejected {op}: {reason}")]
    Rejected { op: &'static str, reason: String },
}

/// Options for `SceneAccess::center_on_point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CenterOptions {
    /// Animate the pan over this duration; `None` jumps immediately.
    pub animation: Option<Duration>,
}

/// Sparse update for a card. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub measured_height: Option<f64>,
    pub flow_id: Option<FlowId>,
}

// =============================================================================
// FACADE
// =============================================================================

#[async_trait]
pub trait SceneAccess: Send {
    /// Look up a card by id. Connections are not returned here.
    fn shape(&self, id: ShapeId) -> Option<Shape>;

    /// Every card in the scene. Connections are never included.
    fn shapes(&self) -> Vec<Shape>;

    /// Look up a connection by id.
    fn connection(&self, id: ShapeId) -> Option<Connection>;

    /// Page-space bounds of a card or connection, if it exists.
    fn page_bounds(&self, id: ShapeId) -> Option<Aabb>;

    /// Insert a new card.
    ///
    /// # Errors
    ///
    /// Returns `SceneError` if the host refuses the record.
    fn create_shape(&mut self, shape: Shape) -> Result<(), SceneError>;

    /// Apply a sparse update to an existing card.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the card does not exist.
    fn update_shape(&mut self, id: ShapeId, update: ShapeUpdate) -> Result<(), SceneError>;

    /// Insert a new connection record.
    ///
    /// # Errors
    ///
    /// Returns `SceneError` if the host refuses the record.
    fn create_connection(&mut self, connection: Connection) -> Result<(), SceneError>;

    /// Delete cards and connections as one undo step. Bindings touching any
    /// deleted record go with them. Missing ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SceneError` only when the host fails the whole batch.
    fn delete_shapes(&mut self, ids: &[ShapeId]) -> Result<(), SceneError>;

    /// Insert a new binding.
    ///
    /// # Errors
    ///
    /// Returns `SceneError` if the host refuses the record.
    fn create_binding(&mut self, binding: Binding) -> Result<(), SceneError>;

    /// Bindings whose `to_id` is `id`.
    fn bindings_to_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding>;

    /// Bindings whose `from_id` is `id`.
    fn bindings_from_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding>;

    /// Move records beneath everything else in draw order.
    fn send_to_back(&mut self, ids: &[ShapeId]);

    /// Pan the viewport so `point` sits at its center.
    ///
    /// # Errors
    ///
    /// Returns `SceneError` if the host camera cannot move.
    fn center_on_point(&mut self, point: Point, options: CenterOptions) -> Result<(), SceneError>;

    /// Resolve after `frames` render passes have completed.
    async fn after_frames(&mut self, frames: u32);

    /// Whether writes are visible to reads as soon as the write call returns.
    fn commits_synchronously(&self) -> bool {
        false
    }
}
