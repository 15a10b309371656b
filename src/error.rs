//! Error taxonomy for engine operations.

use crate::model::ShapeId;
use crate::scene::SceneError;

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("parent shape not found: {0}")]
    ParentNotFound(ShapeId),
    #[error("parent and child are the same shape: {0}")]
    SelfLoop(ShapeId),
    #[error("shape creation failed: {0}")]
    ShapeCreationFailed(#[source] SceneError),
    #[error("connection creation failed: {0}")]
    ArrowCreationFailed(#[source] SceneError),
    #[error("connection {connection_id} incomplete: start bindings {starts}, end bindings {ends}")]
    BindingIncomplete { connection_id: ShapeId, starts: usize, ends: usize },
    #[error("page bounds unavailable for shape {0}")]
    BoundsUnavailable(ShapeId),
    #[error("camera pan failed: {0}")]
    CameraPanFailed(#[source] SceneError),
}

impl EngineError {
    /// Stable machine-readable code for hosts that report errors by string.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ParentNotFound(_) => "E_PARENT_NOT_FOUND",
            Self::SelfLoop(_) => "E_SELF_LOOP",
            Self::ShapeCreationFailed(_) => "E_SHAPE_CREATION_FAILED",
            Self::ArrowCreationFailed(_) => "E_ARROW_CREATION_FAILED",
            Self::BindingIncomplete { .. } => "E_BINDING_INCOMPLETE",
            Self::BoundsUnavailable(_) => "E_BOUNDS_UNAVAILABLE",
            Self::CameraPanFailed(_) => "E_CAMERA_PAN_FAILED",
        }
    }
}
