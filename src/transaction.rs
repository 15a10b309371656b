//! Child creation: place, create, connect, verify, and focus as one transaction.
//!
//! DESIGN
//! ======
//! Phases run in a fixed order: validate, prepare flow, place, create card,
//! connect, settle + verify bindings, focus camera, commit. Any failure after
//! the card exists rolls the scene back through the cascade resolver keyed on
//! the new card, so the connection (bound to the card) goes with it. Once the
//! builder has returned a connection id that id is added to the rollback set
//! too, which covers a connection whose `end` binding never landed.
//!
//! Rollback failures are logged and reported as `RollbackOutcome`; the error
//! returned to the caller is always the one that triggered the rollback.
//!
//! The transactional path holds `&mut S` across its settle wait, so no other
//! mutation of the same scene can interleave with it.

#[cfg(test)]
#[path = "transaction_test.rs"]
mod transaction_test;

use std::collections::BTreeSet;

use crate::cascade::{CascadeReport, cascade_delete};
use crate::config::{EngineConfig, PlacementConfig, SettleMode};
use crate::connect::{connect, terminal_counts};
use crate::error::{EngineError, EngineResult};
use crate::geometry::Point;
use crate::model::{CardContent, FlowId, Shape, ShapeId};
use crate::placement;
use crate::scene::{CenterOptions, SceneAccess, SceneError, ShapeUpdate};

// =============================================================================
// TYPES
// =============================================================================

/// Where the child's flow id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAssignment {
    /// Copied from the parent.
    Inherited,
    /// Freshly minted; the parent still has none and the caller should stamp it.
    Minted,
}

/// Result of a committed child creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildCreated {
    pub child_id: ShapeId,
    pub connection_id: ShapeId,
    pub flow_id: FlowId,
    pub flow: FlowAssignment,
    /// Top-left corner the child was created at.
    pub position: Point,
}

/// How a rollback went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackOutcome {
    Succeeded(CascadeReport),
    /// The delete failed; the error has already been logged.
    FailedWithLoggedError,
}

struct Prepared {
    parent: Shape,
    flow_id: FlowId,
    flow: FlowAssignment,
}

// =============================================================================
// PHASES
// =============================================================================

fn prepare<S>(scene: &S, parent_id: ShapeId) -> EngineResult<Prepared>
where
    S: SceneAccess + ?Sized,
{
    let parent = scene
        .shape(parent_id)
        .ok_or(EngineError::ParentNotFound(parent_id))?;
    let (flow_id, flow) = match parent.flow_id {
        Some(id) => (id, FlowAssignment::Inherited),
        None => (FlowId::mint(), FlowAssignment::Minted),
    };
    Ok(Prepared { parent, flow_id, flow })
}

fn place_and_create<S>(
    scene: &mut S,
    prepared: &Prepared,
    content: CardContent,
    config: &PlacementConfig,
) -> EngineResult<Shape>
where
    S: SceneAccess + ?Sized,
{
    let size = content.kind().estimated_size();
    let placed = placement::search(&prepared.parent, size, &scene.shapes(), config);
    tracing::debug!(
        parent_id = %prepared.parent.id,
        level = placed.level,
        direction = ?placed.direction,
        degraded = placed.degraded,
        "child placed"
    );

    let mut child = Shape::new(placed.position, content);
    child.flow_id = Some(prepared.flow_id);
    scene
        .create_shape(child.clone())
        .map_err(EngineError::ShapeCreationFailed)?;
    Ok(child)
}

async fn settle<S>(scene: &mut S, mode: SettleMode)
where
    S: SceneAccess,
{
    let frames = match mode {
        SettleMode::Acknowledged { .. } if scene.commits_synchronously() => return,
        SettleMode::Acknowledged { fallback_frames } => fallback_frames,
        SettleMode::Frames(frames) => frames,
    };
    scene.after_frames(frames).await;
}

fn verify_bindings<S>(scene: &S, connection_id: ShapeId, parent_id: ShapeId, child_id: ShapeId) -> EngineResult<()>
where
    S: SceneAccess + ?Sized,
{
    let (starts, ends) = terminal_counts(scene, connection_id, parent_id, child_id);
    if starts == 1 && ends == 1 {
        Ok(())
    } else {
        Err(EngineError::BindingIncomplete { connection_id, starts, ends })
    }
}

fn focus<S>(scene: &mut S, child: &Shape, config: &EngineConfig) -> EngineResult<()>
where
    S: SceneAccess + ?Sized,
{
    let options = CenterOptions { animation: config.pan_animation };
    scene
        .center_on_point(child.bounds().center(), options)
        .map_err(EngineError::CameraPanFailed)
}

// =============================================================================
// ROLLBACK
// =============================================================================

/// Cascade-delete a partially created child, plus `connection_id` if known.
///
/// Never fails: a delete error is logged and reported as
/// `RollbackOutcome::FailedWithLoggedError`.
pub fn rollback_child<S>(scene: &mut S, child_id: ShapeId, connection_id: Option<ShapeId>) -> RollbackOutcome
where
    S: SceneAccess + ?Sized,
{
    let mut targets = BTreeSet::from([child_id]);
    targets.extend(connection_id);
    match cascade_delete(scene, &targets) {
        Ok(report) => {
            tracing::debug!(%child_id, connections = report.connections, "child rolled back");
            RollbackOutcome::Succeeded(report)
        }
        Err(e) => {
            tracing::warn!(%child_id, error = %e, "rollback failed; scene may hold a partial child");
            RollbackOutcome::FailedWithLoggedError
        }
    }
}

fn abort<S>(scene: &mut S, child_id: ShapeId, connection_id: Option<ShapeId>, err: EngineError) -> EngineError
where
    S: SceneAccess + ?Sized,
{
    tracing::warn!(%child_id, code = err.error_code(), error = %err, "child creation failed; rolling back");
    let outcome = rollback_child(scene, child_id, connection_id);
    tracing::debug!(?outcome, "rollback finished");
    err
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Create a child card under `parent_id`, connect it, verify the connection's
/// bindings after the scene settles, and pan to it.
///
/// On success the scene holds the new card and one fully bound connection.
/// On failure the scene holds neither.
///
/// # Errors
///
/// Any `EngineError`; see the module docs for which phase raises which.
pub async fn create_child<S>(
    scene: &mut S,
    config: &EngineConfig,
    parent_id: ShapeId,
    content: CardContent,
) -> EngineResult<ChildCreated>
where
    S: SceneAccess,
{
    let prepared = prepare(scene, parent_id)?;
    let child = place_and_create(scene, &prepared, content, &config.placement)?;

    let connection_id = match connect(scene, parent_id, child.id) {
        Ok(id) => id,
        Err(e) => return Err(abort(scene, child.id, None, e)),
    };

    settle(scene, config.settle).await;
    if let Err(e) = verify_bindings(scene, connection_id, parent_id, child.id) {
        return Err(abort(scene, child.id, Some(connection_id), e));
    }

    if let Err(e) = focus(scene, &child, config) {
        return Err(abort(scene, child.id, Some(connection_id), e));
    }

    tracing::info!(%parent_id, child_id = %child.id, %connection_id, flow_id = %prepared.flow_id, "child created");
    Ok(ChildCreated {
        child_id: child.id,
        connection_id,
        flow_id: prepared.flow_id,
        flow: prepared.flow,
        position: Point::new(child.x, child.y),
    })
}

/// Same as [`create_child`] without the settle wait and binding check.
///
/// For call sites that only need the card and connection to exist; failures
/// still roll back.
///
/// # Errors
///
/// Any `EngineError` except `BindingIncomplete`.
pub fn create_child_untracked<S>(
    scene: &mut S,
    config: &EngineConfig,
    parent_id: ShapeId,
    content: CardContent,
) -> EngineResult<ChildCreated>
where
    S: SceneAccess + ?Sized,
{
    let prepared = prepare(scene, parent_id)?;
    let child = place_and_create(scene, &prepared, content, &config.placement)?;

    let connection_id = match connect(scene, parent_id, child.id) {
        Ok(id) => id,
        Err(e) => return Err(abort(scene, child.id, None, e)),
    };

    if let Err(e) = focus(scene, &child, config) {
        return Err(abort(scene, child.id, Some(connection_id), e));
    }

    Ok(ChildCreated {
        child_id: child.id,
        connection_id,
        flow_id: prepared.flow_id,
        flow: prepared.flow,
        position: Point::new(child.x, child.y),
    })
}

/// Stamp `flow_id` onto a card, typically a root after its first child was
/// created with `FlowAssignment::Minted`.
///
/// # Errors
///
/// Returns `NotFound` if the card is gone.
pub fn assign_flow<S>(scene: &mut S, shape_id: ShapeId, flow_id: FlowId) -> Result<(), SceneError>
where
    S: SceneAccess + ?Sized,
{
    scene.update_shape(shape_id, ShapeUpdate { flow_id: Some(flow_id), ..ShapeUpdate::default() })
}
