//! Placement, connection, and cascade engine for a card canvas.
//!
//! Users place typed cards and grow them into parent→child trees. This crate
//! decides where a new child goes without overlapping existing cards, links
//! it to its parent with a connection bound at both ends, makes the whole
//! step all-or-nothing, and deletes cards together with every connection
//! that touches them. The host canvas store is reached only through the
//! [`scene::SceneAccess`] trait, passed explicitly to every operation.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`transaction`] | Transactional child creation with verification and rollback |
//! | [`placement`] | Spiral search for a free child position |
//! | [`connect`] | Parent→child connections and their two bindings |
//! | [`cascade`] | One-hop cascade discovery and single-step batch delete |
//! | [`scene`] | The Scene Access Facade trait |
//! | [`memory`] | In-memory facade implementation with undo history |
//! | [`model`] | Cards, connections, bindings, flow ids |
//! | [`geometry`] | Points, sizes, bounding boxes, padded overlap |
//! | [`camera`] | Pan/zoom camera used by the memory scene |
//! | [`config`] | Engine configuration from the environment |
//! | [`error`] | Engine error taxonomy |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod cascade;
pub mod config;
pub mod connect;
pub mod consts;
pub mod error;
pub mod geometry;
pub mod memory;
pub mod model;
pub mod placement;
pub mod scene;
pub mod transaction;

pub use error::{EngineError, EngineResult};
