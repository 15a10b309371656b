//! Scene records: cards, parent-child connections, and the bindings that tie
//! connection terminals to cards.
//!
//! Cards (`Shape`) and connections (`Connection`) share one id space so a
//! single batch delete can address both. Bindings are separate records owned
//! by the scene; a connection never stores its endpoints' ids for geometry,
//! only as descriptive metadata.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    NOTE_EST_HEIGHT, NOTE_WIDTH, QUESTION_EST_HEIGHT, QUESTION_WIDTH, TWEET_EST_HEIGHT, TWEET_WIDTH,
};
use crate::geometry::{Aabb, Point, Size};

/// Unique identifier for a card or connection.
pub type ShapeId = Uuid;

/// Unique identifier for a binding record.
pub type BindingId = Uuid;

/// Groups a root card and every descendant reachable through connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(Uuid);

impl FlowId {
    /// Mint a fresh flow id.
    #[must_use]
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// CARDS
// =============================================================================

/// The kind of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Tweet,
    Question,
    Note,
}

impl ShapeKind {
    /// Size used when placing a card of this kind before it has rendered.
    ///
    /// Width is fixed per kind. Height is a conservative estimate; the card
    /// reports its real height through `measured_height` once drawn.
    #[must_use]
    pub fn estimated_size(self) -> Size {
        match self {
            Self::Tweet => Size::new(TWEET_WIDTH, TWEET_EST_HEIGHT),
            Self::Question => Size::new(QUESTION_WIDTH, QUESTION_EST_HEIGHT),
            Self::Note => Size::new(NOTE_WIDTH, NOTE_EST_HEIGHT),
        }
    }
}

/// Kind-specific card payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardContent {
    Tweet { url: String, text: String },
    Question { prompt: String, answer: Option<String> },
    Note { text: String },
}

impl CardContent {
    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Tweet { .. } => ShapeKind::Tweet,
            Self::Question { .. } => ShapeKind::Question,
            Self::Note { .. } => ShapeKind::Note,
        }
    }
}

/// A positioned card on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// Nominal height written at creation time.
    pub height: f64,
    /// Height reported by the card after it rendered, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<FlowId>,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z_index: i64,
    pub content: CardContent,
}

impl Shape {
    /// Build a card of `content`'s kind at `origin` with the kind's estimated size.
    #[must_use]
    pub fn new(origin: Point, content: CardContent) -> Self {
        let size = content.kind().estimated_size();
        Self {
            id: Uuid::new_v4(),
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            measured_height: None,
            flow_id: None,
            z_index: 0,
            content,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.content.kind()
    }

    /// The larger of the nominal and measured heights.
    #[must_use]
    pub fn effective_height(&self) -> f64 {
        match self.measured_height {
            Some(measured) => measured.max(self.height),
            None => self.height,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.effective_height())
    }
}

// =============================================================================
// CONNECTIONS
// =============================================================================

/// Who created a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatedBy {
    System,
    User,
}

/// Arrowhead style at a connection terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrowhead {
    #[default]
    None,
    Arrow,
}

/// Descriptive metadata carried by every parent-child connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionMeta {
    pub is_parent_child_connection: bool,
    pub parent_id: ShapeId,
    pub child_id: ShapeId,
    pub created_by: CreatedBy,
}

/// A directed structural link between a parent card and a child card.
///
/// `start` and `end` are point hints only; the bindings decide which cards the
/// terminals follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ShapeId,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub arrowhead_start: Arrowhead,
    #[serde(default)]
    pub arrowhead_end: Arrowhead,
    #[serde(default)]
    pub z_index: i64,
    pub meta: ConnectionMeta,
}

impl Connection {
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::spanning(self.start, self.end)
    }
}

// =============================================================================
// BINDINGS
// =============================================================================

/// Which end of a connection a binding attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    Start,
    End,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Binding category. Only connection bindings exist today; the facade query
/// takes a kind so hosts with other binding types filter them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Arrow,
}

/// Links one terminal of a connection (`from_id`) to a card (`to_id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    pub id: BindingId,
    pub kind: BindingKind,
    pub from_id: ShapeId,
    pub to_id: ShapeId,
    pub terminal: Terminal,
    /// Normalized anchor inside the target's bounds; `(0.5, 0.5)` is the center.
    pub anchor: Point,
    pub is_precise: bool,
    pub is_exact: bool,
}

impl Binding {
    /// Centered, imprecise arrow binding, the form every engine connection uses.
    #[must_use]
    pub fn centered(from_id: ShapeId, to_id: ShapeId, terminal: Terminal, anchor: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: BindingKind::Arrow,
            from_id,
            to_id,
            terminal,
            anchor: Point::new(anchor, anchor),
            is_precise: false,
            is_exact: false,
        }
    }
}
