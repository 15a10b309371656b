//! Placement search: where to put a new child card next to its parent.
//!
//! DESIGN
//! ======
//! Candidates spiral outward from the parent in levels. Each level probes
//! eight compass directions clockwise starting at the bottom. Axis-aligned
//! candidates sit `gap * (level + 1)` off the matching parent side, centered
//! on the other axis. Diagonal candidates split that offset by √2 on each
//! axis so their distance from the parent corner matches the axis-aligned gap.
//!
//! The first candidate whose padded box clears every other card wins. The
//! search is greedy and deterministic: same parent, size, and scene snapshot
//! always yield the same point. When every candidate collides the level-0
//! bottom slot is returned anyway.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use std::f64::consts::SQRT_2;

use crate::config::PlacementConfig;
use crate::consts::DIRECTION_COUNT;
use crate::geometry::{Aabb, Point, Size, overlaps};
use crate::model::Shape;

/// Compass direction from the parent, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Bottom,
    BottomRight,
    Right,
    TopRight,
    Top,
    TopLeft,
    Left,
    BottomLeft,
}

impl Direction {
    /// Probe order: clockwise from the bottom.
    pub const CLOCKWISE: [Direction; 8] = [
        Self::Bottom,
        Self::BottomRight,
        Self::Right,
        Self::TopRight,
        Self::Top,
        Self::TopLeft,
        Self::Left,
        Self::BottomLeft,
    ];

    #[must_use]
    pub fn is_diagonal(self) -> bool {
        matches!(self, Self::BottomRight | Self::TopRight | Self::TopLeft | Self::BottomLeft)
    }
}

/// Outcome of a placement search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    pub level: u32,
    pub direction: Direction,
    /// Every candidate collided and the level-0 bottom slot was used anyway.
    pub degraded: bool,
}

/// Top-left corner of the candidate box for `direction` at `level`.
#[must_use]
pub fn candidate_position(parent: &Aabb, child: Size, direction: Direction, level: u32, gap: f64) -> Point {
    let offset = gap + f64::from(level) * gap;
    let diag = offset / SQRT_2;
    let center_x = parent.x + (parent.width - child.width) / 2.0;
    let center_y = parent.y + (parent.height - child.height) / 2.0;

    let (x, y) = match direction {
        Direction::Bottom => (center_x, parent.bottom() + offset),
        Direction::BottomRight => (parent.right() + diag, parent.bottom() + diag),
        Direction::Right => (parent.right() + offset, center_y),
        Direction::TopRight => (parent.right() + diag, parent.top() - diag - child.height),
        Direction::Top => (center_x, parent.top() - offset - child.height),
        Direction::TopLeft => (parent.left() - diag - child.width, parent.top() - diag - child.height),
        Direction::Left => (parent.left() - offset - child.width, center_y),
        Direction::BottomLeft => (parent.left() - diag - child.width, parent.bottom() + diag),
    };
    Point::new(x, y)
}

/// Run the spiral search for a child of `child` size next to `parent`.
///
/// `scene` may contain the parent itself; it is skipped by id. Connections
/// never appear here since `Shape` only models cards.
#[must_use]
pub fn search(parent: &Shape, child: Size, scene: &[Shape], config: &PlacementConfig) -> Placement {
    let parent_box = parent.bounds();
    let obstacles: Vec<Aabb> = scene
        .iter()
        .filter(|s| s.id != parent.id)
        .map(Shape::bounds)
        .collect();

    for level in 0..config.levels {
        for direction in Direction::CLOCKWISE {
            let position = candidate_position(&parent_box, child, direction, level, config.gap);
            let candidate = Aabb::at(position, child);
            if !obstacles.iter().any(|o| overlaps(&candidate, o, config.gap)) {
                return Placement { position, level, direction, degraded: false };
            }
        }
    }

    let position = candidate_position(&parent_box, child, Direction::Bottom, 0, config.gap);
    tracing::warn!(
        parent_id = %parent.id,
        levels = config.levels,
        obstacles = obstacles.len(),
        "no free slot found; falling back to level-0 bottom"
    );
    Placement { position, level: 0, direction: Direction::Bottom, degraded: true }
}

/// Top-left position for a new child of `child` size next to `parent`.
#[must_use]
pub fn find_free_position(parent: &Shape, child: Size, scene: &[Shape], config: &PlacementConfig) -> Point {
    search(parent, child, scene, config).position
}

/// Collision-blind placement by sibling index: index 0 is level-0 bottom,
/// index 1 level-0 bottom-right, and so on around the spiral.
#[deprecated(note = "ignores existing cards; use find_free_position")]
#[must_use]
pub fn spiral_position(parent: &Aabb, child: Size, index: u32, gap: f64) -> Point {
    let level = index / DIRECTION_COUNT;
    let direction = Direction::CLOCKWISE[(index % DIRECTION_COUNT) as usize];
    candidate_position(parent, child, direction, level, gap)
}
