#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use std::time::Duration;

use crate::geometry::{Point, Size};

/// Default screen size of the memory scene's viewport.
pub const DEFAULT_VIEWPORT: Size = Size { width: 1280.0, height: 800.0 };

/// Viewport camera of the in-memory scene.
///
/// `offset` is the screen position of the page origin; `zoom` scales page
/// units to screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Point,
    pub zoom: f64,
    pub viewport: Size,
    /// Animation requested by the most recent pan, if any pan happened.
    pub last_pan: Option<Option<Duration>>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::with_viewport(DEFAULT_VIEWPORT)
    }
}

impl Camera {
    #[must_use]
    pub fn with_viewport(viewport: Size) -> Self {
        Self { offset: Point::new(0.0, 0.0), zoom: 1.0, viewport, last_pan: None }
    }

    #[must_use]
    pub fn to_page(&self, screen: Point) -> Point {
        Point::new((screen.x - self.offset.x) / self.zoom, (screen.y - self.offset.y) / self.zoom)
    }

    #[must_use]
    pub fn to_screen(&self, page: Point) -> Point {
        Point::new(page.x * self.zoom + self.offset.x, page.y * self.zoom + self.offset.y)
    }

    /// Page point under the middle of the viewport.
    #[must_use]
    pub fn focus(&self) -> Point {
        self.to_page(Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0))
    }

    /// Move the viewport so `page` sits in its middle. Zoom is unchanged; the
    /// requested animation is only recorded, the jump is immediate.
    pub fn pan_to(&mut self, page: Point, animation: Option<Duration>) {
        self.offset = Point::new(
            self.viewport.width / 2.0 - page.x * self.zoom,
            self.viewport.height / 2.0 - page.y * self.zoom,
        );
        self.last_pan = Some(animation);
    }

    /// Whether the last pan asked for an animation.
    #[must_use]
    pub fn last_pan_animated(&self) -> bool {
        matches!(self.last_pan, Some(Some(_)))
    }
}
