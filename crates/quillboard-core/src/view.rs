//! View transform for pan/zoom.
//!
//! Screen positions handed to the engine are relative to the canvas
//! container; world space is the unbounded coordinate system strokes and
//! items are stored in. The mapping is a translation plus a uniform scale,
//! and `screen_to_world` is the exact inverse of `world_to_screen`.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom factor.
pub const MIN_SCALE: f64 = 0.1;
/// Maximum allowed zoom factor.
pub const MAX_SCALE: f64 = 5.0;

/// Screen-space translation and uniform zoom of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// World-to-screen affine: scale first, then translate.
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.scale)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.x) / self.scale,
            (screen.y - self.y) / self.scale,
        )
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Multiply the scale by `factor`, keeping the world point under
    /// `screen_point` fixed on screen. The result is clamped to
    /// `[MIN_SCALE, MAX_SCALE]`.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_world(screen_point);
        self.scale = new_scale;
        let moved = self.world_to_screen(anchor);
        self.x += screen_point.x - moved.x;
        self.y += screen_point.y - moved.y;
    }

    /// Reset to the identity view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clamp the scale in place (used when restoring stored views).
    pub fn clamp_scale(&mut self) {
        self.scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);
    }
}
