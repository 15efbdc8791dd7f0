//! Live stroke: the in-progress, uncommitted stroke being actively drawn.
//!
//! A live stroke participates in redraws but is not part of the persisted
//! stroke list; finishing it hands a [`Stroke`] back to the caller, which is
//! responsible for committing it to the state manager.

use kurbo::Point;
use quillboard_core::color::Rgba;
use quillboard_core::scene::{LayerId, PenSettings, Stroke};
use uuid::Uuid;

/// An uncommitted stroke under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveStroke {
    pub layer_id: LayerId,
    pub points: Vec<Point>,
    pub color: Rgba,
    pub size: f64,
    pub opacity: f64,
    pub is_eraser: bool,
}

impl LiveStroke {
    pub fn begin(layer_id: LayerId, start: Point, pen: PenSettings, is_eraser: bool) -> Self {
        Self {
            layer_id,
            points: vec![start],
            color: pen.color,
            size: pen.size,
            opacity: pen.opacity,
            is_eraser,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Convert into a committed stroke record.
    pub fn into_stroke(self) -> Stroke {
        Stroke {
            id: Uuid::new_v4(),
            points: self.points,
            color: self.color,
            size: self.size,
            opacity: self.opacity,
            layer_id: self.layer_id,
            is_eraser: self.is_eraser,
        }
    }
}
