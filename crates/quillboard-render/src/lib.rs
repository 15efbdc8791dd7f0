//! Quillboard Render Library
//!
//! Raster compositing of strokes, decoupled from the retained-mode object
//! layer. Redraws are request-driven rather than ticked; the surface is a
//! CPU pixmap the host presents however it likes.

mod compositor;
mod live;
mod scheduler;

pub use compositor::LayerCompositor;
pub use live::LiveStroke;
pub use scheduler::FrameScheduler;

use kurbo::Point;
use log::debug;
use quillboard_core::scene::{LayerId, PenSettings, Stroke, Whiteboard};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface not initialized; resize the renderer first")]
    NotInitialized,
    #[error("failed to allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// The render engine: scheduler, compositor and live-stroke lifecycle.
pub struct RenderEngine {
    scheduler: FrameScheduler,
    compositor: LayerCompositor,
    live: Option<LiveStroke>,
}

impl Default for RenderEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine {
    pub fn new() -> Self {
        Self {
            scheduler: FrameScheduler::new(),
            compositor: LayerCompositor::new(),
            live: None,
        }
    }

    // ------------------------------------------------------------------
    // Scheduling

    /// Mark the stroke surface dirty. Returns `true` when the host must
    /// schedule a frame callback (none was pending).
    pub fn request_redraw(&mut self) -> bool {
        self.scheduler.request_redraw()
    }

    /// The host's frame callback. Redraws if dirty and reports whether the
    /// callback should stay scheduled.
    pub fn on_frame(&mut self, wb: &Whiteboard) -> RenderResult<bool> {
        if self.scheduler.begin_frame() {
            self.compositor.render(wb, self.live.as_ref())?;
        }
        Ok(self.scheduler.end_frame(self.live.is_some()))
    }

    // ------------------------------------------------------------------
    // Surface

    /// Reallocate backing buffers. Non-positive dimensions are a no-op;
    /// a successful resize requests a redraw.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> RenderResult<()> {
        if width <= 0.0 || height <= 0.0 {
            return Ok(());
        }
        self.compositor.resize(width, height, dpr)?;
        self.request_redraw();
        Ok(())
    }

    pub fn compositor(&self) -> &LayerCompositor {
        &self.compositor
    }

    pub fn set_background(&mut self, background: quillboard_core::color::Rgba) {
        self.compositor.set_background(background);
    }

    // ------------------------------------------------------------------
    // Live stroke

    /// Begin an uncommitted stroke. It participates in redraws but not in
    /// the persisted stroke list.
    pub fn start_stroke(
        &mut self,
        layer_id: LayerId,
        start: Point,
        pen: PenSettings,
        is_eraser: bool,
    ) {
        debug!("live stroke started on layer {layer_id}");
        self.live = Some(LiveStroke::begin(layer_id, start, pen, is_eraser));
        self.request_redraw();
    }

    /// Append a vertex to the live stroke. No-op when none is active.
    pub fn add_stroke_point(&mut self, point: Point) {
        if let Some(live) = self.live.as_mut() {
            live.add_point(point);
            self.scheduler.request_redraw();
        }
    }

    /// Finish the live stroke, returning the committed record. The caller
    /// owns committing it to the state manager. `None` when no stroke is
    /// active, so unconditional draw-end callbacks are safe.
    pub fn finish_stroke(&mut self) -> Option<Stroke> {
        let stroke = self.live.take()?.into_stroke();
        self.request_redraw();
        Some(stroke)
    }

    /// Discard the live stroke without committing anything.
    pub fn cancel_stroke(&mut self) {
        if self.live.take().is_some() {
            self.request_redraw();
        }
    }

    pub fn has_live_stroke(&self) -> bool {
        self.live.is_some()
    }

    /// Whether a frame callback is currently pending.
    pub fn frame_scheduled(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    /// Release buffers and pending frames (teardown).
    pub fn destroy(&mut self) {
        self.live = None;
        self.scheduler.reset();
        self.compositor.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Whiteboard {
        Whiteboard::with_defaults()
    }

    #[test]
    fn test_finish_returns_stroke_points() {
        let mut engine = RenderEngine::new();
        let wb = board();
        let layer = wb.layers[0].id;

        engine.start_stroke(layer, Point::new(0.0, 0.0), PenSettings::default(), false);
        engine.add_stroke_point(Point::new(5.0, 5.0));
        engine.add_stroke_point(Point::new(10.0, 0.0));

        let stroke = engine.finish_stroke().unwrap();
        assert_eq!(stroke.points.len(), 3);
        assert!(!stroke.is_eraser);
        assert_eq!(stroke.layer_id, layer);
        assert!(!engine.has_live_stroke());
    }

    #[test]
    fn test_finish_without_live_is_none() {
        let mut engine = RenderEngine::new();
        assert!(engine.finish_stroke().is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let mut engine = RenderEngine::new();
        let wb = board();
        engine.start_stroke(wb.layers[0].id, Point::ZERO, PenSettings::default(), true);
        engine.cancel_stroke();
        assert!(engine.finish_stroke().is_none());
    }

    #[test]
    fn test_frame_loop_rearms_while_drawing() {
        let mut engine = RenderEngine::new();
        let wb = board();
        engine.resize(50.0, 50.0, 1.0).unwrap();

        // Resize requested a redraw; drawing nothing live winds down.
        assert!(!engine.on_frame(&wb).unwrap());

        engine.start_stroke(wb.layers[0].id, Point::ZERO, PenSettings::default(), false);
        assert!(engine.on_frame(&wb).unwrap());
        engine.finish_stroke();
        assert!(!engine.on_frame(&wb).unwrap());
    }

    #[test]
    fn test_resize_nonpositive_noop() {
        let mut engine = RenderEngine::new();
        engine.resize(-10.0, 10.0, 1.0).unwrap();
        assert!(!engine.compositor().is_ready());
    }

    #[test]
    fn test_on_frame_unsized_surface_errors_when_dirty() {
        let mut engine = RenderEngine::new();
        let wb = board();
        engine.request_redraw();
        assert!(engine.on_frame(&wb).is_err());
    }
}
