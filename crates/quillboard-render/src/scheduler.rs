//! Request-driven redraw scheduling.
//!
//! There is no fixed-rate render loop: mutations call
//! [`FrameScheduler::request_redraw`], which arms at most one pending frame
//! callback. The frame draws if anything is dirty and re-arms itself only
//! while a live stroke is active or another redraw was requested mid-frame,
//! so an idle canvas costs nothing.

/// Dirty flag plus the single-pending-frame invariant.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    dirty: bool,
    scheduled: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the surface dirty. Returns `true` when the host must schedule a
    /// frame callback; `false` means one is already pending.
    pub fn request_redraw(&mut self) -> bool {
        self.dirty = true;
        if self.scheduled {
            false
        } else {
            self.scheduled = true;
            true
        }
    }

    /// Called at the top of the host's frame callback. Returns whether
    /// there is anything to draw; idempotent when nothing is dirty.
    pub fn begin_frame(&mut self) -> bool {
        let draw = self.dirty;
        self.dirty = false;
        draw
    }

    /// Called after drawing. Returns whether the frame callback stays
    /// scheduled (live stroke in progress, or a redraw was requested while
    /// drawing).
    pub fn end_frame(&mut self, live_stroke_active: bool) -> bool {
        self.scheduled = live_stroke_active || self.dirty;
        self.scheduled
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drop any pending frame (teardown).
    pub fn reset(&mut self) {
        self.dirty = false;
        self.scheduled = false;
    }
}
