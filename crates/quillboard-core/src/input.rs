//! Raw input vocabulary.
//!
//! The host shell translates its native pointer/keyboard/wheel events into
//! these types before handing them to the interaction handler. Positions are
//! screen coordinates relative to the canvas container, already adjusted for
//! the container origin.

use crate::objects::handles::HandleKind;
use crate::scene::ItemId;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Primary shortcut modifier: ctrl, or cmd on macOS hosts.
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What the pointer went down on, resolved by the host's hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Buttons, inputs, toolbars, the context menu: ignored entirely.
    Chrome,
    /// Empty canvas.
    Canvas,
    /// A floating item's element.
    Item(ItemId),
    /// One of an item's resize handles.
    Handle(ItemId, HandleKind),
    /// A note currently in edit mode; pointer events belong to the editor.
    EditingNote(ItemId),
}

/// Unit of a wheel event's delta, normalized away before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WheelDeltaMode {
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    /// Pixels per delta unit.
    pub fn pixel_factor(&self) -> f64 {
        match self {
            WheelDeltaMode::Pixel => 1.0,
            WheelDeltaMode::Line => 16.0,
            WheelDeltaMode::Page => 100.0,
        }
    }
}

/// Pointer event for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        target: HitTarget,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Wheel {
        position: Point,
        delta: Vec2,
        mode: WheelDeltaMode,
    },
}

/// Keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed { key: String, modifiers: Modifiers },
    Released { key: String },
}

/// Window within which two taps count as a double tap.
pub const DOUBLE_TAP_INTERVAL: Duration = Duration::from_millis(300);
/// Maximum distance in screen pixels between the two taps.
pub const DOUBLE_TAP_DISTANCE: f64 = 10.0;

/// Double-tap detection for touch hosts without native dblclick.
#[derive(Debug, Default)]
pub struct DoubleTapDetector {
    last_tap: Option<(Instant, Point)>,
}

impl DoubleTapDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap; returns `true` when it completes a double tap.
    pub fn register(&mut self, position: Point, now: Instant) -> bool {
        let is_double = match self.last_tap {
            Some((at, p)) => {
                now.duration_since(at) <= DOUBLE_TAP_INTERVAL
                    && (position - p).hypot() <= DOUBLE_TAP_DISTANCE
            }
            None => false,
        };
        // A completed double tap resets so a third tap starts over.
        self.last_tap = if is_double {
            None
        } else {
            Some((now, position))
        };
        is_double
    }

    pub fn reset(&mut self) {
        self.last_tap = None;
    }
}
