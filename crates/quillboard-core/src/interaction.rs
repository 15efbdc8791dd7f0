//! Pointer/keyboard interaction state machine.
//!
//! Raw input comes in as [`PointerEvent`]/[`KeyEvent`]; semantic operations
//! go out as [`Action`]s for the orchestrator to route. The handler owns no
//! scene state: it receives the current view transform with each pointer
//! event and never mutates anything itself.

use crate::input::{HitTarget, KeyEvent, Modifiers, MouseButton, PointerEvent, WheelDeltaMode};
use crate::scene::ItemId;
use crate::view::ViewTransform;
use kurbo::{Point, Vec2};
use log::trace;

/// Zoom speed per normalized wheel pixel.
pub const ZOOM_INTENSITY: f64 = 0.0015;

/// Input modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Select/drag items; panning on empty space.
    #[default]
    Cursor,
    /// Always pans.
    Hand,
    /// Draws ink strokes.
    Pen,
    /// Draws subtractive strokes.
    Eraser,
}

impl Mode {
    pub fn is_drawing(&self) -> bool {
        matches!(self, Mode::Pen | Mode::Eraser)
    }
}

/// Semantic operations emitted by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pan the view by a screen-space delta.
    Pan { delta: Vec2 },
    /// Zoom around a fixed screen point by a multiplicative factor.
    ZoomAt { position: Point, factor: f64 },
    SelectItem(ItemId),
    Deselect,
    /// Fired once, on the first observed displacement after pointer-down on
    /// an item. A click without movement never produces a drag.
    DragStarted(ItemId),
    /// Incremental world-space displacement of the dragged item.
    DragMoved { item: ItemId, delta: Vec2 },
    DragEnded(ItemId),
    /// Cumulative world-space displacement since the resize began.
    ResizeMoved { delta: Vec2 },
    ResizeEnded,
    DrawStarted { world: Point, is_eraser: bool },
    DrawMoved { world: Point },
    /// Always emitted on pointer-up; ending a live stroke is idempotent.
    DrawEnded,
    ModeChanged(Mode),
    Undo,
    Redo,
    SaveRequested,
}

/// Outcome of feeding one event through the machine.
#[derive(Debug, Default)]
pub struct InputResponse {
    pub actions: Vec<Action>,
    /// The host should `preventDefault` on the native event.
    pub consumed: bool,
}

impl InputResponse {
    fn none() -> Self {
        Self::default()
    }

    fn with(actions: Vec<Action>) -> Self {
        Self {
            actions,
            consumed: false,
        }
    }

    fn consumed(actions: Vec<Action>) -> Self {
        Self {
            actions,
            consumed: true,
        }
    }
}

/// The currently active gesture. Branches are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Panning { last: Point },
    /// Pointer is down on an item, no displacement observed yet.
    PendingDrag { item: ItemId, last: Point },
    Dragging { item: ItemId, last: Point },
    Resizing { origin: Point },
    Drawing,
}

/// Mode-based input state machine.
pub struct InteractionHandler {
    mode: Mode,
    gesture: Gesture,
    modifiers: Modifiers,
    space_held: bool,
    mode_before_space: Option<Mode>,
}

impl Default for InteractionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::default(),
            gesture: Gesture::Idle,
            modifiers: Modifiers::default(),
            space_held: false,
            mode_before_space: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Toolbar mode switch. Cancels nothing; an active gesture finishes
    /// under its original rules.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.mode_before_space = None;
        self.space_held = false;
    }

    /// Effective mode, accounting for a held space bar.
    fn effective_mode(&self) -> Mode {
        if self.space_held { Mode::Hand } else { self.mode }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// The engine routes a resize-handle pointer-down here after the object
    /// manager has captured start geometry.
    pub fn begin_resize(&mut self, origin: Point) {
        self.gesture = Gesture::Resizing { origin };
    }

    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    // ------------------------------------------------------------------
    // Pointer events

    pub fn handle_pointer(&mut self, event: PointerEvent, view: ViewTransform) -> InputResponse {
        match event {
            PointerEvent::Down {
                position,
                button,
                target,
            } => self.pointer_down(position, button, target, view),
            PointerEvent::Move { position } => self.pointer_move(position, view),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
            PointerEvent::Wheel {
                position,
                delta,
                mode,
            } => self.wheel(position, delta, mode),
        }
    }

    fn pointer_down(
        &mut self,
        position: Point,
        button: MouseButton,
        target: HitTarget,
        view: ViewTransform,
    ) -> InputResponse {
        // UI chrome, resize handles and an actively edited note have their
        // own wiring; the machine never sees through them.
        if matches!(
            target,
            HitTarget::Chrome | HitTarget::Handle(..) | HitTarget::EditingNote(_)
        ) {
            return InputResponse::none();
        }
        if button == MouseButton::Right {
            return InputResponse::none();
        }

        trace!("pointer down at {position:?} on {target:?}");

        let mode = self.effective_mode();
        if button == MouseButton::Middle || mode == Mode::Hand {
            self.gesture = Gesture::Panning { last: position };
            return InputResponse::none();
        }

        match mode {
            Mode::Cursor => match target {
                HitTarget::Item(id) => {
                    self.gesture = Gesture::PendingDrag {
                        item: id,
                        last: position,
                    };
                    InputResponse::with(vec![Action::SelectItem(id)])
                }
                _ => {
                    self.gesture = Gesture::Panning { last: position };
                    InputResponse::with(vec![Action::Deselect])
                }
            },
            Mode::Pen | Mode::Eraser => {
                self.gesture = Gesture::Drawing;
                InputResponse::consumed(vec![Action::DrawStarted {
                    world: view.screen_to_world(position),
                    is_eraser: mode == Mode::Eraser,
                }])
            }
            // Hand was handled above.
            Mode::Hand => InputResponse::none(),
        }
    }

    fn pointer_move(&mut self, position: Point, view: ViewTransform) -> InputResponse {
        match self.gesture {
            Gesture::Idle => InputResponse::none(),
            Gesture::Panning { last } => {
                let delta = position - last;
                self.gesture = Gesture::Panning { last: position };
                InputResponse::with(vec![Action::Pan { delta }])
            }
            Gesture::PendingDrag { item, last } => {
                let delta = position - last;
                if delta.hypot2() == 0.0 {
                    return InputResponse::none();
                }
                // Displacement observed: promote to a real drag.
                self.gesture = Gesture::Dragging {
                    item,
                    last: position,
                };
                InputResponse::consumed(vec![
                    Action::DragStarted(item),
                    Action::DragMoved {
                        item,
                        delta: delta / view.scale,
                    },
                ])
            }
            Gesture::Dragging { item, last } => {
                let delta = position - last;
                self.gesture = Gesture::Dragging {
                    item,
                    last: position,
                };
                InputResponse::consumed(vec![Action::DragMoved {
                    item,
                    delta: delta / view.scale,
                }])
            }
            Gesture::Resizing { origin } => {
                let delta = position - origin;
                InputResponse::consumed(vec![Action::ResizeMoved {
                    delta: delta / view.scale,
                }])
            }
            Gesture::Drawing => InputResponse::consumed(vec![Action::DrawMoved {
                world: view.screen_to_world(position),
            }]),
        }
    }

    fn pointer_up(&mut self, _position: Point, _button: MouseButton) -> InputResponse {
        let mut actions = Vec::new();
        match self.gesture {
            Gesture::Dragging { item, .. } => actions.push(Action::DragEnded(item)),
            Gesture::Resizing { .. } => actions.push(Action::ResizeEnded),
            _ => {}
        }
        self.gesture = Gesture::Idle;
        // The draw-end callback is unconditional; finishing with no live
        // stroke is a no-op downstream.
        actions.push(Action::DrawEnded);
        actions.push(Action::SaveRequested);
        InputResponse::with(actions)
    }

    fn wheel(&mut self, position: Point, delta: Vec2, mode: WheelDeltaMode) -> InputResponse {
        let factor_px = mode.pixel_factor();
        let normalized = Vec2::new(delta.x * factor_px, delta.y * factor_px);
        if self.modifiers.primary() {
            let factor = (-normalized.y * ZOOM_INTENSITY).exp();
            InputResponse::consumed(vec![Action::ZoomAt { position, factor }])
        } else {
            InputResponse::consumed(vec![Action::Pan {
                delta: Vec2::new(-normalized.x, -normalized.y),
            }])
        }
    }

    // ------------------------------------------------------------------
    // Keyboard

    /// Dispatch a [`KeyEvent`] to the press/release handlers.
    pub fn handle_key(&mut self, event: KeyEvent, in_text_field: bool) -> InputResponse {
        match event {
            KeyEvent::Pressed { key, modifiers } => self.key_down(&key, modifiers, in_text_field),
            KeyEvent::Released { key } => {
                let modifiers = self.modifiers;
                self.key_up(&key, modifiers)
            }
        }
    }

    /// Handle a key press. `in_text_field` suppresses everything: hotkeys
    /// must never fire while typing into a note or input.
    pub fn key_down(
        &mut self,
        key: &str,
        modifiers: Modifiers,
        in_text_field: bool,
    ) -> InputResponse {
        if in_text_field {
            return InputResponse::none();
        }
        self.modifiers = modifiers;

        let key = key.to_ascii_lowercase();
        match key.as_str() {
            " " | "space" => {
                if !self.space_held {
                    self.space_held = true;
                    self.mode_before_space = Some(self.mode);
                }
                InputResponse::consumed(vec![Action::ModeChanged(Mode::Hand)])
            }
            "z" if modifiers.primary() && modifiers.shift => {
                InputResponse::consumed(vec![Action::Redo])
            }
            "z" if modifiers.primary() => InputResponse::consumed(vec![Action::Undo]),
            "y" if modifiers.primary() => InputResponse::consumed(vec![Action::Redo]),
            "v" if !modifiers.primary() => self.hotkey_mode(Mode::Cursor),
            "p" if !modifiers.primary() => self.hotkey_mode(Mode::Pen),
            "e" if !modifiers.primary() => self.hotkey_mode(Mode::Eraser),
            _ => InputResponse::none(),
        }
    }

    pub fn key_up(&mut self, key: &str, modifiers: Modifiers) -> InputResponse {
        self.modifiers = modifiers;
        let key = key.to_ascii_lowercase();
        if matches!(key.as_str(), " " | "space") && self.space_held {
            self.space_held = false;
            let restored = self.mode_before_space.take().unwrap_or(self.mode);
            self.mode = restored;
            return InputResponse::with(vec![Action::ModeChanged(restored)]);
        }
        InputResponse::none()
    }

    fn hotkey_mode(&mut self, mode: Mode) -> InputResponse {
        self.set_mode(mode);
        InputResponse::with(vec![Action::ModeChanged(mode)])
    }
}
