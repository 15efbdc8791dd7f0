//! Quillboard Engine
//!
//! Orchestration layer of the whiteboard: wires the state manager, render
//! engine, interaction handler, object arena, layer panel and context menu
//! together and exposes the subsystem's only public entry points.

pub mod engine;
pub mod layers;
pub mod menu;
pub mod shortcuts;

pub use engine::{EngineError, REQUIRED_ANCHORS, WhiteboardEngine};
pub use layers::{LayerPanel, LayerRow};
pub use menu::{ContextMenu, FONT_SIZES, MENU_OFFSET, MenuEntry, MenuTarget};
pub use shortcuts::{Shortcut, ShortcutRegistry};

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size, Vec2};
    use quillboard_core::host::{HostContext, Prompter};
    use quillboard_core::input::{HitTarget, Modifiers, MouseButton, PointerEvent, WheelDeltaMode};
    use quillboard_core::interaction::Mode;
    use quillboard_core::objects::handles::HandleKind;
    use quillboard_core::richtext::{RichTextCommand, RichTextEditor, TextStyleState};
    use quillboard_core::scene::Project;
    use quillboard_core::state::SAVE_DEBOUNCE;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    struct CapturingPrompter {
        alerts: Rc<RefCell<Vec<String>>>,
        accept: bool,
    }

    impl Prompter for CapturingPrompter {
        fn confirm(&mut self, _message: &str) -> bool {
            self.accept
        }
        fn alert(&mut self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }
    }

    struct FakeEditor {
        content: String,
    }

    impl RichTextEditor for FakeEditor {
        fn exec(&mut self, _command: RichTextCommand) {}
        fn query_state(&self) -> TextStyleState {
            TextStyleState::default()
        }
        fn content(&self) -> String {
            self.content.clone()
        }
    }

    struct Fixture {
        engine: WhiteboardEngine,
        saves: Rc<RefCell<usize>>,
        alerts: Rc<RefCell<Vec<String>>>,
    }

    fn fixture() -> Fixture {
        let saves = Rc::new(RefCell::new(0usize));
        let alerts = Rc::new(RefCell::new(Vec::new()));
        let save_counter = saves.clone();
        let host = HostContext::new(
            Box::new(|key| key.to_string()),
            Box::new(CapturingPrompter {
                alerts: alerts.clone(),
                accept: true,
            }),
        );
        let mut engine = WhiteboardEngine::new(
            Project::default(),
            Box::new(move |_| {
                *save_counter.borrow_mut() += 1;
            }),
            host,
        );
        engine
            .initialize(REQUIRED_ANCHORS, Size::new(800.0, 600.0), 1.0)
            .unwrap();
        Fixture {
            engine,
            saves,
            alerts,
        }
    }

    fn down_on(target: HitTarget, at: Point) -> PointerEvent {
        PointerEvent::Down {
            position: at,
            button: MouseButton::Left,
            target,
        }
    }

    fn moved(at: Point) -> PointerEvent {
        PointerEvent::Move { position: at }
    }

    fn up(at: Point) -> PointerEvent {
        PointerEvent::Up {
            position: at,
            button: MouseButton::Left,
        }
    }

    fn draw_line(engine: &mut WhiteboardEngine, from: Point, to: Point) {
        engine.pointer(down_on(HitTarget::Canvas, from));
        engine.pointer(moved(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0)));
        engine.pointer(moved(to));
        engine.pointer(up(to));
    }

    #[test]
    fn test_initialize_reports_missing_anchor() {
        let host = HostContext::headless();
        let mut engine = WhiteboardEngine::new(Project::default(), Box::new(|_| {}), host);
        let result = engine.initialize(
            &["whiteboard-container", "whiteboard-toolbar"],
            Size::new(800.0, 600.0),
            1.0,
        );
        assert!(matches!(result, Err(EngineError::MissingAnchor(_))));
        assert!(!engine.is_initialized());
        // destroy is safe after a failed initialize.
        engine.destroy();
    }

    #[test]
    fn test_draw_commit_undo_redo() {
        let mut f = fixture();
        f.engine.set_mode(Mode::Pen);
        draw_line(&mut f.engine, Point::new(50.0, 50.0), Point::new(90.0, 50.0));

        let wb = f.engine.state().try_whiteboard().unwrap();
        assert_eq!(wb.strokes.len(), 1);
        assert_eq!(wb.strokes[0].points.len(), 3);
        assert!(!wb.strokes[0].is_eraser);

        assert!(f.engine.undo());
        assert!(f.engine.state().try_whiteboard().unwrap().strokes.is_empty());
        assert!(f.engine.redo());
        assert_eq!(f.engine.state().try_whiteboard().unwrap().strokes.len(), 1);
    }

    #[test]
    fn test_click_without_movement_commits_nothing() {
        let mut f = fixture();
        f.engine.set_mode(Mode::Pen);
        f.engine.pointer(down_on(HitTarget::Canvas, Point::new(10.0, 10.0)));
        f.engine.pointer(up(Point::new(10.0, 10.0)));
        assert!(f.engine.state().try_whiteboard().unwrap().strokes.is_empty());
        assert!(!f.engine.can_undo());
    }

    #[test]
    fn test_eraser_paint_over_keeps_both_records() {
        let mut f = fixture();
        f.engine.set_mode(Mode::Pen);
        draw_line(&mut f.engine, Point::new(50.0, 50.0), Point::new(90.0, 50.0));
        f.engine.set_mode(Mode::Eraser);
        draw_line(&mut f.engine, Point::new(40.0, 50.0), Point::new(100.0, 50.0));

        let wb = f.engine.state().try_whiteboard().unwrap();
        assert_eq!(wb.strokes.len(), 2);
        assert!(!wb.strokes[0].is_eraser);
        assert!(wb.strokes[1].is_eraser);
        // Same layer: the eraser only subtracts coverage at render time.
        assert_eq!(wb.strokes[0].layer_id, wb.strokes[1].layer_id);
    }

    #[test]
    fn test_add_note_centered_then_undo_redo() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();

        let wb = f.engine.state().try_whiteboard().unwrap();
        let item = wb.item(id).unwrap();
        // Identity view: world center equals viewport center.
        assert_eq!(item.rect().center(), Point::new(400.0, 300.0));
        let geometry = item.rect();
        assert!(f.engine.menu_visible());

        assert!(f.engine.undo());
        assert!(f.engine.state().try_whiteboard().unwrap().items.is_empty());
        assert!(f.engine.redo());
        let restored = f.engine.state().try_whiteboard().unwrap();
        assert_eq!(restored.item(id).unwrap().rect(), geometry);
        assert_eq!(restored.item(id).unwrap().content, "");
    }

    #[test]
    fn test_drag_moves_item_and_records_once() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();
        let origin = f.engine.state().try_whiteboard().unwrap().item(id).unwrap().rect();

        f.engine.pointer(down_on(HitTarget::Item(id), Point::new(400.0, 300.0)));
        f.engine.pointer(moved(Point::new(430.0, 310.0)));
        f.engine.pointer(moved(Point::new(450.0, 320.0)));
        f.engine.pointer(up(Point::new(450.0, 320.0)));

        let wb = f.engine.state().try_whiteboard().unwrap();
        let item = wb.item(id).unwrap();
        assert_eq!(item.x, origin.x0 + 50.0);
        assert_eq!(item.y, origin.y0 + 20.0);

        // One history entry for the whole drag.
        assert!(f.engine.undo());
        assert_eq!(
            f.engine.state().try_whiteboard().unwrap().item(id).unwrap().rect(),
            origin
        );
        // Next undo removes the insertion.
        assert!(f.engine.undo());
        assert!(f.engine.state().try_whiteboard().unwrap().items.is_empty());
    }

    #[test]
    fn test_resize_via_handle_target() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();
        let origin = f.engine.state().try_whiteboard().unwrap().item(id).unwrap().rect();

        f.engine.pointer(down_on(
            HitTarget::Handle(id, HandleKind::SouthEast),
            Point::new(origin.x1, origin.y1),
        ));
        f.engine.pointer(moved(Point::new(origin.x1 + 100.0, origin.y1 + 40.0)));
        f.engine.pointer(up(Point::new(origin.x1 + 100.0, origin.y1 + 40.0)));

        let rect = f.engine.state().try_whiteboard().unwrap().item(id).unwrap().rect();
        assert_eq!(rect.width(), origin.width() + 100.0);
        assert_eq!(rect.height(), origin.height() + 40.0);
        assert_eq!((rect.x0, rect.y0), (origin.x0, origin.y0));

        // Handle pointer-down recorded history before the gesture.
        assert!(f.engine.undo());
        assert_eq!(
            f.engine.state().try_whiteboard().unwrap().item(id).unwrap().rect(),
            origin
        );
    }

    #[test]
    fn test_drawing_on_hidden_layer_alerts_and_aborts() {
        let mut f = fixture();
        let layer = f.engine.active_layer().unwrap();
        f.engine.toggle_layer_visibility(layer);
        f.engine.set_mode(Mode::Pen);

        draw_line(&mut f.engine, Point::new(10.0, 10.0), Point::new(50.0, 10.0));

        assert_eq!(f.alerts.borrow().len(), 1);
        assert!(f.engine.state().try_whiteboard().unwrap().strokes.is_empty());
        assert!(!f.engine.can_undo());
    }

    #[test]
    fn test_wheel_zoom_roundtrip_restores_view() {
        let mut f = fixture();
        f.engine.set_modifiers(Modifiers {
            ctrl: true,
            ..Default::default()
        });
        let at = Point::new(200.0, 150.0);
        let wheel = |engine: &mut WhiteboardEngine, dy: f64| {
            engine.pointer(PointerEvent::Wheel {
                position: at,
                delta: Vec2::new(0.0, dy),
                mode: WheelDeltaMode::Pixel,
            });
        };
        wheel(&mut f.engine, -240.0);
        wheel(&mut f.engine, 240.0);

        let view = f.engine.state().try_whiteboard().unwrap().view;
        assert!((view.scale - 1.0).abs() < 1e-9);
        assert!(view.x.abs() < 1e-9);
        assert!(view.y.abs() < 1e-9);
    }

    #[test]
    fn test_scale_clamped_under_extreme_zoom() {
        let mut f = fixture();
        f.engine.set_modifiers(Modifiers {
            ctrl: true,
            ..Default::default()
        });
        for _ in 0..50 {
            f.engine.pointer(PointerEvent::Wheel {
                position: Point::ZERO,
                delta: Vec2::new(0.0, -1000.0),
                mode: WheelDeltaMode::Pixel,
            });
        }
        let scale = f.engine.state().try_whiteboard().unwrap().view.scale;
        assert!(scale <= quillboard_core::view::MAX_SCALE + 1e-12);
    }

    #[test]
    fn test_deselect_hides_menu() {
        let mut f = fixture();
        f.engine.add_note().unwrap();
        assert!(f.engine.menu_visible());

        f.engine.pointer(down_on(HitTarget::Canvas, Point::new(5.0, 5.0)));
        f.engine.pointer(up(Point::new(5.0, 5.0)));
        assert!(!f.engine.menu_visible());
        assert!(f.engine.selected_item().is_none());
    }

    #[test]
    fn test_undo_shortcut_scoped_to_canvas_focus() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();
        let primary = Modifiers {
            ctrl: true,
            ..Default::default()
        };

        // While editing the note, ctrl+Z must not touch scene history.
        f.engine.enter_note_edit(id);
        f.engine.attach_editor(Box::new(FakeEditor {
            content: "<p>typing</p>".into(),
        }));
        f.engine.key_down("z", primary, false);
        assert_eq!(f.engine.state().try_whiteboard().unwrap().items.len(), 1);

        // After blur the same shortcut undoes the insertion.
        f.engine.note_blur(false);
        f.engine.key_down("z", primary, false);
        assert!(f.engine.state().try_whiteboard().unwrap().items.is_empty());
    }

    #[test]
    fn test_note_blur_persists_editor_content() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();
        f.engine.enter_note_edit(id);
        f.engine.attach_editor(Box::new(FakeEditor {
            content: "<p>edited</p>".into(),
        }));

        // Blur into the menu keeps the session and the draft alive.
        f.engine.note_blur(true);
        assert_eq!(f.engine.objects().editing(), Some(id));

        f.engine.note_blur(false);
        assert_eq!(
            f.engine.state().try_whiteboard().unwrap().item(id).unwrap().content,
            "<p>edited</p>"
        );
        assert!(f.engine.objects().editing().is_none());
    }

    #[test]
    fn test_note_auto_grow_on_input() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();
        f.engine.enter_note_edit(id);
        let long = format!("<p>{}</p>", "words ".repeat(120));
        f.engine.attach_editor(Box::new(FakeEditor { content: long }));

        f.engine.note_input(id);
        let h = f.engine.state().try_whiteboard().unwrap().item(id).unwrap().h;
        assert!(h > 160.0, "expected growth beyond the spawn height, got {h}");
    }

    #[test]
    fn test_checklist_click_in_zone_toggles() {
        let mut f = fixture();
        let id = f.engine.add_note().unwrap();
        f.engine.state_mut().update_item(id, |item| {
            item.content =
                r#"<ul data-checklist="true"><li data-checked="false">milk</li></ul>"#.into();
        });
        f.engine.enter_note_edit(id);

        // Outside the checkbox zone: ordinary caret placement.
        assert!(!f.engine.note_click(id, 0, 45.0));
        // Inside: toggles and suppresses the caret.
        assert!(f.engine.note_click(id, 0, 12.0));
        let content = f
            .engine
            .state()
            .try_whiteboard()
            .unwrap()
            .item(id)
            .unwrap()
            .content
            .clone();
        assert!(content.contains(r#"data-checked="true""#));
    }

    #[test]
    fn test_debounced_save_through_tick() {
        let mut f = fixture();
        f.engine.add_note().unwrap();
        let start = Instant::now();
        assert!(!f.engine.tick(start));
        assert!(f.engine.tick(Instant::now() + SAVE_DEBOUNCE));
        assert_eq!(*f.saves.borrow(), 1);
    }

    #[test]
    fn test_destroy_flushes_pending_save() {
        let mut f = fixture();
        f.engine.add_note().unwrap();
        f.engine.destroy();
        assert_eq!(*f.saves.borrow(), 1);
        assert!(!f.engine.is_initialized());
    }

    #[test]
    fn test_layer_delete_cascade_via_panel() {
        let mut f = fixture();
        let second = f.engine.add_layer();
        f.engine.set_mode(Mode::Pen);
        draw_line(&mut f.engine, Point::new(10.0, 10.0), Point::new(60.0, 10.0));
        assert_eq!(f.engine.state().try_whiteboard().unwrap().strokes.len(), 1);

        assert!(f.engine.delete_layer(second));
        let remaining = {
            let wb = f.engine.state().try_whiteboard().unwrap();
            assert_eq!(wb.layers.len(), 1);
            assert!(wb.strokes.is_empty());
            wb.layers[0].id
        };
        // Fallback active layer is the remaining one.
        assert_eq!(f.engine.active_layer(), Some(remaining));
    }

    #[test]
    fn test_undo_floor_after_many_actions() {
        let mut f = fixture();
        f.engine.set_mode(Mode::Pen);
        for i in 0..60 {
            let y = 10.0 + i as f64;
            draw_line(&mut f.engine, Point::new(10.0, y), Point::new(60.0, y));
        }
        let mut undone = 0;
        while f.engine.undo() {
            undone += 1;
        }
        assert!(undone <= quillboard_core::history::MAX_HISTORY);
        // The floor is not the empty board: the oldest entries were evicted.
        assert!(
            !f.engine
                .state()
                .try_whiteboard()
                .unwrap()
                .strokes
                .is_empty()
        );
    }
}
