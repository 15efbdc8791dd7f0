//! Whiteboard engine orchestrator.
//!
//! Owns every component and routes their typed events: interaction actions
//! go to the state manager and renderer, scene events fan back out to the
//! object arena, the raster surface and the context menu. The orchestrator
//! carries no scene logic of its own.

use crate::layers::{LayerPanel, LayerRow};
use crate::menu::{self, ContextMenu, MenuEntry};
use kurbo::{Point, Size};
use log::{debug, error, info};
use quillboard_core::color::Rgba;
use quillboard_core::data_uri;
use quillboard_core::host::{HostContext, SaveFn};
use quillboard_core::input::{HitTarget, Modifiers, MouseButton, PointerEvent};
use quillboard_core::interaction::{Action, InteractionHandler, Mode};
use quillboard_core::objects::handles::HandleKind;
use quillboard_core::objects::resize::ResizeStart;
use quillboard_core::objects::{DEFAULT_NOTE_SIZE, ObjectManager, checklist};
use quillboard_core::richtext::{RichTextCommand, RichTextEditor};
use quillboard_core::scene::{Item, ItemId, LayerId, PenSettings, Project};
use quillboard_core::state::{SceneEvent, StateManager};
use quillboard_render::{RenderEngine, RenderError};
use std::time::Instant;
use thiserror::Error;

/// Host mount points the engine binds to. Initialization fails without
/// throwing when any of these is missing.
pub const REQUIRED_ANCHORS: &[&str] = &[
    "whiteboard-container",
    "whiteboard-canvas",
    "whiteboard-object-layer",
    "whiteboard-toolbar",
];

/// Largest edge a freshly placed image gets, in world units.
const MAX_IMAGE_SPAWN_WIDTH: f64 = 400.0;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("missing required anchor: {0}")]
    MissingAnchor(String),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The whiteboard engine: the only public entry point of the subsystem.
pub struct WhiteboardEngine {
    state: StateManager,
    host: HostContext,
    interaction: InteractionHandler,
    objects: ObjectManager,
    renderer: RenderEngine,
    layers: LayerPanel,
    menu: ContextMenu,
    editor: Option<Box<dyn RichTextEditor>>,
    resize_gesture: Option<ResizeStart>,
    viewport: Size,
    initialized: bool,
}

impl WhiteboardEngine {
    pub fn new(project: Project, save: SaveFn, host: HostContext) -> Self {
        Self {
            state: StateManager::new(project, save),
            host,
            interaction: InteractionHandler::new(),
            objects: ObjectManager::default(),
            renderer: RenderEngine::new(),
            layers: LayerPanel::new(),
            menu: ContextMenu::new(),
            editor: None,
            resize_gesture: None,
            viewport: Size::ZERO,
            initialized: false,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle

    /// Bind to the host's mount points. Reports failure without panicking;
    /// nothing is left interactive on failure.
    pub fn initialize(
        &mut self,
        available_anchors: &[&str],
        viewport: Size,
        device_pixel_ratio: f64,
    ) -> Result<(), EngineError> {
        for required in REQUIRED_ANCHORS {
            if !available_anchors.contains(required) {
                error!("initialize failed: anchor #{required} not found");
                return Err(EngineError::MissingAnchor(required.to_string()));
            }
        }

        self.viewport = viewport;
        self.renderer
            .resize(viewport.width, viewport.height, device_pixel_ratio)?;
        self.objects.render_all(self.state.whiteboard());
        self.layers.active_layer(self.state.whiteboard());
        self.renderer.request_redraw();
        self.initialized = true;
        info!("whiteboard engine initialized ({}x{})", viewport.width, viewport.height);
        Ok(())
    }

    /// Release the render loop and flush pending persistence. Safe to call
    /// after a failed or partial initialize.
    pub fn destroy(&mut self) {
        if self.state.save_pending() {
            self.state.save_now();
        }
        self.renderer.destroy();
        self.menu.hide();
        self.editor = None;
        self.resize_gesture = None;
        self.initialized = false;
        debug!("whiteboard engine destroyed");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Viewport resize from the host. Non-positive sizes are ignored.
    pub fn resize(&mut self, viewport: Size, device_pixel_ratio: f64) -> Result<(), EngineError> {
        if viewport.width > 0.0 && viewport.height > 0.0 {
            self.viewport = viewport;
        }
        self.renderer
            .resize(viewport.width, viewport.height, device_pixel_ratio)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input entry points

    /// Feed one pointer event. Returns whether the host should suppress the
    /// native default (scrolling, text selection).
    pub fn pointer(&mut self, event: PointerEvent) -> bool {
        if !self.initialized {
            return false;
        }
        // A resize handle's pointer-down is wired through the object
        // manager, not the interaction machine.
        if let PointerEvent::Down {
            position,
            button: MouseButton::Left,
            target: HitTarget::Handle(id, kind),
        } = event
        {
            self.begin_item_resize(id, kind, position);
            return true;
        }

        let view = self.state.view();
        let response = self.interaction.handle_pointer(event, view);
        for action in response.actions {
            self.apply(action);
        }
        self.route_scene_events();
        response.consumed
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.interaction.set_modifiers(modifiers);
    }

    /// Keyboard entry point, scoped: shortcuts never fire while a note is
    /// being edited or the host reports focus in a text field.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers, host_text_focus: bool) -> bool {
        if !self.initialized {
            return false;
        }
        let in_text = host_text_focus || self.objects.editing().is_some();
        let response = self.interaction.key_down(key, modifiers, in_text);
        for action in response.actions {
            self.apply(action);
        }
        self.route_scene_events();
        response.consumed
    }

    pub fn key_up(&mut self, key: &str, modifiers: Modifiers) {
        if !self.initialized {
            return;
        }
        let response = self.interaction.key_up(key, modifiers);
        for action in response.actions {
            self.apply(action);
        }
        self.route_scene_events();
    }

    /// Event-loop tick: polls the debounced save.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.state.maybe_save(now)
    }

    /// Frame callback: redraws if dirty, reports whether the callback
    /// should stay scheduled.
    pub fn frame(&mut self) -> Result<bool, EngineError> {
        Ok(self.renderer.on_frame(self.state.whiteboard())?)
    }

    /// Whether a frame callback is currently wanted.
    pub fn needs_frame(&self) -> bool {
        self.renderer.frame_scheduled()
    }

    // ------------------------------------------------------------------
    // Action routing

    fn apply(&mut self, action: Action) {
        match action {
            Action::Pan { delta } => self.state.update_view(|v| v.pan(delta)),
            Action::ZoomAt { position, factor } => {
                self.state.update_view(|v| v.zoom_at(position, factor));
            }
            Action::SelectItem(id) => {
                self.objects.select(id);
                let editing = self.objects.is_editing(id);
                self.menu.show(self.state.whiteboard(), id, editing);
            }
            Action::Deselect => self.deselect(),
            Action::DragStarted(_) => self.state.record_history(),
            Action::DragMoved { item, delta } => {
                self.state.update_item(item, |i| {
                    i.x += delta.x;
                    i.y += delta.y;
                });
            }
            Action::DragEnded(_) => {}
            Action::ResizeMoved { delta } => {
                if let Some(start) = self.resize_gesture {
                    if let Some(rect) = self.objects.resize_rect(self.state.whiteboard(), &start, delta)
                    {
                        self.state.update_item(start.item, |i| i.set_rect(rect));
                    }
                }
            }
            Action::ResizeEnded => self.resize_gesture = None,
            Action::DrawStarted { world, is_eraser } => self.begin_stroke(world, is_eraser),
            Action::DrawMoved { world } => self.renderer.add_stroke_point(world),
            Action::DrawEnded => self.end_stroke(),
            Action::ModeChanged(mode) => debug!("mode changed to {mode:?}"),
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::SaveRequested => self.state.schedule_save(),
        }
    }

    fn route_scene_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                SceneEvent::ItemAdded(_) | SceneEvent::ItemDeleted(_) => {
                    self.objects.render_all(self.state.whiteboard());
                    self.menu.update_position(self.state.whiteboard());
                }
                SceneEvent::ItemUpdated(id) => {
                    self.objects.update_item_transform(self.state.whiteboard(), id);
                    if self.menu.target().map(|t| t.item()) == Some(id) {
                        self.menu.update_position(self.state.whiteboard());
                    }
                }
                SceneEvent::StrokesChanged => {
                    self.renderer.request_redraw();
                }
                SceneEvent::LayersChanged | SceneEvent::SceneRestored => {
                    self.objects.render_all(self.state.whiteboard());
                    self.renderer.request_redraw();
                    self.menu.update_position(self.state.whiteboard());
                }
                SceneEvent::ViewChanged => {
                    self.renderer.request_redraw();
                    self.menu.update_position(self.state.whiteboard());
                }
                SceneEvent::PenChanged => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Stroke lifecycle

    fn begin_stroke(&mut self, world: Point, is_eraser: bool) {
        let Some(layer_id) = self.layers.active_layer(self.state.whiteboard()) else {
            return;
        };
        let visible = self
            .state
            .whiteboard()
            .layer(layer_id)
            .map(|l| l.visible)
            .unwrap_or(false);
        if !visible {
            // Abort before any state mutation or history recording.
            let notice = self.host.translate("whiteboard.hidden_layer_notice");
            self.host.alert(&notice);
            return;
        }
        let pen = self.state.pen();
        self.renderer.start_stroke(layer_id, world, pen, is_eraser);
    }

    fn end_stroke(&mut self) {
        let Some(stroke) = self.renderer.finish_stroke() else {
            return;
        };
        // A press without movement is not a meaningful stroke.
        if stroke.points.len() < 2 {
            return;
        }
        self.state.record_history();
        self.state.add_stroke(stroke);
    }

    // ------------------------------------------------------------------
    // Selection, editing, resize

    fn begin_item_resize(&mut self, id: ItemId, handle: HandleKind, position: Point) {
        self.objects.select(id);
        let Some(start) = self.objects.begin_resize(self.state.whiteboard(), id, handle) else {
            return;
        };
        self.state.record_history();
        self.resize_gesture = Some(start);
        self.interaction.begin_resize(position);
        self.menu.show(self.state.whiteboard(), id, self.objects.is_editing(id));
    }

    fn deselect(&mut self) {
        if let Some(note) = self.objects.deselect() {
            self.persist_note_content(note);
        }
        self.menu.hide();
    }

    fn persist_note_content(&mut self, id: ItemId) {
        if let Some(editor) = self.editor.take() {
            let content = editor.content();
            self.state.update_item(id, |item| item.content = content);
        }
    }

    /// Desktop double-click on a note: enter edit mode.
    pub fn enter_note_edit(&mut self, id: ItemId) {
        self.objects.enter_edit(id);
        self.menu.show(self.state.whiteboard(), id, true);
    }

    /// Touch tap on a note; enters edit mode on the second tap of a double
    /// tap. Returns whether edit mode was entered.
    pub fn note_tap(&mut self, id: ItemId, position: Point, now: Instant) -> bool {
        let entered = self.objects.register_note_tap(id, position, now);
        if entered {
            self.menu.show(self.state.whiteboard(), id, true);
        }
        entered
    }

    /// Attach the host's rich-text editor for the note being edited.
    pub fn attach_editor(&mut self, editor: Box<dyn RichTextEditor>) {
        self.editor = Some(editor);
        self.sync_menu_states();
    }

    /// Focus left the edited note. Exits edit mode and persists content
    /// unless focus moved into the context menu.
    pub fn note_blur(&mut self, focus_into_menu: bool) {
        let Some(id) = self.objects.blur(focus_into_menu) else {
            return;
        };
        self.persist_note_content(id);
        self.menu.set_editing(false);
        self.route_scene_events();
    }

    /// Content input in the edited note: auto-grow its height to fit.
    pub fn note_input(&mut self, id: ItemId) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let Some(item) = self.state.whiteboard().item(id) else {
            return;
        };
        let (width, current_h) = (item.w, item.h);
        let new_h = self.objects.auto_grow_height(&editor.content(), width);
        if new_h > current_h {
            self.state.update_item(id, |i| i.h = new_h);
            self.route_scene_events();
        }
    }

    /// Click inside the edited note. When it lands in a checklist item's
    /// checkbox zone, toggles that item and suppresses caret placement
    /// (returns `true`).
    pub fn note_click(&mut self, id: ItemId, li_index: usize, local_x: f64) -> bool {
        if !self.objects.is_editing(id) || !checklist::in_checkbox_zone(local_x) {
            return false;
        }
        let Some(item) = self.state.whiteboard().item(id) else {
            return false;
        };
        let Some(rewritten) = checklist::toggle_item(&item.content, li_index) else {
            return false;
        };
        self.state.record_history();
        self.state.update_item(id, |i| i.content = rewritten);
        self.route_scene_events();
        true
    }

    /// Resynchronize context-menu button states from the live selection.
    pub fn sync_menu_states(&mut self) {
        if let Some(editor) = self.editor.as_deref() {
            self.menu.refresh_states(editor);
        }
    }

    /// Issue a formatting command to the active editor.
    pub fn exec_editor(&mut self, command: RichTextCommand) {
        if let Some(editor) = self.editor.as_mut() {
            editor.exec(command);
        }
        self.sync_menu_states();
    }

    /// Inline an image file at the caret of the active editor.
    pub fn insert_inline_image(&mut self, bytes: &[u8]) {
        if let Some(editor) = self.editor.as_mut() {
            menu::insert_image_file(editor.as_mut(), bytes);
        }
    }

    // ------------------------------------------------------------------
    // Toolbar surface

    pub fn set_mode(&mut self, mode: Mode) {
        self.interaction.set_mode(mode);
    }

    pub fn mode(&self) -> Mode {
        self.interaction.mode()
    }

    pub fn set_pen_color(&mut self, color: Rgba) {
        self.state.update_pen(|pen| pen.color = color);
        self.route_scene_events();
    }

    pub fn set_pen_size(&mut self, size: f64) {
        self.state.update_pen(|pen| pen.size = size.max(0.5));
        self.route_scene_events();
    }

    pub fn set_pen_opacity(&mut self, opacity: f64) {
        self.state.update_pen(|pen| pen.opacity = opacity.clamp(0.0, 1.0));
        self.route_scene_events();
    }

    pub fn pen(&mut self) -> PenSettings {
        self.state.pen()
    }

    /// Place a new empty note centered in the current viewport.
    pub fn add_note(&mut self) -> Option<ItemId> {
        let layer = self.layers.active_layer(self.state.whiteboard())?;
        let rect = ObjectManager::centered_spawn_rect(self.state.view(), self.viewport, DEFAULT_NOTE_SIZE);
        self.state.record_history();
        let item = Item::note(layer, "", rect);
        let id = item.id;
        self.state.add_item(item);
        self.route_scene_events();
        self.objects.select(id);
        self.menu.show(self.state.whiteboard(), id, false);
        Some(id)
    }

    /// Place a picked image file centered in the current viewport, scaled
    /// down to a sane spawn size.
    pub fn add_image(&mut self, bytes: &[u8]) -> Option<ItemId> {
        let layer = self.layers.active_layer(self.state.whiteboard())?;
        let decoded = match image::load_from_memory(bytes) {
            Ok(img) => img,
            Err(err) => {
                error!("rejecting image file: {err}");
                let notice = self.host.translate("whiteboard.invalid_image");
                self.host.alert(&notice);
                return None;
            }
        };
        let (nw, nh) = (decoded.width() as f64, decoded.height() as f64);
        if nw <= 0.0 || nh <= 0.0 {
            return None;
        }
        let scale = (MAX_IMAGE_SPAWN_WIDTH / nw).min(1.0);
        let size = Size::new(nw * scale, nh * scale);

        let mime = data_uri::sniff_mime(bytes).unwrap_or("image/png");
        let uri = data_uri::encode(mime, bytes);
        let rect = ObjectManager::centered_spawn_rect(self.state.view(), self.viewport, size);

        self.state.record_history();
        let item = Item::image(layer, uri, rect);
        let id = item.id;
        self.state.add_item(item);
        self.route_scene_events();
        self.objects.select(id);
        self.menu.show(self.state.whiteboard(), id, false);
        Some(id)
    }

    /// Delete the selected item (context menu delete).
    pub fn delete_selected(&mut self) {
        let Some(id) = self.objects.selected() else {
            return;
        };
        self.state.record_history();
        self.state.delete_item(id);
        self.menu.hide();
        self.route_scene_events();
    }

    pub fn selected_item(&self) -> Option<ItemId> {
        self.objects.selected()
    }

    pub fn reset_view(&mut self) {
        self.state.update_view(|v| v.reset());
        self.route_scene_events();
    }

    pub fn undo(&mut self) -> bool {
        let done = self.state.undo();
        self.route_scene_events();
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.state.redo();
        self.route_scene_events();
        done
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    // ------------------------------------------------------------------
    // Layer panel surface

    pub fn layer_rows(&mut self) -> Vec<LayerRow> {
        self.layers.rows(self.state.whiteboard())
    }

    pub fn add_layer(&mut self) -> LayerId {
        let id = self.layers.add(&mut self.state);
        self.route_scene_events();
        id
    }

    pub fn set_active_layer(&mut self, id: LayerId) {
        self.layers.set_active(id);
    }

    pub fn active_layer(&mut self) -> Option<LayerId> {
        self.layers.active_layer(self.state.whiteboard())
    }

    pub fn toggle_layer_visibility(&mut self, id: LayerId) {
        self.layers.toggle_visibility(&mut self.state, id);
        self.route_scene_events();
    }

    pub fn move_layer_up(&mut self, id: LayerId) {
        self.layers.move_up(&mut self.state, id);
        self.route_scene_events();
    }

    pub fn move_layer_down(&mut self, id: LayerId) {
        self.layers.move_down(&mut self.state, id);
        self.route_scene_events();
    }

    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        let deleted = self.layers.delete(&mut self.state, &mut self.host, id);
        self.route_scene_events();
        deleted
    }

    pub fn clear_active_layer(&mut self) -> bool {
        let cleared = self.layers.clear_active(&mut self.state, &mut self.host);
        self.route_scene_events();
        cleared
    }

    // ------------------------------------------------------------------
    // Context menu surface

    pub fn menu_entries(&mut self) -> Vec<MenuEntry> {
        self.menu.entries(self.state.whiteboard())
    }

    pub fn menu_visible(&self) -> bool {
        self.menu.is_visible()
    }

    pub fn menu_position(&self) -> Point {
        self.menu.position()
    }

    pub fn reset_selected_aspect_ratio(&mut self) {
        if let Some(id) = self.objects.selected() {
            menu::reset_aspect_ratio(&mut self.state, id);
            self.route_scene_events();
        }
    }

    pub fn toggle_selected_border(&mut self) {
        if let Some(id) = self.objects.selected() {
            menu::toggle_border(&mut self.state, id);
            self.route_scene_events();
        }
    }

    pub fn set_selected_border_color(&mut self, color: Rgba) {
        if let Some(id) = self.objects.selected() {
            menu::set_border_color(&mut self.state, id, color);
            self.route_scene_events();
        }
    }

    pub fn set_selected_border_width(&mut self, width: f64) {
        if let Some(id) = self.objects.selected() {
            menu::set_border_width(&mut self.state, id, width);
            self.route_scene_events();
        }
    }

    // ------------------------------------------------------------------
    // Introspection for hosts and tests

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateManager {
        &mut self.state
    }

    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    pub fn renderer(&self) -> &RenderEngine {
        &self.renderer
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }
}
