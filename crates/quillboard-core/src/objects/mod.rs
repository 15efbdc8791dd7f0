//! Retained-mode object manager.
//!
//! Items are realized as directly manipulable handles outside the raster
//! canvas. The manager keeps an arena keyed by item id; each entry is the
//! renderer-owned realization of one item (geometry, stacking, selection and
//! edit state), decoupled from any particular UI toolkit.
//!
//! Structural changes (layer edits, undo/redo) rebuild the whole arena via
//! [`ObjectManager::render_all`] instead of diffing; the scenes are small
//! and a rebuild is always correct.

pub mod checklist;
pub mod handles;
pub mod resize;

use crate::input::DoubleTapDetector;
use crate::scene::{ItemId, ItemKind, Whiteboard};
use crate::text::{HeuristicTextMeasurer, TextMeasurer};
use crate::view::ViewTransform;
use handles::{Handle, HandleKind, item_handles};
use kurbo::{Point, Rect, Size, Vec2};
use log::debug;
use resize::{ResizeStart, perform_resize};
use std::collections::HashMap;
use std::time::Instant;

/// Auto-grow floor for note height while editing.
pub const AUTO_GROW_MIN_HEIGHT: f64 = 160.0;
/// Default size of a freshly spawned note.
pub const DEFAULT_NOTE_SIZE: Size = Size::new(200.0, 160.0);

/// Live realization of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectHandle {
    pub id: ItemId,
    /// World-space geometry mirror.
    pub rect: Rect,
    /// Stacking order: the owning layer's index among all layers.
    pub z: usize,
    /// Scene insertion order, breaking ties within a layer.
    pub order: usize,
    /// False when the owning layer is hidden or missing; the handle stays
    /// in the arena so the data model is untouched.
    pub displayed: bool,
    pub selected: bool,
    pub editing: bool,
}

/// Arena of item realizations plus selection/editing state.
pub struct ObjectManager {
    arena: HashMap<ItemId, ObjectHandle>,
    selected: Option<ItemId>,
    editing: Option<ItemId>,
    taps: DoubleTapDetector,
    measurer: Box<dyn TextMeasurer>,
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new(Box::new(HeuristicTextMeasurer::default()))
    }
}

impl ObjectManager {
    pub fn new(measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            arena: HashMap::new(),
            selected: None,
            editing: None,
            taps: DoubleTapDetector::new(),
            measurer,
        }
    }

    // ------------------------------------------------------------------
    // Arena lifecycle

    /// Full rebuild from the scene. Selection and edit state survive if
    /// their item still exists.
    pub fn render_all(&mut self, wb: &Whiteboard) {
        self.arena.clear();
        for (order, item) in wb.items.iter().enumerate() {
            let layer_index = wb.layer_index(item.layer_id);
            let displayed = wb
                .layer(item.layer_id)
                .map(|l| l.visible)
                .unwrap_or(false);
            self.arena.insert(
                item.id,
                ObjectHandle {
                    id: item.id,
                    rect: item.rect(),
                    z: layer_index.unwrap_or(0),
                    order,
                    displayed,
                    selected: self.selected == Some(item.id),
                    editing: self.editing == Some(item.id),
                },
            );
        }
        if self.selected.is_some_and(|id| !self.arena.contains_key(&id)) {
            self.selected = None;
        }
        if self.editing.is_some_and(|id| !self.arena.contains_key(&id)) {
            self.editing = None;
        }
        debug!("object arena rebuilt: {} handles", self.arena.len());
    }

    /// Refresh one handle's geometry, stacking and visibility from the
    /// scene. No-op if either side no longer has the item.
    pub fn update_item_transform(&mut self, wb: &Whiteboard, id: ItemId) {
        let Some(order) = wb.items.iter().position(|i| i.id == id) else {
            self.arena.remove(&id);
            return;
        };
        let item = &wb.items[order];
        let Some(handle) = self.arena.get_mut(&id) else {
            return;
        };
        handle.rect = item.rect();
        handle.z = wb.layer_index(item.layer_id).unwrap_or(0);
        handle.order = order;
        handle.displayed = wb.layer(item.layer_id).map(|l| l.visible).unwrap_or(false);
    }

    pub fn handle(&self, id: ItemId) -> Option<&ObjectHandle> {
        self.arena.get(&id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Handles in stacking order, bottom first. Layer index dominates;
    /// insertion order breaks ties within a layer.
    pub fn stacked(&self) -> Vec<ObjectHandle> {
        let mut all: Vec<ObjectHandle> = self.arena.values().copied().collect();
        all.sort_by_key(|h| (h.z, h.order));
        all
    }

    /// Topmost displayed item containing a world point.
    pub fn item_at(&self, world: Point) -> Option<ItemId> {
        self.stacked()
            .into_iter()
            .rev()
            .find(|h| h.displayed && h.rect.contains(world))
            .map(|h| h.id)
    }

    // ------------------------------------------------------------------
    // Selection and editing

    pub fn select(&mut self, id: ItemId) {
        if self.selected == Some(id) {
            return;
        }
        self.deselect();
        self.selected = Some(id);
        if let Some(handle) = self.arena.get_mut(&id) {
            handle.selected = true;
        }
    }

    /// Clear selection, exiting edit mode if active. Returns the item that
    /// was being edited, so the caller can persist its content.
    pub fn deselect(&mut self) -> Option<ItemId> {
        let exited = self.exit_edit();
        if let Some(id) = self.selected.take() {
            if let Some(handle) = self.arena.get_mut(&id) {
                handle.selected = false;
            }
        }
        exited
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    /// Resize-handle positions for the selected item.
    pub fn selection_handles(&self) -> Vec<Handle> {
        self.selected
            .and_then(|id| self.arena.get(&id))
            .map(|h| item_handles(h.rect))
            .unwrap_or_default()
    }

    /// Register a tap on a note; enters edit mode on the second tap of a
    /// double tap. Desktop double-clicks call [`Self::enter_edit`] directly.
    pub fn register_note_tap(&mut self, id: ItemId, position: Point, now: Instant) -> bool {
        if self.taps.register(position, now) {
            self.enter_edit(id);
            true
        } else {
            false
        }
    }

    /// Put a note into edit mode: content editable, drag suppressed.
    pub fn enter_edit(&mut self, id: ItemId) {
        if self.editing == Some(id) {
            return;
        }
        self.exit_edit();
        self.select(id);
        self.editing = Some(id);
        if let Some(handle) = self.arena.get_mut(&id) {
            handle.editing = true;
        }
    }

    /// Leave edit mode. Returns the item whose content should be persisted.
    pub fn exit_edit(&mut self) -> Option<ItemId> {
        let id = self.editing.take()?;
        if let Some(handle) = self.arena.get_mut(&id) {
            handle.editing = false;
        }
        Some(id)
    }

    /// Focus left the note element. Exits edit mode unless focus moved into
    /// the context menu (formatting buttons must not end the session).
    pub fn blur(&mut self, focus_into_menu: bool) -> Option<ItemId> {
        if focus_into_menu {
            return None;
        }
        self.exit_edit()
    }

    pub fn editing(&self) -> Option<ItemId> {
        self.editing
    }

    pub fn is_editing(&self, id: ItemId) -> bool {
        self.editing == Some(id)
    }

    // ------------------------------------------------------------------
    // Geometry operations

    /// Capture resize-start geometry for a handle pointer-down. The caller
    /// records history before using it.
    pub fn begin_resize(
        &self,
        wb: &Whiteboard,
        id: ItemId,
        handle: HandleKind,
    ) -> Option<ResizeStart> {
        let item = wb.item(id)?;
        let aspect = match item.kind {
            ItemKind::Image { .. } if item.h > 0.0 => Some(item.w / item.h),
            _ => None,
        };
        Some(ResizeStart {
            item: id,
            handle,
            rect: item.rect(),
            aspect,
        })
    }

    /// Rectangle after dragging the resize handle by `delta` world units,
    /// honoring aspect lock (images) and the content floor (notes).
    pub fn resize_rect(&self, wb: &Whiteboard, start: &ResizeStart, delta: Vec2) -> Option<Rect> {
        let item = wb.item(start.item)?;
        let rect = match item.kind {
            ItemKind::Note { .. } => {
                let content = item.content.clone();
                let measurer = &*self.measurer;
                let floor = move |w: f64| measurer.content_height(&content, w);
                perform_resize(start, delta, Some(&floor))
            }
            ItemKind::Image { .. } => perform_resize(start, delta, None),
        };
        Some(rect)
    }

    /// Height a note should have after a content input event: at least the
    /// content's measured height, never below [`AUTO_GROW_MIN_HEIGHT`].
    pub fn auto_grow_height(&self, content: &str, width: f64) -> f64 {
        self.measurer
            .content_height(content, width)
            .max(AUTO_GROW_MIN_HEIGHT)
    }

    /// World-space rectangle centering a new item in the current viewport.
    pub fn centered_spawn_rect(view: ViewTransform, viewport: Size, size: Size) -> Rect {
        let center = view.screen_to_world(Point::new(viewport.width / 2.0, viewport.height / 2.0));
        Rect::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            center.x + size.width / 2.0,
            center.y + size.height / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Item, Layer};
    use std::time::Duration;

    fn board_with_items() -> (Whiteboard, ItemId, ItemId) {
        let mut wb = Whiteboard::with_defaults();
        let bottom = wb.layers[0].id;
        let top_layer = Layer::new("Layer 2");
        let top = top_layer.id;
        wb.layers.push(top_layer);

        let a = Item::note(bottom, "<p>a</p>", Rect::new(0.0, 0.0, 200.0, 160.0));
        let b = Item::image(top, "data:,", Rect::new(50.0, 50.0, 250.0, 150.0));
        let (ia, ib) = (a.id, b.id);
        wb.items.push(a);
        wb.items.push(b);
        (wb, ia, ib)
    }

    #[test]
    fn test_render_all_builds_arena() {
        let (wb, a, b) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects.handle(a).unwrap().z, 0);
        assert_eq!(objects.handle(b).unwrap().z, 1);
        assert!(objects.handle(a).unwrap().displayed);
    }

    #[test]
    fn test_hidden_layer_items_not_displayed_but_present() {
        let (mut wb, a, _) = board_with_items();
        wb.layers[0].visible = false;
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        let handle = objects.handle(a).unwrap();
        assert!(!handle.displayed);
        assert_eq!(wb.items.len(), 2);
    }

    #[test]
    fn test_item_at_prefers_topmost() {
        let (wb, _, b) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        // (60, 60) is inside both items; the higher layer wins.
        assert_eq!(objects.item_at(Point::new(60.0, 60.0)), Some(b));
    }

    #[test]
    fn test_selection_single() {
        let (wb, a, b) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        objects.select(a);
        objects.select(b);
        assert_eq!(objects.selected(), Some(b));
        assert!(!objects.handle(a).unwrap().selected);
        assert!(objects.handle(b).unwrap().selected);
        assert_eq!(objects.selection_handles().len(), 8);
    }

    #[test]
    fn test_edit_mode_toggle() {
        let (wb, a, _) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        objects.enter_edit(a);
        assert!(objects.is_editing(a));
        // Blur into the menu keeps editing alive.
        assert_eq!(objects.blur(true), None);
        assert!(objects.is_editing(a));
        // Real blur exits and reports the note to persist.
        assert_eq!(objects.blur(false), Some(a));
        assert!(objects.editing().is_none());
    }

    #[test]
    fn test_double_tap_enters_edit() {
        let (wb, a, _) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        let now = Instant::now();
        let p = Point::new(10.0, 10.0);
        assert!(!objects.register_note_tap(a, p, now));
        assert!(objects.register_note_tap(a, p, now + Duration::from_millis(150)));
        assert!(objects.is_editing(a));
    }

    #[test]
    fn test_begin_resize_locks_image_aspect() {
        let (wb, a, b) = board_with_items();
        let objects = ObjectManager::default();
        let note = objects
            .begin_resize(&wb, a, HandleKind::SouthEast)
            .unwrap();
        assert!(note.aspect.is_none());
        let image = objects
            .begin_resize(&wb, b, HandleKind::SouthEast)
            .unwrap();
        assert!((image.aspect.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_rect_respects_note_content() {
        let (wb, a, _) = board_with_items();
        let objects = ObjectManager::default();
        let start = objects.begin_resize(&wb, a, HandleKind::South).unwrap();
        let rect = objects
            .resize_rect(&wb, &start, Vec2::new(0.0, -1000.0))
            .unwrap();
        let measured = HeuristicTextMeasurer::default().content_height("<p>a</p>", rect.width());
        assert!(rect.height() + 1e-9 >= measured.max(resize::MIN_HEIGHT));
    }

    #[test]
    fn test_auto_grow_floor() {
        let objects = ObjectManager::default();
        let h = objects.auto_grow_height("<p>x</p>", 200.0);
        assert_eq!(h, AUTO_GROW_MIN_HEIGHT);
    }

    #[test]
    fn test_centered_spawn_rect() {
        let view = ViewTransform::new(100.0, 50.0, 2.0);
        let viewport = Size::new(800.0, 600.0);
        let rect = ObjectManager::centered_spawn_rect(view, viewport, Size::new(200.0, 160.0));
        let center = view.screen_to_world(Point::new(400.0, 300.0));
        assert!((rect.center().x - center.x).abs() < 1e-9);
        assert!((rect.center().y - center.y).abs() < 1e-9);
        assert_eq!(rect.width(), 200.0);
    }

    #[test]
    fn test_update_item_transform_follows_scene() {
        let (mut wb, a, _) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        wb.item_mut(a).unwrap().x = 500.0;
        objects.update_item_transform(&wb, a);
        assert_eq!(objects.handle(a).unwrap().rect.x0, 500.0);
    }

    #[test]
    fn test_render_all_drops_stale_selection() {
        let (mut wb, a, _) = board_with_items();
        let mut objects = ObjectManager::default();
        objects.render_all(&wb);
        objects.select(a);
        wb.items.retain(|i| i.id != a);
        objects.render_all(&wb);
        assert_eq!(objects.selected(), None);
    }
}
