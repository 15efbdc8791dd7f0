//! Single source of truth for scene data.
//!
//! The state manager owns the project object, exposes the mutation API,
//! records undo history, and coalesces persistence into a debounced save.
//! Mutators targeting unknown ids are silent no-ops: under UI races a delete
//! can land before a queued callback fires, and that must not be an error.
//!
//! Change notification is a typed event queue. Mutators enqueue
//! [`SceneEvent`]s; the orchestrator drains and routes them, so components
//! never hold callbacks into each other.

use crate::history::{History, MAX_HISTORY, Snapshot};
use crate::host::SaveFn;
use crate::scene::{Item, ItemId, Layer, LayerId, PenSettings, Project, Stroke, Whiteboard};
use crate::view::ViewTransform;
use log::{debug, warn};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Quiet period after the last qualifying mutation before a save fires.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Typed change notifications fanned out to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    ItemAdded(ItemId),
    ItemUpdated(ItemId),
    ItemDeleted(ItemId),
    StrokesChanged,
    LayersChanged,
    PenChanged,
    ViewChanged,
    /// Items and strokes were replaced wholesale (undo/redo).
    SceneRestored,
}

/// Debounced save deadline.
///
/// A single pending deadline per state manager; every qualifying mutation
/// resets the window instead of queuing another save. The host's event-loop
/// tick polls the deadline.
#[derive(Debug)]
pub struct SaveScheduler {
    deadline: Option<Instant>,
    window: Duration,
}

impl SaveScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            deadline: None,
            window,
        }
    }

    /// Reset the debounce window from `now`.
    pub fn mark(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has elapsed by `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for SaveScheduler {
    fn default() -> Self {
        Self::new(SAVE_DEBOUNCE)
    }
}

/// Owner of the canonical scene, its history, and its persistence debounce.
pub struct StateManager {
    project: Project,
    history: History,
    scheduler: SaveScheduler,
    save: SaveFn,
    events: VecDeque<SceneEvent>,
}

impl StateManager {
    pub fn new(project: Project, save: SaveFn) -> Self {
        Self {
            project,
            history: History::default(),
            scheduler: SaveScheduler::default(),
            save,
            events: VecDeque::new(),
        }
    }

    /// The live whiteboard, materializing defaults if the project has none.
    pub fn whiteboard(&mut self) -> &Whiteboard {
        self.wb()
    }

    /// The whiteboard if the project already carries one.
    pub fn try_whiteboard(&self) -> Option<&Whiteboard> {
        self.project.whiteboard.as_ref()
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    fn wb(&mut self) -> &mut Whiteboard {
        self.project.whiteboard.get_or_insert_with(|| {
            debug!("materializing whiteboard defaults");
            Whiteboard::with_defaults()
        })
    }

    // ------------------------------------------------------------------
    // History

    /// Snapshot the undoable scene. Call strictly before a mutation.
    pub fn record_history(&mut self) {
        let wb = self.project.whiteboard.get_or_insert_with(Whiteboard::with_defaults);
        self.history.record(&wb.items, &wb.strokes);
    }

    /// Restore the previous snapshot. Returns `false` at the floor.
    pub fn undo(&mut self) -> bool {
        let wb = self.project.whiteboard.get_or_insert_with(Whiteboard::with_defaults);
        let Some(snapshot) = self.history.undo(&wb.items, &wb.strokes) else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Restore the next snapshot. Returns `false` at the tip.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let wb = self.project.whiteboard.get_or_insert_with(Whiteboard::with_defaults);
        wb.items = snapshot.items;
        wb.strokes = snapshot.strokes;
        self.changed(SceneEvent::SceneRestored);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Upper bound on stored snapshots, re-exported for UI copy.
    pub fn history_cap(&self) -> usize {
        MAX_HISTORY
    }

    // ------------------------------------------------------------------
    // Item mutators

    /// Insert an item. No-op if its layer does not exist.
    pub fn add_item(&mut self, item: Item) {
        if !self.wb().has_layer(item.layer_id) {
            warn!("add_item: unknown layer {}", item.layer_id);
            return;
        }
        let id = item.id;
        self.wb().items.push(item);
        self.changed(SceneEvent::ItemAdded(id));
    }

    /// Apply a patch to an item. No-op if the id is unknown.
    pub fn update_item(&mut self, id: ItemId, patch: impl FnOnce(&mut Item)) {
        let Some(item) = self.wb().item_mut(id) else {
            return;
        };
        patch(item);
        self.changed(SceneEvent::ItemUpdated(id));
    }

    /// Remove an item. No-op if the id is unknown.
    pub fn delete_item(&mut self, id: ItemId) {
        let wb = self.wb();
        let before = wb.items.len();
        wb.items.retain(|i| i.id != id);
        if wb.items.len() != before {
            self.changed(SceneEvent::ItemDeleted(id));
        }
    }

    // ------------------------------------------------------------------
    // Stroke mutators

    /// Commit a finished stroke. No-op if its layer does not exist.
    pub fn add_stroke(&mut self, stroke: Stroke) {
        if !self.wb().has_layer(stroke.layer_id) {
            warn!("add_stroke: unknown layer {}", stroke.layer_id);
            return;
        }
        self.wb().strokes.push(stroke);
        self.changed(SceneEvent::StrokesChanged);
    }

    // ------------------------------------------------------------------
    // Layer mutators

    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let layer = Layer::new(name);
        let id = layer.id;
        self.wb().layers.push(layer);
        self.changed(SceneEvent::LayersChanged);
        id
    }

    /// Delete a layer, cascading to its items and strokes.
    ///
    /// The last-layer guard is the layer panel's contract, not enforced
    /// here; unknown ids are no-ops.
    pub fn delete_layer(&mut self, id: LayerId) {
        let wb = self.wb();
        if !wb.has_layer(id) {
            return;
        }
        wb.layers.retain(|l| l.id != id);
        wb.items.retain(|i| i.layer_id != id);
        wb.strokes.retain(|s| s.layer_id != id);
        self.changed(SceneEvent::LayersChanged);
    }

    pub fn toggle_layer_visibility(&mut self, id: LayerId) {
        let Some(layer) = self.wb().layer_mut(id) else {
            return;
        };
        layer.visible = !layer.visible;
        self.changed(SceneEvent::LayersChanged);
    }

    /// Move the layer at index `from` to index `to` (z-order reorder).
    pub fn reorder_layers(&mut self, from: usize, to: usize) {
        let wb = self.wb();
        if from >= wb.layers.len() || to >= wb.layers.len() || from == to {
            return;
        }
        let layer = wb.layers.remove(from);
        wb.layers.insert(to, layer);
        self.changed(SceneEvent::LayersChanged);
    }

    /// Remove every stroke and item belonging to a layer, keeping the layer.
    pub fn clear_layer(&mut self, id: LayerId) {
        let wb = self.wb();
        if !wb.has_layer(id) {
            return;
        }
        wb.items.retain(|i| i.layer_id != id);
        wb.strokes.retain(|s| s.layer_id != id);
        self.changed(SceneEvent::LayersChanged);
    }

    // ------------------------------------------------------------------
    // Pen and view

    pub fn update_pen(&mut self, patch: impl FnOnce(&mut PenSettings)) {
        patch(&mut self.wb().pen);
        self.changed(SceneEvent::PenChanged);
    }

    /// Mutate the view transform.
    ///
    /// Never schedules a save: continuous pan/zoom would thrash persistence.
    /// View changes reach disk only on the debounce of some other action.
    pub fn update_view(&mut self, patch: impl FnOnce(&mut ViewTransform)) {
        let wb = self.wb();
        patch(&mut wb.view);
        wb.view.clamp_scale();
        self.events.push_back(SceneEvent::ViewChanged);
    }

    pub fn view(&mut self) -> ViewTransform {
        self.wb().view
    }

    pub fn pen(&mut self) -> PenSettings {
        self.wb().pen
    }

    // ------------------------------------------------------------------
    // Persistence

    /// Reset the debounce window.
    pub fn schedule_save(&mut self) {
        self.scheduler.mark(Instant::now());
    }

    /// Flush immediately, canceling any pending debounce.
    pub fn save_now(&mut self) {
        self.scheduler.cancel();
        (self.save)(&self.project);
    }

    /// Poll the debounce deadline; saves when the quiet period elapsed.
    /// Returns whether a save fired.
    pub fn maybe_save(&mut self, now: Instant) -> bool {
        if self.scheduler.take_due(now) {
            (self.save)(&self.project);
            true
        } else {
            false
        }
    }

    pub fn save_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    // ------------------------------------------------------------------
    // Events

    /// Drain queued change notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        self.events.drain(..).collect()
    }

    fn changed(&mut self, event: SceneEvent) {
        self.events.push_back(event);
        self.schedule_save();
    }
}
