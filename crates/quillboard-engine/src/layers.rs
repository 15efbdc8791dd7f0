//! Layer panel view-model.
//!
//! Renders the layer list as typed rows and funnels every mutation through
//! the state manager. Layers are stored bottom-to-top, so the panel shows
//! them in reverse: row 0 is the topmost layer.

use quillboard_core::host::HostContext;
use quillboard_core::scene::{LayerId, Whiteboard};
use quillboard_core::state::StateManager;

/// One row of the layer list, top-to-bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRow {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub active: bool,
    /// Move toward the top of the stack; absent on the top row.
    pub can_move_up: bool,
    /// Move toward the bottom of the stack; absent on the bottom row.
    pub can_move_down: bool,
    /// Hidden while only one layer remains.
    pub can_delete: bool,
}

/// Layer list state: which layer receives new strokes and items.
#[derive(Debug, Default)]
pub struct LayerPanel {
    active: Option<LayerId>,
}

impl LayerPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active layer, falling back to the first layer when the previous
    /// active one is gone.
    pub fn active_layer(&mut self, wb: &Whiteboard) -> Option<LayerId> {
        match self.active {
            Some(id) if wb.has_layer(id) => Some(id),
            _ => {
                self.active = wb.layers.first().map(|l| l.id);
                self.active
            }
        }
    }

    pub fn set_active(&mut self, id: LayerId) {
        self.active = Some(id);
    }

    /// Rows in display order (topmost layer first).
    pub fn rows(&self, wb: &Whiteboard) -> Vec<LayerRow> {
        let count = wb.layers.len();
        wb.layers
            .iter()
            .enumerate()
            .rev()
            .map(|(index, layer)| LayerRow {
                id: layer.id,
                name: layer.name.clone(),
                visible: layer.visible,
                active: self.active == Some(layer.id),
                can_move_up: index + 1 < count,
                can_move_down: index > 0,
                can_delete: count > 1,
            })
            .collect()
    }

    /// Add a layer above the current stack and make it active.
    pub fn add(&mut self, state: &mut StateManager) -> LayerId {
        let n = state.whiteboard().layers.len() + 1;
        let id = state.add_layer(format!("Layer {n}"));
        self.active = Some(id);
        id
    }

    /// Move a layer one step toward the top of the stack.
    pub fn move_up(&self, state: &mut StateManager, id: LayerId) {
        if let Some(index) = state.whiteboard().layer_index(id) {
            state.reorder_layers(index, index + 1);
        }
    }

    /// Move a layer one step toward the bottom of the stack.
    pub fn move_down(&self, state: &mut StateManager, id: LayerId) {
        if let Some(index) = state.whiteboard().layer_index(id) {
            if index > 0 {
                state.reorder_layers(index, index - 1);
            }
        }
    }

    pub fn toggle_visibility(&self, state: &mut StateManager, id: LayerId) {
        state.toggle_layer_visibility(id);
    }

    /// Delete a layer after confirmation. Refuses to delete the last layer;
    /// cascades to the layer's items and strokes; the active layer falls
    /// back to the first remaining one.
    ///
    /// Returns whether the deletion happened.
    pub fn delete(&mut self, state: &mut StateManager, host: &mut HostContext, id: LayerId) -> bool {
        let wb = state.whiteboard();
        if wb.layers.len() <= 1 || !wb.has_layer(id) {
            return false;
        }
        if !host.confirm(&host.translate("whiteboard.layer_delete_confirm")) {
            return false;
        }
        state.record_history();
        state.delete_layer(id);
        if self.active == Some(id) {
            self.active = state.whiteboard().layers.first().map(|l| l.id);
        }
        true
    }

    /// Remove all strokes and items on the active layer, after confirmation.
    pub fn clear_active(&mut self, state: &mut StateManager, host: &mut HostContext) -> bool {
        let Some(id) = self.active_layer(state.whiteboard()) else {
            return false;
        };
        if !host.confirm(&host.translate("whiteboard.layer_clear_confirm")) {
            return false;
        }
        state.record_history();
        state.clear_layer(id);
        true
    }
}
