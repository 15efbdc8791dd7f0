//! Snapshot-based undo/redo history.
//!
//! History entries are deep copies of `{items, strokes}` taken strictly
//! before each history-worthy mutation. Layers, pen and view settings are
//! intentionally outside undo scope. The stack is a bounded ring: pushing
//! past the cap evicts the oldest entry and shifts the undo floor.

use crate::scene::{Item, Stroke};

/// Maximum number of history entries kept.
pub const MAX_HISTORY: usize = 50;

/// One undo/redo entry: an independent deep copy of the undoable scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub strokes: Vec<Stroke>,
}

/// Copy mechanism seam.
///
/// The default deep clone is the simplest correct model for scenes this
/// size; swapping the cloner for structural sharing is possible without
/// touching history semantics.
pub trait SceneCloner {
    fn snapshot(&self, items: &[Item], strokes: &[Stroke]) -> Snapshot;
}

/// Structural deep copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeepCloner;

impl SceneCloner for DeepCloner {
    fn snapshot(&self, items: &[Item], strokes: &[Stroke]) -> Snapshot {
        Snapshot {
            items: items.to_vec(),
            strokes: strokes.to_vec(),
        }
    }
}

/// Linear undo history with a movable cursor.
///
/// `entries[..index]` are the undoable past; anything beyond `index` is the
/// redo branch, discarded the moment a new mutation is recorded.
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    cloner: Box<dyn SceneCloner>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Box::new(DeepCloner))
    }
}

impl History {
    pub fn new(cloner: Box<dyn SceneCloner>) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            cloner,
        }
    }

    /// Record the pre-mutation state. Call strictly before mutating.
    ///
    /// Truncates any redo branch, then pushes a fresh snapshot; exceeding
    /// [`MAX_HISTORY`] evicts the oldest entry and lowers the undo floor.
    pub fn record(&mut self, items: &[Item], strokes: &[Stroke]) {
        self.entries.truncate(self.index);
        let snapshot = self.cloner.snapshot(items, strokes);
        self.entries.push(snapshot);
        self.index = self.entries.len();
        self.evict_overflow();
    }

    /// Step back one entry. Returns the snapshot to restore, or `None` at
    /// the floor.
    ///
    /// The first undo after a run of mutations captures the live state as
    /// the redo tip, so a later redo can come all the way back.
    pub fn undo(&mut self, items: &[Item], strokes: &[Stroke]) -> Option<Snapshot> {
        if self.index == 0 {
            return None;
        }
        if self.index == self.entries.len() {
            let tip = self.cloner.snapshot(items, strokes);
            self.entries.push(tip);
            self.evict_overflow();
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward one entry. Returns the snapshot to restore, or `None`
    /// at the tip.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }

    fn evict_overflow(&mut self) {
        while self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
            self.index = self.index.saturating_sub(1);
        }
    }
}
