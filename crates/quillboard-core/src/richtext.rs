//! Rich-text editing capability.
//!
//! In-canvas notes and the document editor of the surrounding application
//! share one formatting surface: a host-implemented command executor plus a
//! selection-state query. The whiteboard never manipulates the editor's
//! selection itself; it issues commands and mirrors the reported state onto
//! toolbar buttons.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Formatting commands the context menu can issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RichTextCommand {
    /// Editor-level undo, distinct from scene history.
    Undo,
    /// Editor-level redo, distinct from scene history.
    Redo,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    FontSize(u8),
    ForeColor(Rgba),
    HighlightColor(Rgba),
    RemoveFormat,
    Align(TextAlign),
    OrderedList,
    UnorderedList,
    /// Convert the current list into the checklist convention.
    Checklist,
    /// Inline an image at the caret as a data URI.
    InsertImage { data_uri: String },
}

/// Formatting state at the current selection, for button active-states.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextStyleState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub align: TextAlign,
    pub ordered_list: bool,
    pub unordered_list: bool,
    pub checklist: bool,
    pub font_size: Option<u8>,
}

/// Host-implemented rich-text editor attached to the note being edited.
pub trait RichTextEditor {
    /// Execute a formatting command against the current selection.
    fn exec(&mut self, command: RichTextCommand);

    /// Formatting state at the current selection.
    fn query_state(&self) -> TextStyleState;

    /// The note's current HTML fragment, read back on blur to persist.
    fn content(&self) -> String;
}
