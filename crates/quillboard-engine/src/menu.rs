//! Floating per-object context menu.
//!
//! The menu is a view-model: typed entries the host renders however it
//! likes, anchored above the selected object's screen-space bounding box.
//! Content depends on the target kind and, for notes, on whether the note
//! is currently in edit mode. Only one menu is visible at a time.

use kurbo::Point;
use log::warn;
use quillboard_core::color::Rgba;
use quillboard_core::data_uri;
use quillboard_core::richtext::{RichTextCommand, RichTextEditor, TextAlign, TextStyleState};
use quillboard_core::scene::{Border, ItemId, ItemKind, Whiteboard};
use quillboard_core::state::StateManager;

/// Gap between the anchor's top edge and the menu, in screen pixels.
pub const MENU_OFFSET: f64 = 12.0;

/// Font sizes offered by the note toolbar.
pub const FONT_SIZES: [u8; 7] = [10, 12, 14, 16, 18, 24, 32];

/// What the menu is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Image(ItemId),
    NoteView(ItemId),
    NoteEdit(ItemId),
}

impl MenuTarget {
    pub fn item(&self) -> ItemId {
        match *self {
            MenuTarget::Image(id) | MenuTarget::NoteView(id) | MenuTarget::NoteEdit(id) => id,
        }
    }
}

/// One control of the menu, with its live active state where applicable.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    EditorUndo,
    EditorRedo,
    FontSize(Option<u8>),
    Bold { active: bool },
    Italic { active: bool },
    Underline { active: bool },
    Strikethrough { active: bool },
    ForeColor,
    HighlightColor,
    RemoveFormat,
    AlignLeft { active: bool },
    AlignCenter { active: bool },
    AlignRight { active: bool },
    OrderedList { active: bool },
    UnorderedList { active: bool },
    Checklist { active: bool },
    InsertImage,
    ResetAspectRatio,
    ToggleBorder { bordered: bool },
    BorderColor(Rgba),
    BorderWidth(f64),
    Delete,
}

/// Context menu state.
#[derive(Debug, Default)]
pub struct ContextMenu {
    target: Option<MenuTarget>,
    position: Point,
    states: TextStyleState,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the menu to an item. Replaces any previously shown menu.
    pub fn show(&mut self, wb: &Whiteboard, id: ItemId, editing: bool) {
        let Some(item) = wb.item(id) else {
            self.hide();
            return;
        };
        self.target = Some(match item.kind {
            ItemKind::Image { .. } => MenuTarget::Image(id),
            ItemKind::Note { .. } if editing => MenuTarget::NoteEdit(id),
            ItemKind::Note { .. } => MenuTarget::NoteView(id),
        });
        self.states = TextStyleState::default();
        self.update_position(wb);
    }

    /// Fully clear menu state.
    pub fn hide(&mut self) {
        self.target = None;
        self.states = TextStyleState::default();
    }

    pub fn is_visible(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<MenuTarget> {
        self.target
    }

    /// Screen position the host should render the menu at (bottom-center of
    /// the menu sits here).
    pub fn position(&self) -> Point {
        self.position
    }

    /// Re-anchor above the target's bounding box. Call whenever the canvas
    /// pans/zooms or the anchored item is dragged/resized. Hides the menu
    /// when the target item no longer exists.
    pub fn update_position(&mut self, wb: &Whiteboard) {
        let Some(target) = self.target else {
            return;
        };
        let Some(item) = wb.item(target.item()) else {
            self.hide();
            return;
        };
        let rect = item.rect();
        let anchor = wb
            .view
            .world_to_screen(Point::new(rect.center().x, rect.y0));
        self.position = Point::new(anchor.x, anchor.y - MENU_OFFSET);
    }

    /// A note entered or left edit mode while selected.
    pub fn set_editing(&mut self, editing: bool) {
        self.target = match self.target {
            Some(MenuTarget::NoteView(id)) if editing => Some(MenuTarget::NoteEdit(id)),
            Some(MenuTarget::NoteEdit(id)) if !editing => Some(MenuTarget::NoteView(id)),
            other => other,
        };
        if !matches!(self.target, Some(MenuTarget::NoteEdit(_))) {
            self.states = TextStyleState::default();
        }
    }

    /// Resynchronize button active-states from the live selection. Call
    /// after every selection-changing interaction inside the note.
    pub fn refresh_states(&mut self, editor: &dyn RichTextEditor) {
        if matches!(self.target, Some(MenuTarget::NoteEdit(_))) {
            self.states = editor.query_state();
        }
    }

    /// The controls to render, in display order.
    pub fn entries(&self, wb: &Whiteboard) -> Vec<MenuEntry> {
        let Some(target) = self.target else {
            return Vec::new();
        };
        match target {
            MenuTarget::Image(id) => {
                let border = wb.item(id).and_then(|item| match item.kind {
                    ItemKind::Image { border } => border,
                    _ => None,
                });
                let mut entries = vec![
                    MenuEntry::ResetAspectRatio,
                    MenuEntry::ToggleBorder {
                        bordered: border.is_some(),
                    },
                ];
                if let Some(border) = border {
                    entries.push(MenuEntry::BorderColor(border.color));
                    entries.push(MenuEntry::BorderWidth(border.width));
                }
                entries.push(MenuEntry::Delete);
                entries
            }
            MenuTarget::NoteView(_) => vec![MenuEntry::Delete],
            MenuTarget::NoteEdit(_) => {
                let s = self.states;
                vec![
                    MenuEntry::EditorUndo,
                    MenuEntry::EditorRedo,
                    MenuEntry::FontSize(s.font_size),
                    MenuEntry::Bold { active: s.bold },
                    MenuEntry::Italic { active: s.italic },
                    MenuEntry::Underline { active: s.underline },
                    MenuEntry::Strikethrough {
                        active: s.strikethrough,
                    },
                    MenuEntry::ForeColor,
                    MenuEntry::HighlightColor,
                    MenuEntry::RemoveFormat,
                    MenuEntry::AlignLeft {
                        active: s.align == TextAlign::Left,
                    },
                    MenuEntry::AlignCenter {
                        active: s.align == TextAlign::Center,
                    },
                    MenuEntry::AlignRight {
                        active: s.align == TextAlign::Right,
                    },
                    MenuEntry::OrderedList {
                        active: s.ordered_list,
                    },
                    MenuEntry::UnorderedList {
                        active: s.unordered_list,
                    },
                    MenuEntry::Checklist {
                        active: s.checklist,
                    },
                    MenuEntry::InsertImage,
                    MenuEntry::Delete,
                ]
            }
        }
    }
}

// ----------------------------------------------------------------------
// Image operations

/// Natural pixel dimensions of an image item's data URI.
pub fn natural_size(content: &str) -> Option<(u32, u32)> {
    let (_mime, bytes) = data_uri::decode(content)?;
    match image::load_from_memory(&bytes) {
        Ok(img) => Some((img.width(), img.height())),
        Err(err) => {
            warn!("failed to decode image content: {err}");
            None
        }
    }
}

/// Recompute the item's height from the rendered image's natural ratio.
pub fn reset_aspect_ratio(state: &mut StateManager, id: ItemId) {
    let Some(item) = state.whiteboard().item(id) else {
        return;
    };
    let Some((nw, nh)) = natural_size(&item.content) else {
        return;
    };
    if nw == 0 || nh == 0 {
        return;
    }
    let ratio = nw as f64 / nh as f64;
    state.record_history();
    state.update_item(id, |item| {
        item.h = item.w / ratio;
    });
}

/// Add the default 5px black border, or remove the current one.
pub fn toggle_border(state: &mut StateManager, id: ItemId) {
    state.record_history();
    state.update_item(id, |item| {
        if let ItemKind::Image { border } = &mut item.kind {
            *border = match border {
                Some(_) => None,
                None => Some(Border::default()),
            };
        }
    });
}

pub fn set_border_color(state: &mut StateManager, id: ItemId, color: Rgba) {
    state.update_item(id, |item| {
        if let ItemKind::Image {
            border: Some(border),
        } = &mut item.kind
        {
            border.color = color;
        }
    });
}

pub fn set_border_width(state: &mut StateManager, id: ItemId, width: f64) {
    state.update_item(id, |item| {
        if let ItemKind::Image {
            border: Some(border),
        } = &mut item.kind
        {
            border.width = width.max(0.0);
        }
    });
}

/// Inline a picked file at the caret as a data URI.
pub fn insert_image_file(editor: &mut dyn RichTextEditor, bytes: &[u8]) {
    let mime = data_uri::sniff_mime(bytes).unwrap_or("application/octet-stream");
    let uri = data_uri::encode(mime, bytes);
    editor.exec(RichTextCommand::InsertImage { data_uri: uri });
}
