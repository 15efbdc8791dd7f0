//! Quillboard Core Library
//!
//! Toolkit-agnostic scene model and interaction logic for the Quillboard
//! whiteboard engine.

pub mod color;
pub mod data_uri;
pub mod history;
pub mod host;
pub mod input;
pub mod interaction;
pub mod objects;
pub mod richtext;
pub mod scene;
pub mod state;
pub mod text;
pub mod view;

pub use color::Rgba;
pub use history::{History, MAX_HISTORY, SceneCloner, Snapshot};
pub use host::{HostContext, NullPrompter, Prompter, SaveFn, Translator};
pub use input::{HitTarget, KeyEvent, Modifiers, MouseButton, PointerEvent, WheelDeltaMode};
pub use interaction::{Action, InteractionHandler, Mode};
pub use objects::{ObjectHandle, ObjectManager};
pub use richtext::{RichTextCommand, RichTextEditor, TextAlign, TextStyleState};
pub use scene::{
    Border, Item, ItemId, ItemKind, Layer, LayerId, PenSettings, Project, Stroke, StrokeId,
    Whiteboard,
};
pub use state::{SceneEvent, StateManager};
pub use text::{HeuristicTextMeasurer, TextMeasurer};
pub use view::{MAX_SCALE, MIN_SCALE, ViewTransform};
