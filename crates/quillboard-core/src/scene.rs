//! Scene data model: the whiteboard root and everything it owns.
//!
//! The whiteboard lives inside a host-owned project object. It is created
//! lazily with defaults the first time the engine touches a project that has
//! none, and persists for the project's lifetime.

use crate::color::Rgba;
use crate::view::ViewTransform;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a floating item.
pub type ItemId = Uuid;
/// Identifier for a committed stroke.
pub type StrokeId = Uuid;
/// Identifier for a layer.
pub type LayerId = Uuid;

/// An ordered, independently hideable bucket of strokes and items.
///
/// Storage order of layers is z-order, index 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            visible: true,
        }
    }
}

/// Optional border on an image item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f64,
    pub color: Rgba,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            width: 5.0,
            color: Rgba::black(),
        }
    }
}

/// Type-specific payload of a floating item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    /// Rich-text note. `content` holds an HTML fragment.
    Note {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        background_color: Option<Rgba>,
    },
    /// Placed image. `content` holds a data URI or URL.
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        border: Option<Border>,
    },
}

/// A floating object on the board (note or image).
///
/// Geometry is stored in world space; `w`/`h` are always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub layer_id: LayerId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub content: String,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    pub fn note(layer_id: LayerId, content: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer_id,
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
            content: content.into(),
            kind: ItemKind::Note {
                background_color: None,
            },
        }
    }

    pub fn image(layer_id: LayerId, content: impl Into<String>, rect: Rect) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer_id,
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
            content: content.into(),
            kind: ItemKind::Image { border: None },
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self.kind, ItemKind::Note { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ItemKind::Image { .. })
    }

    /// World-space bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x0;
        self.y = rect.y0;
        self.w = rect.width();
        self.h = rect.height();
    }
}

/// A committed freehand stroke.
///
/// Eraser strokes are stored identically to ink strokes; only the compositing
/// mode at render time differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    /// Points in world space, in draw order.
    pub points: Vec<Point>,
    pub color: Rgba,
    pub size: f64,
    pub opacity: f64,
    pub layer_id: LayerId,
    pub is_eraser: bool,
}

impl Stroke {
    /// World-space bounding rectangle of the polyline (ignores stroke width).
    pub fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        let mut rect = Rect::new(first.x, first.y, first.x, first.y);
        for p in points {
            rect = rect.union_pt(*p);
        }
        rect
    }
}

/// Current brush configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenSettings {
    pub color: Rgba,
    /// Brush diameter in world units.
    pub size: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self {
            color: Rgba::black(),
            size: 3.0,
            opacity: 1.0,
        }
    }
}

/// Name of the layer created when a whiteboard is first materialized.
pub const DEFAULT_LAYER_NAME: &str = "Layer 1";

/// The whiteboard root.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Whiteboard {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub pen: PenSettings,
    #[serde(default)]
    pub view: ViewTransform,
}

impl Whiteboard {
    /// A fresh whiteboard with the default layer already present.
    pub fn with_defaults() -> Self {
        Self {
            layers: vec![Layer::new(DEFAULT_LAYER_NAME)],
            ..Self::default()
        }
    }

    /// Make sure at least one layer exists. Returns the bottom layer's id.
    pub fn ensure_layer(&mut self) -> LayerId {
        if self.layers.is_empty() {
            self.layers.push(Layer::new(DEFAULT_LAYER_NAME));
        }
        self.layers[0].id
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Z index of a layer (0 = bottom), if it exists.
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Strokes belonging to a layer, in draw order.
    pub fn layer_strokes(&self, id: LayerId) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(move |s| s.layer_id == id)
    }
}

/// The host-owned project object.
///
/// The engine only knows about the optional `whiteboard` field; everything
/// else the host stores in the project survives a save round-trip untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whiteboard: Option<Whiteboard>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
