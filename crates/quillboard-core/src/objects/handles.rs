//! Resize handle definitions.

use kurbo::{Point, Rect};

/// Screen-space hit tolerance around a handle center.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// The eight resize handles: four corners and four edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl HandleKind {
    pub const ALL: [HandleKind; 8] = [
        HandleKind::NorthWest,
        HandleKind::North,
        HandleKind::NorthEast,
        HandleKind::East,
        HandleKind::SouthEast,
        HandleKind::South,
        HandleKind::SouthWest,
        HandleKind::West,
    ];

    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthWest
                | HandleKind::NorthEast
                | HandleKind::SouthEast
                | HandleKind::SouthWest
        )
    }

    /// Whether dragging this handle moves the left edge.
    pub fn moves_left(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthWest | HandleKind::West | HandleKind::SouthWest
        )
    }

    pub fn moves_right(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthEast | HandleKind::East | HandleKind::SouthEast
        )
    }

    pub fn moves_top(&self) -> bool {
        matches!(
            self,
            HandleKind::NorthWest | HandleKind::North | HandleKind::NorthEast
        )
    }

    pub fn moves_bottom(&self) -> bool {
        matches!(
            self,
            HandleKind::SouthWest | HandleKind::South | HandleKind::SouthEast
        )
    }

    /// Handle center on a bounding rectangle.
    pub fn position(&self, rect: Rect) -> Point {
        let cx = (rect.x0 + rect.x1) / 2.0;
        let cy = (rect.y0 + rect.y1) / 2.0;
        match self {
            HandleKind::NorthWest => Point::new(rect.x0, rect.y0),
            HandleKind::North => Point::new(cx, rect.y0),
            HandleKind::NorthEast => Point::new(rect.x1, rect.y0),
            HandleKind::East => Point::new(rect.x1, cy),
            HandleKind::SouthEast => Point::new(rect.x1, rect.y1),
            HandleKind::South => Point::new(cx, rect.y1),
            HandleKind::SouthWest => Point::new(rect.x0, rect.y1),
            HandleKind::West => Point::new(rect.x0, cy),
        }
    }
}

/// A handle with its current world-space position.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub kind: HandleKind,
    pub position: Point,
}

/// All eight handles for an item's bounding rectangle.
pub fn item_handles(rect: Rect) -> Vec<Handle> {
    HandleKind::ALL
        .iter()
        .map(|&kind| Handle {
            kind,
            position: kind.position(rect),
        })
        .collect()
}

/// Hit test the handles of a rectangle. Used by canvas-only hosts; DOM
/// hosts resolve handle hits themselves and pass them as [`HitTarget`].
///
/// [`HitTarget`]: crate::input::HitTarget
pub fn hit_test_handle(rect: Rect, point: Point, tolerance: f64) -> Option<HandleKind> {
    for handle in item_handles(rect) {
        let d = point - handle.position;
        if d.hypot2() <= tolerance * tolerance {
            return Some(handle.kind);
        }
    }
    None
}
