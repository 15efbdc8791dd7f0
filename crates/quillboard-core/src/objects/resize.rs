//! Resize geometry.
//!
//! All math happens in world space on the item's bounding rectangle. A
//! north/west handle moves the near edge so the opposite edge stays
//! anchored; clamping always adjusts the moving edge.

use super::handles::HandleKind;
use crate::scene::ItemId;
use kurbo::{Rect, Vec2};

/// Floor for item width.
pub const MIN_WIDTH: f64 = 100.0;
/// Floor for item height.
pub const MIN_HEIGHT: f64 = 60.0;

/// Geometry captured when a resize handle goes down.
#[derive(Debug, Clone, Copy)]
pub struct ResizeStart {
    pub item: ItemId,
    pub handle: HandleKind,
    /// Item rectangle at pointer-down.
    pub rect: Rect,
    /// `w / h` locked at pointer-down; images only.
    pub aspect: Option<f64>,
}

/// Compute the rectangle after dragging the handle by `delta` world units.
///
/// `content_floor`, when present (notes), maps a candidate width to the
/// minimum height the content requires at that width.
pub fn perform_resize(
    start: &ResizeStart,
    delta: Vec2,
    content_floor: Option<&dyn Fn(f64) -> f64>,
) -> Rect {
    let handle = start.handle;
    let mut x0 = start.rect.x0;
    let mut y0 = start.rect.y0;
    let mut x1 = start.rect.x1;
    let mut y1 = start.rect.y1;

    if handle.moves_left() {
        x0 = (x0 + delta.x).min(x1 - MIN_WIDTH);
    }
    if handle.moves_right() {
        x1 = (x1 + delta.x).max(x0 + MIN_WIDTH);
    }
    if handle.moves_top() {
        y0 = (y0 + delta.y).min(y1 - MIN_HEIGHT);
    }
    if handle.moves_bottom() {
        y1 = (y1 + delta.y).max(y0 + MIN_HEIGHT);
    }

    // Image corners: width drives, height follows the locked ratio.
    if let (Some(aspect), true) = (start.aspect, handle.is_corner()) {
        let h = (x1 - x0) / aspect;
        if handle.moves_top() {
            y0 = y1 - h;
        } else {
            y1 = y0 + h;
        }
    }

    // Notes: never shrink below what the content needs at this width.
    if let Some(measure) = content_floor {
        let floor = measure(x1 - x0).max(MIN_HEIGHT);
        if y1 - y0 < floor {
            if handle.moves_top() {
                y0 = y1 - floor;
            } else {
                y1 = y0 + floor;
            }
        }
    }

    Rect::new(x0, y0, x1, y1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn start(handle: HandleKind, rect: Rect, aspect: Option<f64>) -> ResizeStart {
        ResizeStart {
            item: Uuid::new_v4(),
            handle,
            rect,
            aspect,
        }
    }

    #[test]
    fn test_south_east_grows_freely() {
        let s = start(HandleKind::SouthEast, Rect::new(0.0, 0.0, 200.0, 100.0), None);
        let r = perform_resize(&s, Vec2::new(50.0, 30.0), None);
        assert_eq!(r, Rect::new(0.0, 0.0, 250.0, 130.0));
    }

    #[test]
    fn test_north_west_anchors_opposite_edge() {
        let s = start(HandleKind::NorthWest, Rect::new(10.0, 10.0, 210.0, 110.0), None);
        let r = perform_resize(&s, Vec2::new(-20.0, -5.0), None);
        assert_eq!((r.x1, r.y1), (210.0, 110.0));
        assert_eq!((r.x0, r.y0), (-10.0, 5.0));
    }

    #[test]
    fn test_min_floor_clamps_moving_edge() {
        let s = start(HandleKind::East, Rect::new(0.0, 0.0, 200.0, 100.0), None);
        let r = perform_resize(&s, Vec2::new(-500.0, 0.0), None);
        assert_eq!(r.width(), MIN_WIDTH);
        assert_eq!(r.x0, 0.0);
    }

    #[test]
    fn test_image_corner_preserves_aspect() {
        let rect = Rect::new(0.0, 0.0, 400.0, 200.0);
        let s = start(HandleKind::SouthEast, rect, Some(2.0));
        let r = perform_resize(&s, Vec2::new(100.0, 3.0), None);
        assert!((r.width() / r.height() - 2.0).abs() < 1e-9);
        assert_eq!(r.width(), 500.0);
    }

    #[test]
    fn test_image_north_corner_keeps_bottom_anchored() {
        let rect = Rect::new(0.0, 0.0, 400.0, 200.0);
        let s = start(HandleKind::NorthEast, rect, Some(2.0));
        let r = perform_resize(&s, Vec2::new(-100.0, 0.0), None);
        assert_eq!(r.y1, 200.0);
        assert!((r.width() / r.height() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_edge_handle_resizes_freely() {
        let rect = Rect::new(0.0, 0.0, 400.0, 200.0);
        let s = start(HandleKind::South, rect, Some(2.0));
        let r = perform_resize(&s, Vec2::new(0.0, 40.0), None);
        assert_eq!(r.height(), 240.0);
        assert_eq!(r.width(), 400.0);
    }

    #[test]
    fn test_note_height_clamped_to_content() {
        let rect = Rect::new(0.0, 0.0, 300.0, 200.0);
        let s = start(HandleKind::South, rect, None);
        // Content needs 150 world units regardless of width.
        let floor = |_w: f64| 150.0;
        let r = perform_resize(&s, Vec2::new(0.0, -180.0), Some(&floor));
        assert_eq!(r.height(), 150.0);
        assert_eq!(r.y0, 0.0);
    }

    #[test]
    fn test_note_narrowing_raises_floor() {
        let rect = Rect::new(0.0, 0.0, 300.0, 100.0);
        let s = start(HandleKind::West, rect, None);
        // Narrower notes need more height.
        let floor = |w: f64| 30_000.0 / w;
        let r = perform_resize(&s, Vec2::new(150.0, 0.0), Some(&floor));
        assert_eq!(r.width(), 150.0);
        assert_eq!(r.height(), 200.0);
    }
}
