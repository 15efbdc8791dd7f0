//! Per-layer raster compositing.
//!
//! The draw pass clears the main surface to an opaque background, then walks
//! layers bottom-to-top. Each visible layer with at least one stroke
//! (including the live stroke) is rendered into a reusable offscreen buffer
//! under the current view transform and composited source-over onto the
//! surface. Eraser strokes subtract coverage from their own layer's buffer
//! with destination-out blending, so they never punch through layers below.

use crate::RenderError;
use crate::live::LiveStroke;
use kurbo::Point;
use log::{debug, warn};
use quillboard_core::color::Rgba;
use quillboard_core::scene::{LayerId, Whiteboard};
use quillboard_core::view::ViewTransform;
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke as StrokeStyle, Transform,
};

/// Brush geometry of one stroke, borrowed from either a committed stroke or
/// the live stroke.
struct BrushPass<'a> {
    points: &'a [Point],
    color: Rgba,
    size: f64,
    opacity: f64,
    is_eraser: bool,
}

/// Raster surface plus the reusable per-layer offscreen buffer.
pub struct LayerCompositor {
    surface: Option<Pixmap>,
    layer_buffer: Option<Pixmap>,
    device_pixel_ratio: f64,
    background: Rgba,
}

impl Default for LayerCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerCompositor {
    pub fn new() -> Self {
        Self {
            surface: None,
            layer_buffer: None,
            device_pixel_ratio: 1.0,
            background: Rgba::white(),
        }
    }

    pub fn set_background(&mut self, background: Rgba) {
        self.background = background;
    }

    /// Reallocate backing buffers for a new logical size and device pixel
    /// ratio. Non-positive dimensions are a no-op.
    pub fn resize(&mut self, width: f64, height: f64, dpr: f64) -> Result<(), RenderError> {
        if width <= 0.0 || height <= 0.0 || dpr <= 0.0 {
            debug!("ignoring resize to {width}x{height} @ {dpr}");
            return Ok(());
        }
        let pw = (width * dpr).round().max(1.0) as u32;
        let ph = (height * dpr).round().max(1.0) as u32;
        let alloc = || {
            Pixmap::new(pw, ph).ok_or(RenderError::Allocation {
                width: pw,
                height: ph,
            })
        };
        self.surface = Some(alloc()?);
        self.layer_buffer = Some(alloc()?);
        self.device_pixel_ratio = dpr;
        Ok(())
    }

    /// Whether buffers have been allocated.
    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    /// Physical pixel dimensions of the surface.
    pub fn physical_size(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| (s.width(), s.height()))
    }

    /// RGBA pixel of the composited surface, for hosts and tests.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let surface = self.surface.as_ref()?;
        let p = surface.pixel(x, y)?.demultiply();
        Some([p.red(), p.green(), p.blue(), p.alpha()])
    }

    /// Premultiplied RGBA bytes of the whole surface.
    pub fn data(&self) -> Option<&[u8]> {
        self.surface.as_ref().map(|s| s.data())
    }

    /// Full draw pass over the scene.
    pub fn render(
        &mut self,
        wb: &Whiteboard,
        live: Option<&LiveStroke>,
    ) -> Result<(), RenderError> {
        let surface = self.surface.as_mut().ok_or(RenderError::NotInitialized)?;
        let buffer = self
            .layer_buffer
            .as_mut()
            .ok_or(RenderError::NotInitialized)?;

        let bg = self.background;
        surface.fill(to_color(bg, 1.0));

        // Device-pixel-ratio scale is applied once, folded into the
        // world-to-device transform.
        let transform = view_to_device(wb.view, self.device_pixel_ratio);

        for layer in &wb.layers {
            if !layer.visible {
                continue;
            }
            let live_here = live.filter(|l| l.layer_id == layer.id);
            if !has_strokes(wb, layer.id, live_here) {
                // Nothing on this layer: skip the buffer round-trip.
                continue;
            }

            buffer.fill(Color::TRANSPARENT);
            for stroke in wb.layer_strokes(layer.id) {
                draw_brush(
                    buffer,
                    &BrushPass {
                        points: &stroke.points,
                        color: stroke.color,
                        size: stroke.size,
                        opacity: stroke.opacity,
                        is_eraser: stroke.is_eraser,
                    },
                    transform,
                );
            }
            if let Some(l) = live_here {
                draw_brush(
                    buffer,
                    &BrushPass {
                        points: &l.points,
                        color: l.color,
                        size: l.size,
                        opacity: l.opacity,
                        is_eraser: l.is_eraser,
                    },
                    transform,
                );
            }

            surface.draw_pixmap(
                0,
                0,
                buffer.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Ok(())
    }

    /// Drop the backing buffers (teardown).
    pub fn release(&mut self) {
        self.surface = None;
        self.layer_buffer = None;
    }
}

fn has_strokes(wb: &Whiteboard, layer: LayerId, live: Option<&LiveStroke>) -> bool {
    live.is_some() || wb.layer_strokes(layer).next().is_some()
}

fn view_to_device(view: ViewTransform, dpr: f64) -> Transform {
    Transform::from_scale(view.scale as f32, view.scale as f32)
        .post_translate(view.x as f32, view.y as f32)
        .post_scale(dpr as f32, dpr as f32)
}

fn to_color(color: Rgba, opacity: f64) -> Color {
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

/// Render one polyline as a smoothed brush pass into `target`.
fn draw_brush(target: &mut Pixmap, pass: &BrushPass, transform: Transform) {
    if pass.points.is_empty() {
        return;
    }

    let mut paint = Paint::default();
    paint.set_color(to_color(pass.color, pass.opacity));
    paint.anti_alias = true;
    if pass.is_eraser {
        paint.blend_mode = BlendMode::DestinationOut;
    }

    if pass.points.len() == 1 {
        // A tap leaves a dot.
        let p = pass.points[0];
        let Some(circle) =
            PathBuilder::from_circle(p.x as f32, p.y as f32, (pass.size / 2.0) as f32)
        else {
            return;
        };
        target.fill_path(&circle, &paint, FillRule::Winding, transform, None);
        return;
    }

    let Some(path) = smoothed_path(pass.points) else {
        warn!("degenerate stroke path skipped");
        return;
    };
    let style = StrokeStyle {
        width: pass.size as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..StrokeStyle::default()
    };
    target.stroke_path(&path, &paint, &style, transform, None);
}

/// Quadratic interpolation through consecutive point midpoints.
///
/// Each interior vertex becomes a control point curving toward the midpoint
/// of the following segment, which removes the faceting a raw polyline
/// shows at typical pointer sampling rates.
fn smoothed_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x as f32, points[0].y as f32);
    if points.len() == 2 {
        pb.line_to(points[1].x as f32, points[1].y as f32);
        return pb.finish();
    }
    for i in 1..points.len() - 1 {
        let control = points[i];
        let next = points[i + 1];
        let mid = Point::new((control.x + next.x) / 2.0, (control.y + next.y) / 2.0);
        pb.quad_to(
            control.x as f32,
            control.y as f32,
            mid.x as f32,
            mid.y as f32,
        );
    }
    let last = points[points.len() - 1];
    pb.line_to(last.x as f32, last.y as f32);
    pb.finish()
}
