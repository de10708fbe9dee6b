//! tiny-skia backed surface.

use std::path::Path;
use std::sync::Arc;

use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash, Transform,
};
use tracing::warn;

use super::error::RenderError;
use super::surface::{PixelPath, StrokeStyle, Surface, TextStyle};
use super::text::LabelFont;
use crate::sprite::SpriteImage;
use crate::style::{LineCap, LineJoin};

/// A raster surface over a [`tiny_skia::Pixmap`].
///
/// Starts fully transparent. Labels are drawn only when a [`LabelFont`] is
/// attached.
///
/// # Example
///
/// ```
/// use tiny_skia::Color;
/// use vectorstyle::render::{PixmapSurface, Surface};
///
/// let mut surface = PixmapSurface::new(4, 4).unwrap();
/// surface.fill_all(Color::from_rgba8(255, 0, 0, 255));
/// assert_eq!(surface.pixel(2, 2), Some([255, 0, 0, 255]));
/// ```
#[derive(Debug)]
pub struct PixmapSurface {
    pixmap: Pixmap,
    font: Option<Arc<LabelFont>>,
    missing_font_warned: bool,
}

impl PixmapSurface {
    /// Allocate a transparent `width`×`height` surface.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            font: None,
            missing_font_warned: false,
        })
    }

    /// Attach the label font.
    pub fn with_font(mut self, font: Option<Arc<LabelFont>>) -> Self {
        self.font = font;
        self
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Straight (demultiplied) RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Encode the surface as PNG and write it to `path`.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)
            .map_err(|e| RenderError::Encode(format!("{}: {}", path.display(), e)))
    }
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn build_path(path: &PixelPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for ring in path.rings() {
        let mut points = ring.iter();
        let Some(&(x, y)) = points.next() else {
            continue;
        };
        pb.move_to(x, y);
        for &(x, y) in points {
            pb.line_to(x, y);
        }
        if path.is_closed() {
            pb.close();
        }
    }
    pb.finish()
}

/// Dash lengths usable by tiny-skia: an odd list is repeated to make it
/// even, and lists with no positive length are dropped.
fn dash_pattern(dash: &[f32]) -> Option<StrokeDash> {
    if dash.iter().any(|d| !d.is_finite() || *d < 0.0) {
        return None;
    }
    let mut intervals = dash.to_vec();
    if intervals.len() % 2 == 1 {
        intervals.extend_from_slice(dash);
    }
    StrokeDash::new(intervals, 0.0)
}

fn to_skia_cap(cap: LineCap) -> tiny_skia::LineCap {
    match cap {
        LineCap::Butt => tiny_skia::LineCap::Butt,
        LineCap::Round => tiny_skia::LineCap::Round,
        LineCap::Square => tiny_skia::LineCap::Square,
    }
}

fn to_skia_join(join: LineJoin) -> tiny_skia::LineJoin {
    match join {
        LineJoin::Miter => tiny_skia::LineJoin::Miter,
        LineJoin::Round => tiny_skia::LineJoin::Round,
        LineJoin::Bevel => tiny_skia::LineJoin::Bevel,
    }
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn fill_all(&mut self, color: Color) {
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
        else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &solid_paint(color), Transform::identity(), None);
    }

    fn fill_path(&mut self, path: &PixelPath, color: Color) {
        let Some(skia_path) = build_path(path) else {
            return;
        };
        self.pixmap.fill_path(
            &skia_path,
            &solid_paint(color),
            FillRule::EvenOdd,
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &PixelPath, style: &StrokeStyle) {
        if style.width <= 0.0 || !style.width.is_finite() {
            return;
        }
        let Some(skia_path) = build_path(path) else {
            return;
        };
        let stroke = Stroke {
            width: style.width,
            line_cap: to_skia_cap(style.cap),
            line_join: to_skia_join(style.join),
            dash: style.dash.as_deref().and_then(dash_pattern),
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &skia_path,
            &solid_paint(style.color),
            &stroke,
            Transform::from_translate(style.offset, style.offset),
            None,
        );
    }

    fn draw_image(&mut self, image: &SpriteImage, center: (f32, f32), opacity: f32) {
        let Some(icon) = image.to_pixmap() else {
            return;
        };
        let x = (center.0 - image.width() as f32 / 2.0).round() as i32;
        let y = (center.1 - image.height() as f32 / 2.0).round() as i32;
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(x, y, icon.as_ref(), &paint, Transform::identity(), None);
    }

    fn fill_text(&mut self, text: &str, center: (f32, f32), style: &TextStyle) {
        let Some(font) = self.font.as_ref() else {
            if !self.missing_font_warned {
                warn!("No label font configured, skipping labels");
                self.missing_font_warned = true;
            }
            return;
        };
        let Some(label) = font.rasterize(text, style.size, style.color) else {
            return;
        };
        let x = (center.0 - label.width() as f32 / 2.0).round() as i32;
        let y = (center.1 - label.height() as f32 / 2.0).round() as i32;
        self.pixmap.draw_pixmap(
            x,
            y,
            label.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}
