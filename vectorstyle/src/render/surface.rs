//! The drawing target seam.
//!
//! [`Surface`] is the small set of 2D operations the feature renderer needs.
//! [`PixmapSurface`](super::PixmapSurface) implements it over tiny-skia;
//! [`RecordingSurface`] records calls instead of drawing, for inspecting
//! what a style would draw.

use tiny_skia::Color;

use crate::sprite::SpriteImage;
use crate::style::{LineCap, LineJoin};
use crate::tile::Ring;

/// Feature geometry scaled into surface pixel space.
///
/// All rings belong to one path; closed paths are filled even-odd, so inner
/// rings cut holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPath {
    rings: Vec<Vec<(f32, f32)>>,
    closed: bool,
}

impl PixelPath {
    /// Scale tile-extent `rings` by `factor`.
    pub fn from_rings(rings: &[Ring], factor: f32, closed: bool) -> Self {
        let rings = rings
            .iter()
            .filter(|ring| !ring.is_empty())
            .map(|ring| {
                ring.iter()
                    .map(|p| (p.x as f32 * factor, p.y as f32 * factor))
                    .collect()
            })
            .collect();
        Self { rings, closed }
    }

    pub fn rings(&self) -> &[Vec<(f32, f32)>] {
        &self.rings
    }

    /// Whether every ring is closed back to its first point.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// How to stroke a path.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Color with opacity already applied.
    pub color: Color,
    /// Width in pixels.
    pub width: f32,
    /// Dash lengths in pixels.
    pub dash: Option<Vec<f32>>,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Translation applied to the stroke in both axes.
    pub offset: f32,
}

impl StrokeStyle {
    /// A solid butt-capped, miter-joined stroke.
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: None,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            offset: 0.0,
        }
    }

    pub fn with_dash(mut self, dash: Vec<f32>) -> Self {
        self.dash = Some(dash);
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }
}

/// How to draw a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Color with opacity already applied.
    pub color: Color,
    /// Font size in pixels.
    pub size: f32,
}

/// A 2D drawing target.
///
/// All coordinates are surface pixels with the origin at the top-left.
/// Every operation composites source-over.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Paint `color` over the whole surface.
    fn fill_all(&mut self, color: Color);

    /// Fill a closed path using the even-odd rule.
    fn fill_path(&mut self, path: &PixelPath, color: Color);

    /// Stroke a path.
    fn stroke_path(&mut self, path: &PixelPath, style: &StrokeStyle);

    /// Draw an icon centered on `center`.
    fn draw_image(&mut self, image: &SpriteImage, center: (f32, f32), opacity: f32);

    /// Draw a label centered horizontally and vertically on `center`.
    fn fill_text(&mut self, text: &str, center: (f32, f32), style: &TextStyle);
}

/// Apply an optional opacity to a color.
pub(crate) fn with_opacity(color: Color, opacity: Option<f32>) -> Color {
    let mut color = color;
    if let Some(opacity) = opacity {
        color.apply_opacity(opacity);
    }
    color
}

/// One recorded [`Surface`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillAll(Color),
    FillPath {
        path: PixelPath,
        color: Color,
    },
    StrokePath {
        path: PixelPath,
        style: StrokeStyle,
    },
    Image {
        width: u32,
        height: u32,
        center: (f32, f32),
        opacity: f32,
    },
    Text {
        text: String,
        center: (f32, f32),
        style: TextStyle,
    },
}

/// A surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Recorded calls in order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_all(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillAll(color));
    }

    fn fill_path(&mut self, path: &PixelPath, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &PixelPath, style: &StrokeStyle) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            style: style.clone(),
        });
    }

    fn draw_image(&mut self, image: &SpriteImage, center: (f32, f32), opacity: f32) {
        self.commands.push(DrawCommand::Image {
            width: image.width(),
            height: image.height(),
            center,
            opacity,
        });
    }

    fn fill_text(&mut self, text: &str, center: (f32, f32), style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            center,
            style: *style,
        });
    }
}
