//! Style layers and their paint/layout properties.
//!
//! Paint and layout properties are explicit optional fields rather than a
//! string-keyed map. Each render resolves them once per layer into
//! [`ResolvedPaint`] / [`ResolvedLayout`], where every attribute is an
//! `Option` and `None` means "do not apply".

use serde::{Deserialize, Deserializer, Serialize};
use tiny_skia::Color;
use tracing::warn;

use super::filter::LayerFilter;
use super::value::{resolve_opt, StyleValue, ValueExpr};

/// Rendering type of a style layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Background,
    Fill,
    Line,
    Symbol,
    /// Any type this renderer does not draw (`circle`, `raster`, ...).
    #[serde(other)]
    Unsupported,
}

/// Paint properties understood by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PaintProps {
    pub background_color: Option<ValueExpr>,
    pub fill_color: Option<ValueExpr>,
    pub fill_opacity: Option<ValueExpr>,
    pub fill_outline_color: Option<ValueExpr>,
    pub line_color: Option<ValueExpr>,
    pub line_width: Option<ValueExpr>,
    pub line_opacity: Option<ValueExpr>,
    pub line_dasharray: Option<ValueExpr>,
    pub text_color: Option<ValueExpr>,
    pub text_opacity: Option<ValueExpr>,
    pub icon_opacity: Option<ValueExpr>,
}

/// Layout properties understood by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutProps {
    pub visibility: Option<ValueExpr>,
    pub line_cap: Option<ValueExpr>,
    pub line_join: Option<ValueExpr>,
    pub text_field: Option<ValueExpr>,
    pub text_size: Option<ValueExpr>,
    pub text_font: Option<ValueExpr>,
    pub icon_image: Option<ValueExpr>,
}

/// One rule of a style document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,

    #[serde(rename = "type")]
    pub layer_type: LayerType,

    /// Source layer in the vector tile; empty for background layers.
    #[serde(rename = "source-layer", default)]
    pub source_layer: String,

    #[serde(default)]
    pub filter: Option<LayerFilter>,

    #[serde(default, deserialize_with = "deserialize_zoom")]
    pub minzoom: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_zoom")]
    pub maxzoom: Option<f64>,

    #[serde(default)]
    pub paint: PaintProps,

    #[serde(default)]
    pub layout: LayoutProps,
}

/// Zoom bounds are usually numbers but some styles write them as strings.
/// Fractional bounds are truncated toward zero.
fn deserialize_zoom<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StyleValue> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).map(f64::trunc))
}

impl StyleLayer {
    /// Create a layer with no properties.
    pub fn new(id: impl Into<String>, layer_type: LayerType, source_layer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer_type,
            source_layer: source_layer.into(),
            filter: None,
            minzoom: None,
            maxzoom: None,
            paint: PaintProps::default(),
            layout: LayoutProps::default(),
        }
    }

    pub fn with_filter(mut self, filter: LayerFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_zoom_range(mut self, minzoom: Option<f64>, maxzoom: Option<f64>) -> Self {
        self.minzoom = minzoom;
        self.maxzoom = maxzoom;
        self
    }

    pub fn with_paint(mut self, paint: PaintProps) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_layout(mut self, layout: LayoutProps) -> Self {
        self.layout = layout;
        self
    }

    /// Half-open zoom gate: `minzoom <= level < maxzoom`, either bound
    /// optional.
    pub fn in_zoom_range(&self, level: u8) -> bool {
        zoom_in_range(level, self.minzoom, self.maxzoom)
    }

    /// Resolve paint properties at `zoom`.
    pub fn resolve_paint(&self, zoom: f64) -> ResolvedPaint {
        let p = &self.paint;
        ResolvedPaint {
            background_color: self.color(p.background_color.as_ref(), zoom, "background-color"),
            fill_color: self.color(p.fill_color.as_ref(), zoom, "fill-color"),
            fill_opacity: number(p.fill_opacity.as_ref(), zoom),
            fill_outline_color: self.color(
                p.fill_outline_color.as_ref(),
                zoom,
                "fill-outline-color",
            ),
            line_color: self.color(p.line_color.as_ref(), zoom, "line-color"),
            line_width: number(p.line_width.as_ref(), zoom),
            line_opacity: number(p.line_opacity.as_ref(), zoom),
            line_dasharray: resolve_opt(p.line_dasharray.as_ref(), zoom)
                .and_then(StyleValue::as_f32_array),
            text_color: self.color(p.text_color.as_ref(), zoom, "text-color"),
            text_opacity: number(p.text_opacity.as_ref(), zoom),
            icon_opacity: number(p.icon_opacity.as_ref(), zoom),
        }
    }

    /// Resolve layout properties at `zoom`.
    pub fn resolve_layout(&self, zoom: f64) -> ResolvedLayout {
        let l = &self.layout;
        let string = |expr: Option<&ValueExpr>| {
            resolve_opt(expr, zoom)
                .and_then(StyleValue::as_str)
                .map(str::to_string)
        };

        let visibility = match string(l.visibility.as_ref()).as_deref() {
            Some("none") => Visibility::None,
            _ => Visibility::Visible,
        };

        ResolvedLayout {
            visibility,
            line_cap: string(l.line_cap.as_ref()).and_then(|s| LineCap::parse(&s)),
            line_join: string(l.line_join.as_ref()).and_then(|s| LineJoin::parse(&s)),
            text_field: string(l.text_field.as_ref()),
            text_size: number(l.text_size.as_ref(), zoom),
            text_font: resolve_opt(l.text_font.as_ref(), zoom).and_then(StyleValue::as_string_array),
            icon_image: string(l.icon_image.as_ref()),
        }
    }

    fn color(&self, expr: Option<&ValueExpr>, zoom: f64, name: &str) -> Option<Color> {
        let value = resolve_opt(expr, zoom)?;
        let color = value.as_color();
        if color.is_none() {
            warn!(layer = %self.id, property = name, value = ?value, "Unrecognized color value");
        }
        color
    }
}

fn number(expr: Option<&ValueExpr>, zoom: f64) -> Option<f32> {
    resolve_opt(expr, zoom).and_then(StyleValue::as_f32)
}

/// Shared half-open zoom check used by layers and by feature-level
/// `_minzoom`/`_maxzoom` properties.
pub fn zoom_in_range(level: u8, minzoom: Option<f64>, maxzoom: Option<f64>) -> bool {
    let level = level as f64;
    if minzoom.is_some_and(|min| level < min) {
        return false;
    }
    if maxzoom.is_some_and(|max| level >= max) {
        return false;
    }
    true
}

/// Layer visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    None,
}

/// Line end style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "butt" => Some(LineCap::Butt),
            "round" => Some(LineCap::Round),
            "square" => Some(LineCap::Square),
            _ => None,
        }
    }
}

/// Line corner style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "miter" => Some(LineJoin::Miter),
            "round" => Some(LineJoin::Round),
            "bevel" => Some(LineJoin::Bevel),
            _ => None,
        }
    }
}

/// Paint values for one layer at one zoom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPaint {
    pub background_color: Option<Color>,
    pub fill_color: Option<Color>,
    pub fill_opacity: Option<f32>,
    pub fill_outline_color: Option<Color>,
    pub line_color: Option<Color>,
    pub line_width: Option<f32>,
    pub line_opacity: Option<f32>,
    pub line_dasharray: Option<Vec<f32>>,
    pub text_color: Option<Color>,
    pub text_opacity: Option<f32>,
    pub icon_opacity: Option<f32>,
}

/// Layout values for one layer at one zoom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedLayout {
    pub visibility: Visibility,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub text_field: Option<String>,
    pub text_size: Option<f32>,
    pub text_font: Option<Vec<String>>,
    pub icon_image: Option<String>,
}
