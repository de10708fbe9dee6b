//! Per-feature draw dispatch.
//!
//! | geometry | layer    | action                                          |
//! |----------|----------|-------------------------------------------------|
//! | polygon  | fill     | fill, then outline if `fill-outline-color`      |
//! | polygon  | line     | stroke if both color and width resolve          |
//! | line     | line     | stroke (width defaults to 1px), dashes applied  |
//! | any      | symbol   | icon + label at the anchor point(s)             |
//! | other    |          | nothing                                         |

use tracing::trace;

use super::surface::{with_opacity, PixelPath, StrokeStyle, Surface, TextStyle};
use crate::config::RenderConfig;
use crate::sprite::SpriteAtlas;
use crate::style::{LayerType, LineCap, LineJoin, ResolvedLayout, ResolvedPaint, StyleLayer};
use crate::tile::{GeomType, Point, Properties, Ring};

/// Stroke width used for line features without `line-width`.
const DEFAULT_LINE_WIDTH: f32 = 1.0;

/// Stroke width of polygon outlines.
const OUTLINE_WIDTH: f32 = 1.0;

/// What a geometry type drawn by a layer type turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawAction {
    FillPolygon,
    StrokePolygon,
    StrokeLine,
    Symbol,
    Nothing,
}

/// Look up the draw action for a geometry/layer combination.
pub fn dispatch(geom_type: GeomType, layer_type: LayerType) -> DrawAction {
    match (geom_type, layer_type) {
        (GeomType::Polygon, LayerType::Fill) => DrawAction::FillPolygon,
        (GeomType::Polygon, LayerType::Line) => DrawAction::StrokePolygon,
        (GeomType::LineString, LayerType::Line) => DrawAction::StrokeLine,
        (GeomType::Polygon | GeomType::LineString | GeomType::Point, LayerType::Symbol) => {
            DrawAction::Symbol
        }
        _ => DrawAction::Nothing,
    }
}

/// Label for a feature: `text-field` with one leading `{` and one trailing
/// `}` removed, looked up in the feature properties.
pub fn label_text(text_field: &str, properties: &Properties) -> Option<String> {
    let key = text_field.strip_prefix('{').unwrap_or(text_field);
    let key = key.strip_suffix('}').unwrap_or(key);
    properties.get(key).map(ToString::to_string)
}

/// A style layer with its paint and layout resolved at one zoom.
#[derive(Debug, Clone)]
pub struct LayerStyle<'a> {
    pub layer: &'a StyleLayer,
    pub paint: ResolvedPaint,
    pub layout: ResolvedLayout,
}

impl<'a> LayerStyle<'a> {
    pub fn resolve(layer: &'a StyleLayer, zoom: f64) -> Self {
        Self {
            layer,
            paint: layer.resolve_paint(zoom),
            layout: layer.resolve_layout(zoom),
        }
    }
}

/// Draws single features onto a [`Surface`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureRenderer<'a> {
    sprites: &'a SpriteAtlas,
    config: &'a RenderConfig,
}

impl<'a> FeatureRenderer<'a> {
    pub fn new(sprites: &'a SpriteAtlas, config: &'a RenderConfig) -> Self {
        Self { sprites, config }
    }

    /// Draw one feature. `rings` are in tile-extent units and are scaled by
    /// `extent_factor` into surface pixels.
    ///
    /// Returns `true` if anything was drawn.
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        style: &LayerStyle<'_>,
        geom_type: GeomType,
        properties: &Properties,
        rings: &[Ring],
        extent_factor: f32,
    ) -> bool {
        let action = dispatch(geom_type, style.layer.layer_type);
        match action {
            DrawAction::FillPolygon => self.fill_polygon(surface, style, rings, extent_factor),
            DrawAction::StrokePolygon | DrawAction::StrokeLine => {
                self.stroke(surface, style, rings, extent_factor, action)
            }
            DrawAction::Symbol => {
                self.symbol(surface, style, geom_type, properties, rings, extent_factor)
            }
            DrawAction::Nothing => {
                trace!(
                    layer = %style.layer.id,
                    geom_type = %geom_type,
                    layer_type = ?style.layer.layer_type,
                    "No drawing rule for combination"
                );
                false
            }
        }
    }

    fn fill_polygon<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        style: &LayerStyle<'_>,
        rings: &[Ring],
        factor: f32,
    ) -> bool {
        let paint = &style.paint;
        let Some(color) = paint.fill_color else {
            return false;
        };
        let path = PixelPath::from_rings(rings, factor, true);
        surface.fill_path(&path, with_opacity(color, paint.fill_opacity));

        if let Some(outline) = paint.fill_outline_color {
            let stroke = StrokeStyle::solid(with_opacity(outline, paint.fill_opacity), OUTLINE_WIDTH)
                .with_offset(self.config.stroke_offset);
            surface.stroke_path(&path, &stroke);
        }
        true
    }

    fn stroke<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        style: &LayerStyle<'_>,
        rings: &[Ring],
        factor: f32,
        action: DrawAction,
    ) -> bool {
        let paint = &style.paint;
        let Some(color) = paint.line_color else {
            return false;
        };
        let width = match (paint.line_width, action) {
            (Some(width), _) => width * self.config.line_width_scale,
            (None, DrawAction::StrokeLine) => DEFAULT_LINE_WIDTH,
            (None, _) => return false,
        };

        let mut stroke = StrokeStyle::solid(with_opacity(color, paint.line_opacity), width)
            .with_cap(style.layout.line_cap.unwrap_or(LineCap::Butt))
            .with_join(style.layout.line_join.unwrap_or(LineJoin::Miter))
            .with_offset(self.config.stroke_offset);
        if action == DrawAction::StrokeLine {
            if let Some(dash) = &paint.line_dasharray {
                stroke = stroke.with_dash(dash.iter().map(|d| d * width).collect());
            }
        }

        let path = PixelPath::from_rings(rings, factor, action == DrawAction::StrokePolygon);
        surface.stroke_path(&path, &stroke);
        true
    }

    fn symbol<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        style: &LayerStyle<'_>,
        geom_type: GeomType,
        properties: &Properties,
        rings: &[Ring],
        factor: f32,
    ) -> bool {
        let Some(text) = style
            .layout
            .text_field
            .as_deref()
            .and_then(|field| label_text(field, properties))
        else {
            return false;
        };

        // Multi-point features carry one point per ring.
        let anchors: Vec<Point> = match geom_type {
            GeomType::Point => rings.iter().filter_map(|r| r.first().copied()).collect(),
            _ => rings.first().and_then(|r| r.first()).copied().into_iter().collect(),
        };

        let icon = style
            .layout
            .icon_image
            .as_deref()
            .and_then(|name| self.sprites.get(name));
        let text_style = style.paint.text_color.map(|color| TextStyle {
            color: with_opacity(color, style.paint.text_opacity),
            size: style.layout.text_size.unwrap_or(self.config.default_text_size),
        });

        for anchor in &anchors {
            let center = (anchor.x as f32 * factor, anchor.y as f32 * factor);
            if let Some(icon) = icon {
                surface.draw_image(icon, center, style.paint.icon_opacity.unwrap_or(1.0));
            }
            if let Some(text_style) = &text_style {
                surface.fill_text(&text, center, text_style);
            }
        }
        !anchors.is_empty()
    }
}
