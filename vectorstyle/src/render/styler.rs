//! Tile styling loop.
//!
//! One call to [`TileStyler::draw_tile`] walks the style layers in document
//! order and draws matching tile features, painter's-algorithm style:
//!
//! ```text
//! for each style layer:
//!     background?        → update background, draw nothing
//!     visibility: none   → paint current background over the tile, skip
//!     source missing     → skip
//!     source blank       → stop, tile is blank
//!     outside zoom range → skip
//!     for each feature:  filter → _minzoom/_maxzoom → project → draw
//! ```
//!
//! Every layer is planned before anything is drawn, so an overzoom error
//! leaves the surface untouched.

use tiny_skia::Color;
use tracing::{debug, trace};

use super::error::RenderError;
use super::feature::{FeatureRenderer, LayerStyle};
use super::surface::Surface;
use crate::config::RenderConfig;
use crate::coord::TileId;
use crate::overzoom::OverzoomProjector;
use crate::sprite::SpriteAtlas;
use crate::style::{zoom_in_range, LayerType, StyleDocument, StyleLayer, Visibility};
use crate::tile::{GeomType, LayerLookup, TileFeature, TileLayer, VectorTile};

/// Feature properties that gate a single feature by zoom.
const FEATURE_MINZOOM: &str = "_minzoom";
const FEATURE_MAXZOOM: &str = "_maxzoom";

/// How a render call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// All style layers were processed.
    Complete {
        layers_drawn: usize,
        features_drawn: usize,
    },
    /// A style layer's source layer is declared blank in the tile; drawing
    /// stopped at that layer.
    Blank { source_layer: String },
}

enum Step<'s, 't, L> {
    /// `visibility: none` paints the background as it stood at this layer.
    Cover(Color),
    Draw {
        style: LayerStyle<'s>,
        layer: &'t L,
        projector: OverzoomProjector,
    },
}

/// Draws vector tiles with one style.
#[derive(Debug, Clone, Copy)]
pub struct TileStyler<'a> {
    document: &'a StyleDocument,
    sprites: &'a SpriteAtlas,
    config: &'a RenderConfig,
}

impl<'a> TileStyler<'a> {
    pub fn new(document: &'a StyleDocument, sprites: &'a SpriteAtlas, config: &'a RenderConfig) -> Self {
        Self {
            document,
            sprites,
            config,
        }
    }

    /// The background after every background layer: the last resolved
    /// `background-color` wins, falling back to the configured default.
    pub fn background_color(&self, zoom: f64) -> Color {
        self.document
            .layers()
            .iter()
            .fold(self.config.default_background, |current, layer| {
                background_of(layer, zoom).unwrap_or(current)
            })
    }

    /// Draw `tile` (fetched as `native`) into `surface` as tile `requested`.
    ///
    /// Style values and zoom gates use the native level. When overzoom is
    /// enabled and `requested` is deeper than `native`, geometry is shifted
    /// into the requested tile.
    ///
    /// # Errors
    ///
    /// [`RenderError::Projection`] when `requested` is not inside `native`
    /// or the native data is too coarse. Nothing is drawn in that case.
    pub fn draw_tile<S, T>(
        &self,
        surface: &mut S,
        tile: &T,
        native: TileId,
        requested: TileId,
    ) -> Result<RenderOutcome, RenderError>
    where
        S: Surface + ?Sized,
        T: VectorTile,
    {
        let zoom = native.level as f64;
        let mut background = self.config.default_background;
        let mut steps = Vec::new();
        let mut blank = None;

        for layer in self.document.layers() {
            let style = LayerStyle::resolve(layer, zoom);
            if layer.layer_type == LayerType::Background {
                if let Some(color) = style.paint.background_color {
                    background = color;
                }
            }
            if style.layout.visibility == Visibility::None {
                steps.push(Step::Cover(background));
                continue;
            }
            if layer.layer_type == LayerType::Background {
                continue;
            }

            let source = match tile.layer(&layer.source_layer) {
                LayerLookup::Missing => {
                    debug!(layer = %layer.id, source_layer = %layer.source_layer, "Source layer not in tile");
                    continue;
                }
                LayerLookup::Blank => {
                    debug!(layer = %layer.id, source_layer = %layer.source_layer, tile = %native, "Blank source layer");
                    blank = Some(layer.source_layer.clone());
                    break;
                }
                LayerLookup::Present(source) => source,
            };

            if !layer.in_zoom_range(native.level) {
                trace!(layer = %layer.id, level = native.level, "Layer outside zoom range");
                continue;
            }
            if layer.layer_type == LayerType::Unsupported {
                debug!(layer = %layer.id, "Unsupported layer type, skipping");
                continue;
            }
            if source.extent() == 0 {
                debug!(layer = %layer.id, "Source layer has zero extent, skipping");
                continue;
            }

            let projector = if self.config.overzoom {
                OverzoomProjector::new(native, requested, source.extent(), self.config.min_footprint)?
            } else {
                OverzoomProjector::new(native, native, source.extent(), self.config.min_footprint)?
            };
            steps.push(Step::Draw {
                style,
                layer: source,
                projector,
            });
        }

        surface.fill_all(background);

        let renderer = FeatureRenderer::new(self.sprites, self.config);
        let mut layers_drawn = 0;
        let mut features_drawn = 0;
        for step in &steps {
            match step {
                Step::Cover(color) => surface.fill_all(*color),
                Step::Draw {
                    style,
                    layer,
                    projector,
                } => {
                    features_drawn += draw_layer(
                        surface, &renderer, style, *layer, projector, native, requested,
                    );
                    layers_drawn += 1;
                }
            }
        }

        match blank {
            Some(source_layer) => Ok(RenderOutcome::Blank { source_layer }),
            None => Ok(RenderOutcome::Complete {
                layers_drawn,
                features_drawn,
            }),
        }
    }
}

fn draw_layer<S, L>(
    surface: &mut S,
    renderer: &FeatureRenderer<'_>,
    style: &LayerStyle<'_>,
    layer: &L,
    projector: &OverzoomProjector,
    native: TileId,
    requested: TileId,
) -> usize
where
    S: Surface + ?Sized,
    L: TileLayer,
{
    let extent_factor = surface.width() as f32 / layer.extent() as f32;
    let mut drawn = 0;

    for index in 0..layer.len() {
        let Some(feature) = layer.feature(index) else {
            break;
        };
        let properties = feature.properties();

        if let Some(filter) = &style.layer.filter {
            if !filter.accepts(properties) {
                continue;
            }
        }

        let min = properties.get(FEATURE_MINZOOM).and_then(|v| v.as_f64()).map(f64::trunc);
        let max = properties.get(FEATURE_MAXZOOM).and_then(|v| v.as_f64()).map(f64::trunc);
        if !zoom_in_range(native.level, min, max) {
            continue;
        }

        let geom_type = feature.geom_type();
        if geom_type == GeomType::Unknown {
            debug!(layer = %style.layer.id, tile = %requested, "Feature with unknown geometry type");
            continue;
        }

        let Some(rings) = projector.project_feature(feature.load_geometry()) else {
            continue;
        };
        if renderer.render(surface, style, geom_type, properties, &rings, extent_factor) {
            drawn += 1;
        }
    }
    drawn
}

fn background_of(layer: &StyleLayer, zoom: f64) -> Option<Color> {
    if layer.layer_type != LayerType::Background {
        return None;
    }
    layer.resolve_paint(zoom).background_color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawCommand, RecordingSurface};
    use crate::style::{FilterLiteral, LayerFilter, LayoutProps, PaintProps, ValueExpr};
    use crate::tile::{MemoryFeature, MemoryLayer, MemoryTile};

    const FULL: &[(i32, i32)] = &[(0, 0), (4096, 0), (4096, 4096), (0, 4096)];

    fn background(id: &str, color: &str) -> StyleLayer {
        StyleLayer::new(id, LayerType::Background, "").with_paint(PaintProps {
            background_color: Some(ValueExpr::constant(color)),
            ..Default::default()
        })
    }

    fn water_fill() -> StyleLayer {
        StyleLayer::new("water", LayerType::Fill, "water").with_paint(PaintProps {
            fill_color: Some(ValueExpr::constant("#0000ff")),
            ..Default::default()
        })
    }

    fn water_tile() -> MemoryTile {
        MemoryTile::new().with_layer(
            "water",
            MemoryLayer::new(4096).with_feature(MemoryFeature::polygon(FULL)),
        )
    }

    fn draw(
        layers: Vec<StyleLayer>,
        tile: &MemoryTile,
        native: TileId,
        requested: TileId,
        config: &RenderConfig,
    ) -> (RecordingSurface, Result<RenderOutcome, RenderError>) {
        let document = StyleDocument::new(layers, None);
        let sprites = SpriteAtlas::empty();
        let mut surface = RecordingSurface::new(256, 256);
        let result =
            TileStyler::new(&document, &sprites, config).draw_tile(&mut surface, tile, native, requested);
        (surface, result)
    }

    fn draw_at(layers: Vec<StyleLayer>, tile: &MemoryTile, native: TileId) -> (RecordingSurface, RenderOutcome) {
        let (surface, result) = draw(layers, tile, native, native, &RenderConfig::default());
        (surface, result.unwrap())
    }

    fn fills(surface: &RecordingSurface) -> usize {
        surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillPath { .. }))
            .count()
    }

    #[test]
    fn test_empty_document_paints_default_background() {
        let (surface, outcome) = draw_at(vec![], &MemoryTile::new(), TileId::new(0, 0, 0));
        assert_eq!(surface.commands(), &[DrawCommand::FillAll(Color::BLACK)]);
        assert_eq!(
            outcome,
            RenderOutcome::Complete {
                layers_drawn: 0,
                features_drawn: 0
            }
        );
    }

    #[test]
    fn test_last_background_wins() {
        let layers = vec![background("a", "blue"), background("b", "red")];
        let document = StyleDocument::new(layers.clone(), None);
        let config = RenderConfig::default();
        let sprites = SpriteAtlas::empty();
        assert_eq!(
            TileStyler::new(&document, &sprites, &config).background_color(0.0),
            Color::from_rgba8(255, 0, 0, 255)
        );

        let (surface, _) = draw_at(layers, &MemoryTile::new(), TileId::new(0, 0, 0));
        assert_eq!(
            surface.commands(),
            &[DrawCommand::FillAll(Color::from_rgba8(255, 0, 0, 255))]
        );
    }

    #[test]
    fn test_fill_layer_draws_feature() {
        let (surface, outcome) = draw_at(vec![water_fill()], &water_tile(), TileId::new(3, 1, 1));
        assert_eq!(fills(&surface), 1);
        assert_eq!(
            outcome,
            RenderOutcome::Complete {
                layers_drawn: 1,
                features_drawn: 1
            }
        );
    }

    #[test]
    fn test_layer_zoom_gate() {
        let gated = || water_fill().with_zoom_range(Some(5.0), Some(10.0));
        for (level, expected) in [(4u8, 0usize), (5, 1), (9, 1), (10, 0)] {
            let (surface, _) = draw_at(vec![gated()], &water_tile(), TileId::new(level, 0, 0));
            assert_eq!(fills(&surface), expected, "level {}", level);
        }
    }

    #[test]
    fn test_filter_equality() {
        let tile = MemoryTile::new().with_layer(
            "water",
            MemoryLayer::new(4096)
                .with_feature(MemoryFeature::polygon(FULL).with_property("class", "water"))
                .with_feature(MemoryFeature::polygon(FULL))
                .with_feature(MemoryFeature::polygon(FULL).with_property("class", "land")),
        );
        let layer = water_fill().with_filter(LayerFilter::equals(
            "class",
            FilterLiteral::String("water".to_string()),
        ));
        let (surface, outcome) = draw_at(vec![layer], &tile, TileId::new(0, 0, 0));
        assert_eq!(fills(&surface), 2);
        assert_eq!(
            outcome,
            RenderOutcome::Complete {
                layers_drawn: 1,
                features_drawn: 2
            }
        );
    }

    #[test]
    fn test_feature_zoom_gate() {
        let tile = MemoryTile::new().with_layer(
            "water",
            MemoryLayer::new(4096)
                .with_feature(MemoryFeature::polygon(FULL).with_property("_minzoom", 8i64))
                .with_feature(MemoryFeature::polygon(FULL).with_property("_maxzoom", "6"))
                .with_feature(MemoryFeature::polygon(FULL).with_property("_minzoom", "n/a")),
        );
        let (surface, _) = draw_at(vec![water_fill()], &tile, TileId::new(6, 0, 0));
        assert_eq!(fills(&surface), 1);
        let (surface, _) = draw_at(vec![water_fill()], &tile, TileId::new(8, 0, 0));
        assert_eq!(fills(&surface), 2);
    }

    #[test]
    fn test_missing_source_layer_is_skipped() {
        let roads = StyleLayer::new("roads", LayerType::Line, "transportation");
        let (surface, outcome) = draw_at(vec![roads, water_fill()], &water_tile(), TileId::new(0, 0, 0));
        assert_eq!(fills(&surface), 1);
        assert!(matches!(outcome, RenderOutcome::Complete { layers_drawn: 1, .. }));
    }

    #[test]
    fn test_blank_source_layer_stops() {
        let tile = water_tile().with_blank_layer("landuse");
        let layers = vec![
            water_fill(),
            StyleLayer::new("landuse", LayerType::Fill, "landuse"),
            water_fill(),
        ];
        let (surface, outcome) = draw_at(layers, &tile, TileId::new(0, 0, 0));
        assert_eq!(fills(&surface), 1);
        assert_eq!(
            outcome,
            RenderOutcome::Blank {
                source_layer: "landuse".to_string()
            }
        );
    }

    #[test]
    fn test_hidden_layer_covers_with_running_background() {
        let hidden = water_fill().with_layout(LayoutProps {
            visibility: Some(ValueExpr::constant("none")),
            ..Default::default()
        });
        let layers = vec![background("a", "blue"), hidden, background("b", "red")];
        let (surface, _) = draw_at(layers, &water_tile(), TileId::new(0, 0, 0));
        assert_eq!(
            surface.commands(),
            &[
                DrawCommand::FillAll(Color::from_rgba8(255, 0, 0, 255)),
                DrawCommand::FillAll(Color::from_rgba8(0, 0, 255, 255)),
            ]
        );
    }

    #[test]
    fn test_insufficient_resolution_draws_nothing() {
        let tile = MemoryTile::new().with_layer(
            "water",
            MemoryLayer::new(16).with_feature(MemoryFeature::polygon(&[(0, 0), (16, 0), (16, 16)])),
        );
        let (surface, result) = draw(
            vec![background("bg", "white"), water_fill()],
            &tile,
            TileId::new(0, 0, 0),
            TileId::new(1, 0, 0),
            &RenderConfig::default(),
        );
        let err = result.unwrap_err();
        assert!(err.is_insufficient_resolution());
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_non_descendant_is_error() {
        let (_, result) = draw(
            vec![water_fill()],
            &water_tile(),
            TileId::new(2, 0, 0),
            TileId::new(3, 7, 7),
            &RenderConfig::default(),
        );
        assert!(matches!(result, Err(RenderError::Projection(_))));
    }

    #[test]
    fn test_overzoom_disabled_draws_native_geometry() {
        let config = RenderConfig::default().with_overzoom(false);
        let (surface, result) = draw(
            vec![water_fill()],
            &water_tile(),
            TileId::new(0, 0, 0),
            TileId::new(2, 3, 3),
            &config,
        );
        assert!(result.is_ok());
        match &surface.commands()[1] {
            DrawCommand::FillPath { path, .. } => assert_eq!(path.rings()[0][2], (256.0, 256.0)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_overzoom_skips_features_outside_footprint() {
        let tile = MemoryTile::new().with_layer(
            "water",
            MemoryLayer::new(4096)
                .with_feature(MemoryFeature::polygon(&[(0, 0), (1000, 0), (1000, 1000)]))
                .with_feature(MemoryFeature::polygon(&[(3000, 0), (4000, 0), (4000, 1000)])),
        );
        let (surface, result) = draw(
            vec![water_fill()],
            &tile,
            TileId::new(0, 0, 0),
            TileId::new(1, 1, 0),
            &RenderConfig::default(),
        );
        assert!(matches!(
            result.unwrap(),
            RenderOutcome::Complete { features_drawn: 1, .. }
        ));
        assert_eq!(fills(&surface), 1);
    }

    #[test]
    fn test_unknown_geometry_is_skipped() {
        let tile = MemoryTile::new().with_layer(
            "water",
            MemoryLayer::new(4096).with_feature(MemoryFeature::new(GeomType::Unknown, vec![])),
        );
        let (surface, _) = draw_at(vec![water_fill()], &tile, TileId::new(0, 0, 0));
        assert_eq!(fills(&surface), 0);
    }
}
