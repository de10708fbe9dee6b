//! Tile rendering.
//!
//! [`TileStyler`] drives a render: it walks the style, gates layers and
//! features, reprojects overzoomed geometry and hands each feature to the
//! [`FeatureRenderer`], which draws onto a [`Surface`].
//!
//! # Example
//!
//! ```
//! use vectorstyle::config::RenderConfig;
//! use vectorstyle::coord::TileId;
//! use vectorstyle::render::{PixmapSurface, RenderOutcome, TileStyler};
//! use vectorstyle::sprite::SpriteAtlas;
//! use vectorstyle::style::StyleDocument;
//! use vectorstyle::tile::{MemoryFeature, MemoryLayer, MemoryTile};
//!
//! let style = StyleDocument::from_json(br##"{"layers": [
//!     {"id": "water", "type": "fill", "source-layer": "water",
//!      "paint": {"fill-color": "#0000ff"}}
//! ]}"##).unwrap();
//! let tile = MemoryTile::new().with_layer(
//!     "water",
//!     MemoryLayer::new(4096)
//!         .with_feature(MemoryFeature::polygon(&[(0, 0), (4096, 0), (4096, 4096), (0, 4096)])),
//! );
//!
//! let config = RenderConfig::default();
//! let sprites = SpriteAtlas::empty();
//! let mut surface = PixmapSurface::new(256, 256).unwrap();
//! let tile_id = TileId::new(5, 16, 11);
//! let outcome = TileStyler::new(&style, &sprites, &config)
//!     .draw_tile(&mut surface, &tile, tile_id, tile_id)
//!     .unwrap();
//!
//! assert!(matches!(outcome, RenderOutcome::Complete { features_drawn: 1, .. }));
//! assert_eq!(surface.pixel(128, 128), Some([0, 0, 255, 255]));
//! ```

mod error;
mod feature;
mod pixmap;
mod styler;
mod surface;
mod text;

pub use error::RenderError;
pub use feature::{dispatch, label_text, DrawAction, FeatureRenderer, LayerStyle};
pub use pixmap::PixmapSurface;
pub use styler::{RenderOutcome, TileStyler};
pub use surface::{DrawCommand, PixelPath, RecordingSurface, StrokeStyle, Surface, TextStyle};
pub use text::{LabelFont, TextMetrics};
