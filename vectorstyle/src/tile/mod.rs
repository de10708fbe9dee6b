//! Read-only vector tile interface.
//!
//! The renderer never decodes tiles itself. Any decoder can feed it by
//! implementing the three traits below:
//!
//! ```text
//! VectorTile ──layer(name)──► TileLayer ──feature(i)──► TileFeature
//!                              extent()                  geom_type()
//!                              len()                     properties()
//!                                                        load_geometry()
//! ```
//!
//! [`MemoryTile`] is a plain in-memory implementation, deserializable from
//! JSON, used by the CLI and the tests.

mod memory;
mod types;

pub use memory::{MemoryFeature, MemoryLayer, MemoryTile};
pub use types::{GeomType, Point, Properties, PropertyValue, Ring};

/// Result of looking up a source layer in a tile.
#[derive(Debug)]
pub enum LayerLookup<'a, L> {
    /// The tile has no layer with this name.
    Missing,
    /// The tile declares the layer but carries no data for it.
    Blank,
    /// The layer is present.
    Present(&'a L),
}

/// A decoded vector tile: named layers of features.
pub trait VectorTile {
    type Layer: TileLayer;

    /// Look up a source layer by name.
    fn layer(&self, name: &str) -> LayerLookup<'_, Self::Layer>;
}

/// One named layer of a vector tile.
pub trait TileLayer {
    type Feature<'a>: TileFeature
    where
        Self: 'a;

    /// Size of the coordinate space feature geometry is authored in.
    fn extent(&self) -> u32;

    /// Number of features in the layer.
    fn len(&self) -> usize;

    /// True when the layer holds no features.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature at `index`, or `None` past the end.
    fn feature(&self, index: usize) -> Option<Self::Feature<'_>>;
}

/// One feature of a tile layer.
pub trait TileFeature {
    fn geom_type(&self) -> GeomType;

    fn properties(&self) -> &Properties;

    /// Decode the feature geometry into rings of tile-extent points.
    fn load_geometry(&self) -> Vec<Ring>;
}

impl<T: TileFeature + ?Sized> TileFeature for &T {
    fn geom_type(&self) -> GeomType {
        (**self).geom_type()
    }

    fn properties(&self) -> &Properties {
        (**self).properties()
    }

    fn load_geometry(&self) -> Vec<Ring> {
        (**self).load_geometry()
    }
}
