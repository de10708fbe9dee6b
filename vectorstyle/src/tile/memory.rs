//! In-memory vector tile.
//!
//! JSON shape accepted by [`MemoryTile::from_json`]:
//!
//! ```json
//! {
//!   "layers": {
//!     "water": {
//!       "extent": 4096,
//!       "features": [
//!         { "type": 3, "properties": { "class": "lake" },
//!           "geometry": [[[0, 0], [4096, 0], [4096, 4096], [0, 4096]]] }
//!       ]
//!     },
//!     "landuse": null
//!   }
//! }
//! ```
//!
//! A `null` layer is declared but blank.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{GeomType, Point, Properties, PropertyValue, Ring};
use super::{LayerLookup, TileFeature, TileLayer, VectorTile};

/// Default extent used by most vector tile producers.
pub const DEFAULT_EXTENT: u32 = 4096;

fn default_extent() -> u32 {
    DEFAULT_EXTENT
}

/// A vector tile held entirely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryTile {
    #[serde(default)]
    layers: HashMap<String, Option<MemoryLayer>>,
}

impl MemoryTile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tile from its JSON representation.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Add (or replace) a layer.
    pub fn with_layer(mut self, name: impl Into<String>, layer: MemoryLayer) -> Self {
        self.layers.insert(name.into(), Some(layer));
        self
    }

    /// Declare a layer without data.
    pub fn with_blank_layer(mut self, name: impl Into<String>) -> Self {
        self.layers.insert(name.into(), None);
        self
    }

    /// Names of all declared layers.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }
}

impl VectorTile for MemoryTile {
    type Layer = MemoryLayer;

    fn layer(&self, name: &str) -> LayerLookup<'_, MemoryLayer> {
        match self.layers.get(name) {
            None => LayerLookup::Missing,
            Some(None) => LayerLookup::Blank,
            Some(Some(layer)) => LayerLookup::Present(layer),
        }
    }
}

/// A layer of in-memory features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryLayer {
    #[serde(default = "default_extent")]
    extent: u32,
    #[serde(default)]
    features: Vec<MemoryFeature>,
}

impl MemoryLayer {
    pub fn new(extent: u32) -> Self {
        Self {
            extent,
            features: Vec::new(),
        }
    }

    pub fn with_feature(mut self, feature: MemoryFeature) -> Self {
        self.features.push(feature);
        self
    }
}

impl Default for MemoryLayer {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENT)
    }
}

impl TileLayer for MemoryLayer {
    type Feature<'a> = &'a MemoryFeature;

    fn extent(&self) -> u32 {
        self.extent
    }

    fn len(&self) -> usize {
        self.features.len()
    }

    fn feature(&self, index: usize) -> Option<&MemoryFeature> {
        self.features.get(index)
    }
}

/// A feature with eagerly stored geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryFeature {
    #[serde(rename = "type")]
    type_code: u8,
    #[serde(default)]
    properties: Properties,
    #[serde(default)]
    geometry: Vec<Ring>,
}

impl MemoryFeature {
    /// Create a feature from its geometry type and rings.
    pub fn new(geom_type: GeomType, geometry: Vec<Ring>) -> Self {
        Self {
            type_code: geom_type.into(),
            properties: Properties::new(),
            geometry,
        }
    }

    /// A single-ring polygon from `(x, y)` pairs.
    pub fn polygon(ring: &[(i32, i32)]) -> Self {
        Self::new(GeomType::Polygon, vec![to_ring(ring)])
    }

    /// A single line string from `(x, y)` pairs.
    pub fn line(points: &[(i32, i32)]) -> Self {
        Self::new(GeomType::LineString, vec![to_ring(points)])
    }

    /// A single point.
    pub fn point(x: i32, y: i32) -> Self {
        Self::new(GeomType::Point, vec![vec![Point::new(x, y)]])
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

fn to_ring(points: &[(i32, i32)]) -> Ring {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

impl TileFeature for MemoryFeature {
    fn geom_type(&self) -> GeomType {
        GeomType::from(self.type_code)
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }

    fn load_geometry(&self) -> Vec<Ring> {
        self.geometry.clone()
    }
}
