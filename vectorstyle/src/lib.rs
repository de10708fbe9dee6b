//! Style-driven vector tile rasterizer.
//!
//! Draws decoded vector tiles onto a raster surface following a
//! Mapbox-GL-style document: background, fill, line and symbol layers,
//! zoom stops, equality filters, sprite icons and overzoomed tiles.
//!
//! # Modules
//!
//! - [`style`]: style document, layers, property values and filters
//! - [`sprite`]: sprite atlas decoding
//! - [`tile`]: the vector tile interface and an in-memory tile
//! - [`overzoom`]: geometry reprojection into descendant tiles
//! - [`render`]: the styling loop, feature dispatch and surfaces
//! - [`loader`]: asynchronous style and sprite loading
//! - [`config`], [`logging`]: settings and log setup

pub mod config;
pub mod coord;
pub mod loader;
pub mod logging;
pub mod overzoom;
pub mod render;
pub mod sprite;
pub mod style;
pub mod tile;
