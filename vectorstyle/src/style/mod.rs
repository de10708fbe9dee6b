//! Map style interpreter.
//!
//! Parses the subset of the Mapbox GL style format the renderer draws and
//! resolves zoom-dependent property values.
//!
//! Supported layer types:
//! - `background`: sets the tile background color
//! - `fill`: polygon fill and outline
//! - `line`: strokes with width, opacity, dash pattern, cap and join
//! - `symbol`: text labels and sprite icons at the feature anchor
//!
//! Other layer types parse as [`LayerType::Unsupported`] and are skipped.
//!
//! # Limitations
//!
//! Zoom functions are evaluated as step functions (see [`resolve`]); no
//! interpolation between stops is performed. Only `==` filters are
//! evaluated (see [`LayerFilter`]).

mod color;
mod document;
mod error;
mod filter;
mod layer;
mod value;

pub use color::parse_color;
pub use document::{StyleDocument, SPRITE_IMAGE_SUFFIX, SPRITE_INDEX_SUFFIX};
pub use error::StyleError;
pub use filter::{FilterLiteral, LayerFilter};
pub use layer::{
    zoom_in_range, LayerType, LayoutProps, LineCap, LineJoin, PaintProps, ResolvedLayout,
    ResolvedPaint, StyleLayer, Visibility,
};
pub use value::{resolve, resolve_opt, Stop, StopsTable, StyleValue, ValueExpr};
