//! Error types for sprite atlas decoding.

use thiserror::Error;

/// Errors that can occur while building a sprite atlas.
#[derive(Debug, Error)]
pub enum SpriteError {
    /// The sprite index is not valid JSON or has the wrong shape.
    #[error("Invalid sprite index: {0}")]
    Index(#[from] serde_json::Error),

    /// The sprite image could not be decoded.
    #[error("Invalid sprite image: {0}")]
    Image(#[from] image::ImageError),
}
