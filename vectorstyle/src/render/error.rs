//! Error types for tile rendering.

use thiserror::Error;

use crate::overzoom::ProjectionError;

/// Errors that abort a render call or surface operation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested tile cannot be derived from the native tile.
    #[error("Projection failed: {0}")]
    Projection(#[from] ProjectionError),

    /// The target surface could not be allocated.
    #[error("Cannot allocate a {width}×{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    /// Encoding the rendered surface failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// A label font could not be loaded.
    #[error("Invalid font: {0}")]
    Font(String),
}

impl RenderError {
    /// True for the overzoom error that means the native data is too coarse
    /// for the requested level; callers may fall back to the native tile.
    pub fn is_insufficient_resolution(&self) -> bool {
        matches!(
            self,
            RenderError::Projection(ProjectionError::InsufficientResolution { .. })
        )
    }
}
