//! Error types for style parsing.

use thiserror::Error;

/// Errors that can occur while parsing a style document.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("Invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),
}
