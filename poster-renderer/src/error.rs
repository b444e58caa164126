//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Export requested with no objects and the default background.
    #[error("Nothing to export: scene has no objects and the default background")]
    EmptyScene,

    /// The generated SVG document could not be parsed.
    #[error("SVG parsing failed: {0}")]
    Svg(String),

    /// Rasterization failed.
    #[error("Rasterization failed: {0}")]
    Raster(String),

    /// Encoding an image failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Font loading failed.
    #[error("Failed to load font: {0}")]
    Font(String),
}
