//! Error types for scene operations.

use thiserror::Error;

use crate::ObjectId;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur in scene operations.
///
/// None of these are fatal to an editing session: every operation that
/// returns an error leaves the scene exactly as it was before the call.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Object not found in the scene.
    #[error("Object not found: {0}")]
    NotFound(ObjectId),

    /// Image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Operation not permitted on this object.
    #[error("Invalid operation on object: {0}")]
    InvalidOperation(String),

    /// Colour string could not be parsed.
    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    /// Scene summary serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
