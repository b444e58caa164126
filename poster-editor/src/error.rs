//! Error types for the editing session.

use std::path::PathBuf;

use poster_core::SceneError;
use poster_renderer::RenderError;
use thiserror::Error;

/// Errors surfaced by the editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A scene operation failed.
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Rendering or export failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A decode worker stopped before reporting a result.
    #[error("Decode task failed: {0}")]
    Task(String),
}

impl EditorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
