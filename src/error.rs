//! Error type shared by the store, the rendering glue and the server.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    /// The requested post does not exist or is not visible to the caller.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unauthorized")]
    Unauthorized,

    /// Internal rendering defect, never caused by the markdown itself.
    #[error("rendering failed: {0}")]
    Render(String),

    #[error("storage error: {0}")]
    Storage(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("template error: {0}")]
    Template(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BlogError>;
