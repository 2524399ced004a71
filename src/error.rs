use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the rice-mlp library.
///
/// Every variant is fatal for a training run: nothing here is retried.
#[derive(Error, Debug)]
pub enum RiceError {
    /// An image file is missing or cannot be decoded.
    #[error("failed to decode image '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// A caller passed an argument the operation cannot handle.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, RiceError>;
