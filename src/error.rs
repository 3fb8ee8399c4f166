// syno-thumbs error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Render error: {0}")]
    Render(String),

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ThumbError>;
