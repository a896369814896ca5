//! Pane error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaneError {
    #[error("cannot allocate {width}x{height} pixel surface")]
    Allocation { width: u32, height: u32 },

    #[error("cannot load font {}: {reason}", path.display())]
    FontLoad { path: PathBuf, reason: String },

    #[error("cannot decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("pixel buffer of {len} words is too small for {width}x{height}")]
    BufferSize { width: u32, height: u32, len: usize },

    #[error("image buffer of {len} bytes does not match {width}x{height} RGBA")]
    InvalidImage { width: u32, height: u32, len: usize },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("display error: {0}")]
    Display(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = PaneError> = std::result::Result<T, E>;
