//! Errors raised while writing rendered images.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to write a [`PixelArray`](crate::PixelArray) to disk.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory for {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
