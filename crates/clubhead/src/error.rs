use std::path::PathBuf;

use clubhead_core::FrameError;
use clubhead_detector::DetectError;

/// Errors produced by the facade helpers and the CLI.
#[derive(thiserror::Error, Debug)]
pub enum ClubheadError {
    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[cfg(feature = "image")]
    #[error("failed to load image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{frames} frames but only {poses} poses")]
    MissingPoses { frames: usize, poses: usize },
}
