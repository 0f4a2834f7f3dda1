use clubhead_core::FrameError;

/// Caller misuse. Degraded frames are never errors; they end up in the
/// fallback chain instead.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DetectError {
    #[error("detector used before init(width, height)")]
    NotInitialized,
    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: usize, height: usize },
    #[error("frame is {got:?}, detector was initialized for {expected:?}")]
    FrameSizeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("invalid detector parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}
