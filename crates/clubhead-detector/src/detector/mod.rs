//! Club-head detection pipeline.
//!
//! This module wires together ROI estimation, the strategy chain and the
//! temporal state each detector instance owns.

mod error;
mod pipeline;
mod result;

pub use error::DetectError;
pub use pipeline::ClubHeadDetector;
pub use result::{DetectionDebug, DetectionMethod, DetectionResult};
