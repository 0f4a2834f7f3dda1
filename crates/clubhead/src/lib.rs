//! High-level facade crate for the `clubhead-*` workspace.
//!
//! This crate provides:
//! - convenient re-exports of the core types and the detector
//! - JSON helpers for detector configs and per-frame pose sequences
//! - (feature-gated) helpers that run the detector on `image` buffers
//!
//! ## Quickstart
//!
//! ```no_run
//! use clubhead::{detect, ClubHeadDetector, DetectorParams, PoseLandmarks};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("frame_0001.png")?;
//! let mut detector = ClubHeadDetector::new(DetectorParams::default())?;
//! detector.init(img.width() as usize, img.height() as usize)?;
//!
//! let pose = PoseLandmarks::default();
//! let result = detect::detect_image(&mut detector, &img, &pose, 0.0)?;
//! println!("{} at {:?}", result.method, result.club_head);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `clubhead::core`: frames, grayscale images, geometry, pose landmarks.
//! - `clubhead::detector`: the detection pipeline and its stages.
//! - `clubhead::io`: config and pose-sequence files.
//! - `clubhead::detect` (feature `image`): helpers from `image` buffers.

pub use clubhead_core as core;
pub use clubhead_detector as detector;

pub use clubhead_core::{FrameView, GrayImage, Landmark, Line, PixelFormat, PoseLandmarks, Roi};
pub use clubhead_detector::{
    ClubHeadDetector, DetectError, DetectionDebug, DetectionMethod, DetectionResult,
    DetectorParams,
};

mod error;
pub mod io;

pub use error::ClubheadError;

#[cfg(feature = "image")]
pub mod detect;
