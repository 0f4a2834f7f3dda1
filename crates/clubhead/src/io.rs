//! JSON inputs and outputs of the frame-sequence runner.
//!
//! A pose file is a JSON array with one entry per frame:
//!
//! ```json
//! [
//!   {
//!     "left_wrist": { "x": 0.40, "y": 0.60, "visibility": 0.9 },
//!     "right_wrist": { "x": 0.60, "y": 0.60, "visibility": 0.9 },
//!     "wrist_separation": 0.2
//!   }
//! ]
//! ```
//!
//! Missing landmarks are `null` or absent; a missing `wrist_separation` is
//! derived from the wrists.

use std::fs;
use std::path::Path;

use clubhead_core::PoseLandmarks;
use clubhead_detector::{DetectionResult, DetectorParams};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ClubheadError;

/// Pose landmarks of one frame plus the optional wrist separation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FramePose {
    #[serde(flatten)]
    pub pose: PoseLandmarks,
    #[serde(default)]
    pub wrist_separation: Option<f32>,
}

impl FramePose {
    /// Given separation, else the distance between the visible wrists, else 0.
    pub fn wrist_separation(&self, min_visibility: f32) -> f32 {
        self.wrist_separation
            .or_else(|| self.pose.wrist_separation(min_visibility))
            .unwrap_or(0.0)
    }
}

/// One line of the runner's output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame: usize,
    pub path: String,
    pub width: usize,
    pub height: usize,
    #[serde(flatten)]
    pub result: DetectionResult,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ClubheadError> {
    let raw = fs::read_to_string(path).map_err(|source| ClubheadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ClubheadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a (possibly partial) detector config; missing fields keep defaults.
pub fn load_params(path: &Path) -> Result<DetectorParams, ClubheadError> {
    let params: DetectorParams = read_json(path)?;
    params.validate()?;
    Ok(params)
}

pub fn load_poses(path: &Path) -> Result<Vec<FramePose>, ClubheadError> {
    read_json(path)
}
