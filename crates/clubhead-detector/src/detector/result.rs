use std::fmt;

use clubhead_core::{Line, Roi};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Which stage of the chain produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    EdgeDetected,
    OpticalFlow,
    Interpolated,
    PoseFallback,
}

impl DetectionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EdgeDetected => "edge_detected",
            Self::OpticalFlow => "optical_flow",
            Self::Interpolated => "interpolated",
            Self::PoseFallback => "pose_fallback",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intermediate measurements of one detection call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionDebug {
    pub roi: Option<Roi>,
    pub edge_pixels: Option<usize>,
    pub candidates: Option<usize>,
    /// Score of the best-ranked line, accepted or not.
    pub best_score: Option<f32>,
    pub ncc_score: Option<f32>,
    pub extension_px: Option<f32>,
    /// Stages tried, in order; the last one produced the result.
    pub attempted: Vec<DetectionMethod>,
}

/// Output of one detection call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Club head, normalized and clamped to the unit square.
    pub club_head: Point2<f32>,
    /// Selected shaft line in frame pixels (edge detection only).
    pub shaft_line: Option<Line>,
    pub confidence: f32,
    pub method: DetectionMethod,
    pub debug: DetectionDebug,
}

impl DetectionResult {
    /// Club head scaled to a `width × height` display.
    #[inline]
    pub fn club_head_px(&self, width: f32, height: f32) -> Point2<f32> {
        Point2::new(self.club_head.x * width, self.club_head.y * height)
    }
}
