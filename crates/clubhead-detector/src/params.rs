use serde::{Deserialize, Serialize};

use crate::DetectError;

/// Region-of-interest estimation from pose landmarks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiParams {
    /// Landmarks at or below this visibility are ignored.
    pub min_visibility: f32,
    /// Minimal number of usable landmarks to build a ROI.
    pub min_landmarks: usize,
    /// Margin around the landmark bounding box, as a fraction of the larger frame side.
    pub margin_frac: f32,
    /// Side of the square window around the last club head, as a fraction of
    /// the larger frame side.
    pub track_window_frac: f32,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self {
            min_visibility: 0.1,
            min_landmarks: 2,
            margin_frac: 0.30,
            track_window_frac: 0.25,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// ROIs whose intensity range is below this are treated as featureless.
    pub min_dynamic_range: u8,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            min_dynamic_range: 8,
        }
    }
}

/// Gradient edge detection.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    /// Threshold = mean + `stddev_gain` * stddev of nonzero magnitudes.
    pub stddev_gain: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            stddev_gain: 0.5,
            min_threshold: 20.0,
            max_threshold: 120.0,
        }
    }
}

/// Hough line voting.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    /// Number of angle bins over [-90°, 90°).
    pub angle_bins: usize,
    /// Distance bin width in pixels.
    pub rho_resolution: f32,
    /// Half-width of the voted angle band around a constraint (degrees).
    pub angle_band_deg: f32,
    /// Absolute floor of the vote threshold.
    pub min_votes: u32,
    /// Vote threshold as a fraction of the ROI's smaller side.
    pub votes_frac: f32,
    pub max_candidates: usize,
    /// Peaks closer than this in angle *and* distance to a stronger peak are dropped.
    pub peak_min_angle_sep_deg: f32,
    pub peak_min_rho_sep: f32,
    /// Edge pixels within this distance of a peak line delimit its segment.
    pub inlier_tolerance_px: f32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            angle_bins: 180,
            rho_resolution: 1.0,
            angle_band_deg: 35.0,
            min_votes: 20,
            votes_frac: 0.15,
            max_candidates: 20,
            peak_min_angle_sep_deg: 4.0,
            peak_min_rho_sep: 6.0,
            inlier_tolerance_px: 1.5,
        }
    }
}

/// Shaft-line scoring. Each term is normalized to [0, 1] before weighting.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    pub length_weight: f32,
    pub wrist_weight: f32,
    /// Wrist distance normalizer, as a fraction of the larger frame side.
    pub wrist_distance_frac: f32,
    pub forearm_weight: f32,
    pub forearm_tolerance_deg: f32,
    pub prev_angle_weight: f32,
    pub prev_angle_tolerance_deg: f32,
    pub prev_midpoint_weight: f32,
    /// Midpoint distance normalizer, as a fraction of the larger frame side.
    pub prev_midpoint_frac: f32,
    /// A candidate is accepted only with a score strictly above this.
    pub min_score: f32,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            length_weight: 0.4,
            wrist_weight: 0.4,
            wrist_distance_frac: 0.30,
            forearm_weight: 0.2,
            forearm_tolerance_deg: 60.0,
            prev_angle_weight: 0.3,
            prev_angle_tolerance_deg: 40.0,
            prev_midpoint_weight: 0.2,
            prev_midpoint_frac: 0.25,
            min_score: 0.3,
        }
    }
}

/// Club-head projection along the shaft and shaft-length calibration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationParams {
    /// Baseline extension, as a fraction of the larger frame side.
    pub base_length_frac: f32,
    /// Gain on the (normalized) wrist separation, scaled by the larger frame side.
    pub wrist_separation_gain: f32,
    /// Extension as a fraction of the calibrated shaft length.
    pub calibrated_scale: f32,
    /// Cap on the calibrated extension, as a fraction of the larger frame side.
    pub max_length_frac: f32,
    /// Number of edge detections feeding the calibration before it freezes.
    pub calibration_samples: usize,
    /// Weight of a new sample in the running average.
    pub calibration_alpha: f32,
}

impl Default for ExtrapolationParams {
    fn default() -> Self {
        Self {
            base_length_frac: 0.18,
            wrist_separation_gain: 0.35,
            calibrated_scale: 0.9,
            max_length_frac: 0.45,
            calibration_samples: 20,
            calibration_alpha: 0.2,
        }
    }
}

/// Patch-correlation tracking.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    /// Side of the square template, in pixels (odd).
    pub patch_size: usize,
    pub search_radius: i64,
    pub search_stride: usize,
    pub min_ncc: f32,
}

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            patch_size: 15,
            search_radius: 20,
            search_stride: 2,
            min_ncc: 0.3,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationParams {
    pub min_history: usize,
    /// Per-axis step cap in normalized coordinates.
    pub max_step: f32,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            min_history: 2,
            max_step: 0.05,
        }
    }
}

/// Pure pose-geometry estimate used when everything else failed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseFallbackParams {
    /// Joints must be more visible than this to be used.
    pub min_visibility: f32,
    /// Extension = `forearm_gain` * forearm length + `wrist_separation_gain` * separation.
    pub forearm_gain: f32,
    pub wrist_separation_gain: f32,
    pub min_extension: f32,
    pub max_extension: f32,
    /// Downward offset below the wrists when no forearm is usable.
    pub wrist_drop: f32,
    pub default_position: [f32; 2],
}

impl Default for PoseFallbackParams {
    fn default() -> Self {
        Self {
            min_visibility: 0.3,
            forearm_gain: 1.2,
            wrist_separation_gain: 0.5,
            min_extension: 0.10,
            max_extension: 0.28,
            wrist_drop: 0.15,
            default_position: [0.5, 0.75],
        }
    }
}

/// Fixed confidence attached to each detection method.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceParams {
    pub edge_detected: f32,
    pub optical_flow: f32,
    pub interpolated: f32,
    pub pose_fallback_max: f32,
    pub pose_fallback_min: f32,
}

impl Default for ConfidenceParams {
    fn default() -> Self {
        Self {
            edge_detected: 0.85,
            optical_flow: 0.6,
            interpolated: 0.5,
            pose_fallback_max: 0.4,
            pose_fallback_min: 0.1,
        }
    }
}

/// Configuration for the club-head detector.
///
/// Every threshold of the pipeline lives here; `Default` holds the tuned
/// values. Partial JSON configs are accepted, missing fields keep defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub roi: RoiParams,
    pub preprocess: PreprocessParams,
    pub edges: EdgeParams,
    pub hough: HoughParams,
    pub selection: SelectionParams,
    pub extrapolation: ExtrapolationParams,
    pub tracking: TrackingParams,
    pub interpolation: InterpolationParams,
    pub pose_fallback: PoseFallbackParams,
    pub confidence: ConfidenceParams,
    pub history: HistoryParams,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryParams {
    /// Maximal number of club-head positions kept for interpolation.
    pub capacity: usize,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self { capacity: 30 }
    }
}

impl DetectorParams {
    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DetectError> {
        let fail = |msg: &str| Err(DetectError::InvalidParams(msg.to_string()));

        if self.hough.angle_bins == 0 {
            return fail("hough.angle_bins must be positive");
        }
        if !(self.hough.rho_resolution.is_finite() && self.hough.rho_resolution > 0.0) {
            return fail("hough.rho_resolution must be positive");
        }
        if self.edges.min_threshold > self.edges.max_threshold {
            return fail("edges.min_threshold exceeds edges.max_threshold");
        }
        if self.tracking.patch_size == 0 || self.tracking.patch_size % 2 == 0 {
            return fail("tracking.patch_size must be odd");
        }
        if self.tracking.search_stride == 0 {
            return fail("tracking.search_stride must be positive");
        }
        if !(self.extrapolation.calibration_alpha > 0.0 && self.extrapolation.calibration_alpha <= 1.0)
        {
            return fail("extrapolation.calibration_alpha must be in (0, 1]");
        }
        if self.interpolation.min_history < 2 {
            return fail("interpolation.min_history must be at least 2");
        }
        if self.history.capacity < self.interpolation.min_history {
            return fail("history.capacity is smaller than interpolation.min_history");
        }
        if self.pose_fallback.min_extension > self.pose_fallback.max_extension {
            return fail("pose_fallback.min_extension exceeds pose_fallback.max_extension");
        }

        let c = &self.confidence;
        let ordered = c.edge_detected <= 1.0
            && c.edge_detected > c.optical_flow
            && c.optical_flow > c.interpolated
            && c.interpolated > c.pose_fallback_max
            && c.pose_fallback_max >= c.pose_fallback_min
            && c.pose_fallback_min >= 0.0;
        if !ordered {
            return fail("confidence levels must satisfy edge > flow > interpolated > pose");
        }
        Ok(())
    }
}
