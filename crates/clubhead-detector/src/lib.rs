//! Per-frame golf club-head detector built on top of `clubhead-core`.
//!
//! ## Quickstart
//!
//! ```
//! use clubhead_core::{GrayImage, Landmark, PoseLandmarks};
//! use clubhead_detector::{ClubHeadDetector, DetectionMethod, DetectorParams};
//!
//! let mut detector = ClubHeadDetector::new(DetectorParams::default()).unwrap();
//! detector.init(64, 48).unwrap();
//!
//! let pose = PoseLandmarks {
//!     left_wrist: Some(Landmark::new(0.4, 0.6, 0.9)),
//!     right_wrist: Some(Landmark::new(0.6, 0.6, 0.9)),
//!     ..Default::default()
//! };
//! let result = detector.detect_gray(GrayImage::new(64, 48), &pose, 0.2).unwrap();
//! assert_eq!(result.method, DetectionMethod::PoseFallback);
//! ```
//!
//! Per frame:
//! 1. Build a ROI around the visible wrists/elbows (and the last club head).
//! 2. Stretch the ROI contrast, detect Sobel edges with non-maximum suppression.
//! 3. Vote lines in (angle, distance) space, around the last shaft angle or the
//!    forearm direction.
//! 4. Score candidates against the hands, the forearm and the previous shaft.
//! 5. Project the club head past the grip end, using a calibrated shaft length
//!    once enough detections were seen.
//! 6. If no line is accepted: patch tracking, velocity interpolation, and
//!    finally a pose-only estimate.

mod detector;
mod edges;
mod extrapolate;
mod hough;
mod params;
mod preprocess;
mod roi;
mod select;
mod state;
mod strategy;

pub use detector::{
    ClubHeadDetector, DetectError, DetectionDebug, DetectionMethod, DetectionResult,
};
pub use edges::{
    adaptive_threshold, compute_gradients, detect_edges, non_max_suppression, EdgeMap, Gradients,
};
pub use extrapolate::{extrapolate_club_head, shaft_extension, Extrapolation};
pub use hough::{extract_lines, vote_threshold, LineCandidate};
pub use params::{
    ConfidenceParams, DetectorParams, EdgeParams, ExtrapolationParams, HistoryParams, HoughParams,
    InterpolationParams, PoseFallbackParams, PreprocessParams, RoiParams, SelectionParams,
    TrackingParams,
};
pub use preprocess::{normalize_contrast, preprocess_roi};
pub use roi::estimate_roi;
pub use select::{rank_lines, score_line, select_line, ScoredLine, SelectionContext};
pub use state::{ShaftCalibration, TemporalState};
pub use strategy::{
    default_chain, interpolate_next, ncc, track_patch, DetectionStrategy, EdgeLineDetection,
    FrameContext, PatchMatch, PatchTracking, PoseGeometryFallback, StrategyChain,
    StrategyOutcome, VelocityInterpolation,
};
