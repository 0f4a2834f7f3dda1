//! Ordered detection strategies.
//!
//! The detector walks its chain until a strategy produces an outcome; the
//! pose-geometry estimate closes the chain and never fails.

mod edge;
mod interpolation;
mod pose;
mod tracking;

pub use edge::EdgeLineDetection;
pub use interpolation::{interpolate_next, VelocityInterpolation};
pub use pose::PoseGeometryFallback;
pub use tracking::{ncc, track_patch, PatchMatch, PatchTracking};

use clubhead_core::{GrayImage, Line, PoseLandmarks, Roi};
use nalgebra::Point2;

use crate::detector::{DetectionDebug, DetectionMethod};
use crate::params::DetectorParams;
use crate::state::TemporalState;

/// Per-frame inputs shared by all strategies.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    /// Full-frame grayscale image.
    pub gray: &'a GrayImage,
    pub pose: &'a PoseLandmarks,
    /// Normalized wrist separation, already sanitized to a finite value >= 0.
    pub wrist_separation: f32,
    pub roi: Option<Roi>,
    pub params: &'a DetectorParams,
}

impl FrameContext<'_> {
    #[inline]
    pub fn width(&self) -> usize {
        self.gray.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.gray.height
    }

    #[inline]
    pub fn to_pixels(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(p.x * self.width() as f32, p.y * self.height() as f32)
    }

    #[inline]
    pub fn to_normalized(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(
            p.x / self.width().max(1) as f32,
            p.y / self.height().max(1) as f32,
        )
    }
}

/// What a successful strategy reports. The club head is normalized but not
/// yet clamped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrategyOutcome {
    pub club_head: Point2<f32>,
    pub shaft_line: Option<Line>,
    pub confidence: f32,
    pub method: DetectionMethod,
}

/// One fallible stage of the detection chain.
pub trait DetectionStrategy {
    fn method(&self) -> DetectionMethod;

    /// Try to locate the club head. `None` hands over to the next stage.
    fn attempt(
        &self,
        ctx: &FrameContext<'_>,
        state: &TemporalState,
        debug: &mut DetectionDebug,
    ) -> Option<StrategyOutcome>;
}

pub type StrategyChain = Vec<Box<dyn DetectionStrategy + Send + Sync>>;

/// Edge detection, then patch tracking, then velocity interpolation.
pub fn default_chain() -> StrategyChain {
    vec![
        Box::new(EdgeLineDetection),
        Box::new(PatchTracking),
        Box::new(VelocityInterpolation),
    ]
}
