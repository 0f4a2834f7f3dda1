use clubhead_core::PoseLandmarks;
use nalgebra::{Point2, Vector2};

use super::{FrameContext, StrategyOutcome};
use crate::detector::DetectionMethod;
use crate::params::{ConfidenceParams, PoseFallbackParams};

/// Terminal estimate from pose geometry alone. Always produces a result.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoseGeometryFallback;

impl PoseGeometryFallback {
    pub fn estimate(&self, ctx: &FrameContext<'_>) -> StrategyOutcome {
        let (club_head, confidence) = pose_estimate(
            ctx.pose,
            ctx.wrist_separation,
            &ctx.params.pose_fallback,
            &ctx.params.confidence,
        );
        StrategyOutcome {
            club_head,
            shaft_line: None,
            confidence,
            method: DetectionMethod::PoseFallback,
        }
    }
}

#[inline]
fn lerp(lo: f32, hi: f32, t: f32) -> f32 {
    lo + (hi - lo) * t.clamp(0.0, 1.0)
}

/// Normalized club head and confidence from landmarks.
///
/// 1. A usable forearm: continue elbow → wrist past the wrist by
///    `forearm_gain · |forearm| + wrist_separation_gain · separation`,
///    clamped to `[min_extension, max_extension]`.
/// 2. Wrists only: a fixed drop below the wrist center.
/// 3. Nothing usable: the default position at minimal confidence.
fn pose_estimate(
    pose: &PoseLandmarks,
    wrist_separation: f32,
    params: &PoseFallbackParams,
    conf: &ConfidenceParams,
) -> (Point2<f32>, f32) {
    let (lo, hi) = (conf.pose_fallback_min, conf.pose_fallback_max);

    if let Some(forearm) = pose.best_forearm(params.min_visibility) {
        let v = forearm.vector();
        let len = v.norm();
        if len > f32::EPSILON {
            let extension = (params.forearm_gain * len
                + params.wrist_separation_gain * wrist_separation)
                .clamp(params.min_extension, params.max_extension);
            let head = forearm.wrist.position() + v / len * extension;
            return (head, lerp(lo, hi, forearm.visibility()));
        }
    }

    if let Some(center) = pose.wrist_center(params.min_visibility) {
        let vis: Vec<f32> = [pose.left_wrist, pose.right_wrist]
            .into_iter()
            .flatten()
            .map(|w| w.visibility)
            .filter(|&v| v > params.min_visibility)
            .collect();
        let mean_vis = vis.iter().sum::<f32>() / vis.len().max(1) as f32;
        let head = center + Vector2::new(0.0, params.wrist_drop);
        return (head, lerp(lo, hi, 0.5 * mean_vis));
    }

    let [x, y] = params.default_position;
    (Point2::new(x, y), lo)
}
