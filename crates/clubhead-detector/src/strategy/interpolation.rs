use nalgebra::{Point2, Vector2};

use super::{DetectionStrategy, FrameContext, StrategyOutcome};
use crate::detector::{DetectionDebug, DetectionMethod};
use crate::params::InterpolationParams;
use crate::state::TemporalState;

/// Constant-velocity step from the last two positions.
///
/// The step is capped per axis at `max_step` and the result clamped to the
/// unit square. `None` with fewer than `min_history` positions.
pub fn interpolate_next(
    history: &[Point2<f32>],
    params: &InterpolationParams,
) -> Option<Point2<f32>> {
    if history.len() < params.min_history.max(2) {
        return None;
    }
    let last = history[history.len() - 1];
    let before = history[history.len() - 2];
    let cap = params.max_step.abs();
    let v = last - before;
    let step = Vector2::new(v.x.clamp(-cap, cap), v.y.clamp(-cap, cap));
    let next = last + step;
    Some(Point2::new(next.x.clamp(0.0, 1.0), next.y.clamp(0.0, 1.0)))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VelocityInterpolation;

impl DetectionStrategy for VelocityInterpolation {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Interpolated
    }

    fn attempt(
        &self,
        ctx: &FrameContext<'_>,
        state: &TemporalState,
        _debug: &mut DetectionDebug,
    ) -> Option<StrategyOutcome> {
        let (a, b) = state.history().as_slices();
        let history: Vec<Point2<f32>> = a.iter().chain(b).copied().collect();
        let club_head = interpolate_next(&history, &ctx.params.interpolation)?;
        Some(StrategyOutcome {
            club_head,
            shaft_line: None,
            confidence: ctx.params.confidence.interpolated,
            method: DetectionMethod::Interpolated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn needs_two_positions() {
        let params = InterpolationParams::default();
        assert!(interpolate_next(&[], &params).is_none());
        assert!(interpolate_next(&[Point2::new(0.5, 0.5)], &params).is_none());
    }

    #[test]
    fn continues_small_motion() {
        let p = interpolate_next(
            &[Point2::new(0.50, 0.50), Point2::new(0.52, 0.49)],
            &InterpolationParams::default(),
        )
        .expect("next");
        assert_relative_eq!(p, Point2::new(0.54, 0.48), epsilon = 1e-6);
    }

    #[test]
    fn caps_step_and_clamps() {
        let params = InterpolationParams::default();
        let p = interpolate_next(&[Point2::new(0.1, 0.5), Point2::new(0.6, 0.3)], &params)
            .expect("next");
        assert_relative_eq!(p, Point2::new(0.65, 0.25), epsilon = 1e-6);

        let p = interpolate_next(&[Point2::new(0.9, 0.1), Point2::new(0.99, 0.02)], &params)
            .expect("next");
        assert_relative_eq!(p, Point2::new(1.0, 0.0), epsilon = 1e-6);
    }
}
