//! Shaft-line selection against pose geometry and temporal history.

use clubhead_core::{line_angle_diff_deg, Line, Roi};
use nalgebra::Point2;

use crate::params::SelectionParams;

/// Geometry the candidates are scored against. Points are frame pixels.
#[derive(Clone, Copy, Debug)]
pub struct SelectionContext {
    pub roi: Roi,
    pub frame_width: usize,
    pub frame_height: usize,
    pub wrist_center: Option<Point2<f32>>,
    pub forearm_angle: Option<f32>,
    pub prev_angle: Option<f32>,
    pub prev_midpoint: Option<Point2<f32>>,
}

impl SelectionContext {
    #[inline]
    fn max_side(&self) -> f32 {
        self.frame_width.max(self.frame_height) as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoredLine {
    pub line: Line,
    pub votes: u32,
    pub score: f32,
}

/// `1 - value / scale`, clamped to [0, 1].
#[inline]
fn falloff(value: f32, scale: f32) -> f32 {
    if scale <= 0.0 {
        return 0.0;
    }
    (1.0 - value / scale).clamp(0.0, 1.0)
}

/// Weighted shaft-likeness score of one frame-space line.
pub fn score_line(line: &Line, ctx: &SelectionContext, params: &SelectionParams) -> f32 {
    let min_side = ctx.roi.min_side().max(1) as f32;
    let mut score = params.length_weight * (line.length / min_side).clamp(0.0, 1.0);

    if let Some(wc) = ctx.wrist_center {
        let d = line.distance_to_point(wc);
        score += params.wrist_weight * falloff(d, params.wrist_distance_frac * ctx.max_side());
    }
    if let Some(fa) = ctx.forearm_angle {
        let diff = line_angle_diff_deg(line.angle, fa);
        score += params.forearm_weight * falloff(diff, params.forearm_tolerance_deg);
    }
    if let Some(pa) = ctx.prev_angle {
        let diff = line_angle_diff_deg(line.angle, pa);
        score += params.prev_angle_weight * falloff(diff, params.prev_angle_tolerance_deg);
    }
    if let Some(pm) = ctx.prev_midpoint {
        let d = (line.midpoint() - pm).norm();
        score += params.prev_midpoint_weight * falloff(d, params.prev_midpoint_frac * ctx.max_side());
    }
    score
}

/// Score all candidates, best first.
pub fn rank_lines(
    candidates: &[(Line, u32)],
    ctx: &SelectionContext,
    params: &SelectionParams,
) -> Vec<ScoredLine> {
    let mut scored: Vec<ScoredLine> = candidates
        .iter()
        .map(|&(line, votes)| ScoredLine {
            line,
            votes,
            score: score_line(&line, ctx, params),
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score).then(b.votes.cmp(&a.votes)));
    scored
}

/// Best candidate if its score clears `min_score`.
pub fn select_line(
    candidates: &[(Line, u32)],
    ctx: &SelectionContext,
    params: &SelectionParams,
) -> Option<ScoredLine> {
    rank_lines(candidates, ctx, params)
        .into_iter()
        .next()
        .filter(|best| best.score > params.min_score)
}
