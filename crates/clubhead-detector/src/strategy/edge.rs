use clubhead_core::Line;
use log::trace;
use nalgebra::{Point2, Vector2};

use super::{DetectionStrategy, FrameContext, StrategyOutcome};
use crate::detector::{DetectionDebug, DetectionMethod};
use crate::edges::detect_edges;
use crate::extrapolate::{extrapolate_club_head, shaft_extension};
use crate::hough::extract_lines;
use crate::preprocess::preprocess_roi;
use crate::select::{rank_lines, SelectionContext};
use crate::state::TemporalState;

/// Primary path: edges in the ROI, Hough candidates, scored selection and
/// projection past the grip.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeLineDetection;

impl EdgeLineDetection {
    /// Grip anchor in frame pixels: the wrist center, else the centroid of
    /// all usable landmarks.
    fn hand_anchor(ctx: &FrameContext<'_>) -> Option<Point2<f32>> {
        let min_vis = ctx.params.roi.min_visibility;
        if let Some(wc) = ctx.pose.wrist_center(min_vis) {
            return Some(ctx.to_pixels(wc));
        }
        let mut sum = Vector2::zeros();
        let mut n = 0usize;
        for l in ctx.pose.visible(min_vis) {
            sum += l.position().coords;
            n += 1;
        }
        (n > 0).then(|| ctx.to_pixels(Point2::from(sum / n as f32)))
    }

    fn forearm_angle(ctx: &FrameContext<'_>) -> Option<f32> {
        ctx.pose
            .best_forearm(ctx.params.roi.min_visibility)
            .and_then(|f| f.angle_deg_px(ctx.width(), ctx.height()))
    }
}

impl DetectionStrategy for EdgeLineDetection {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::EdgeDetected
    }

    fn attempt(
        &self,
        ctx: &FrameContext<'_>,
        state: &TemporalState,
        debug: &mut DetectionDebug,
    ) -> Option<StrategyOutcome> {
        let roi = ctx.roi?;
        let params = ctx.params;

        let patch = preprocess_roi(ctx.gray, &roi, &params.preprocess);
        let edges = detect_edges(&patch, &params.edges);
        debug.edge_pixels = Some(edges.count());

        // vote around the last shaft, else around the forearm
        let forearm_angle = Self::forearm_angle(ctx);
        let angle_center = state.last_angle().or(forearm_angle);
        let candidates: Vec<(Line, u32)> = extract_lines(&edges, angle_center, &params.hough)
            .into_iter()
            .map(|c| (c.line.translated(roi.x as f32, roi.y as f32), c.votes))
            .collect();
        debug.candidates = Some(candidates.len());
        if candidates.is_empty() {
            trace!("no line candidates in {roi:?}");
            return None;
        }

        let anchor = Self::hand_anchor(ctx);
        let sel_ctx = SelectionContext {
            roi,
            frame_width: ctx.width(),
            frame_height: ctx.height(),
            wrist_center: anchor,
            forearm_angle,
            prev_angle: state.last_angle(),
            prev_midpoint: state.last_midpoint(),
        };
        let best = rank_lines(&candidates, &sel_ctx, &params.selection)
            .into_iter()
            .next()?;
        debug.best_score = Some(best.score);
        if best.score <= params.selection.min_score {
            trace!("best line score {:.3} below cutoff", best.score);
            return None;
        }

        let extension = shaft_extension(
            ctx.width(),
            ctx.height(),
            ctx.wrist_separation,
            state.calibration(),
            &params.extrapolation,
        );
        debug.extension_px = Some(extension);
        let anchor = anchor.unwrap_or_else(|| best.line.midpoint());
        let projected = extrapolate_club_head(&best.line, anchor, extension);

        Some(StrategyOutcome {
            club_head: ctx.to_normalized(projected.club_head),
            shaft_line: Some(best.line),
            confidence: params.confidence.edge_detected,
            method: DetectionMethod::EdgeDetected,
        })
    }
}
