//! Frame-to-frame patch tracking by normalized cross-correlation.

use clubhead_core::GrayImage;
use log::trace;
use nalgebra::Point2;

use super::{DetectionStrategy, FrameContext, StrategyOutcome};
use crate::detector::{DetectionDebug, DetectionMethod};
use crate::params::TrackingParams;
use crate::state::TemporalState;

/// Best match of the tracked patch in the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchMatch {
    /// Patch center in the current frame, pixels.
    pub center: Point2<i64>,
    pub score: f32,
}

/// Normalized cross-correlation of two equally sized `side × side` windows.
///
/// Returns 0 when either window is flat or leaves its image.
pub fn ncc(
    a: &GrayImage,
    a_center: Point2<i64>,
    b: &GrayImage,
    b_center: Point2<i64>,
    side: usize,
) -> f32 {
    let half = (side / 2) as i64;
    let n = (side * side) as f64;
    let mut va = Vec::with_capacity(side * side);
    let mut vb = Vec::with_capacity(side * side);
    for dy in -half..=half {
        for dx in -half..=half {
            let (Some(pa), Some(pb)) = (
                a.get(a_center.x + dx, a_center.y + dy),
                b.get(b_center.x + dx, b_center.y + dy),
            ) else {
                return 0.0;
            };
            va.push(pa as f64);
            vb.push(pb as f64);
        }
    }
    let ma = va.iter().sum::<f64>() / n;
    let mb = vb.iter().sum::<f64>() / n;
    let (mut cov, mut sa, mut sb) = (0.0, 0.0, 0.0);
    for (x, y) in va.iter().zip(&vb) {
        let (da, db) = (x - ma, y - mb);
        cov += da * db;
        sa += da * da;
        sb += db * db;
    }
    let denom = (sa * sb).sqrt();
    if denom < 1e-9 {
        return 0.0;
    }
    (cov / denom) as f32
}

/// Search the current frame around `center` for the patch taken from the
/// previous frame at the same place.
///
/// Offsets are scanned on a `search_stride` grid within `search_radius`; the
/// first strictly best score wins.
pub fn track_patch(
    prev: &GrayImage,
    cur: &GrayImage,
    center: Point2<i64>,
    params: &TrackingParams,
) -> Option<PatchMatch> {
    let side = params.patch_size;
    let half = (side / 2) as i64;
    let inside = |img: &GrayImage, c: Point2<i64>| {
        c.x - half >= 0
            && c.y - half >= 0
            && c.x + half < img.width as i64
            && c.y + half < img.height as i64
    };
    if !inside(prev, center) {
        return None;
    }

    let r = params.search_radius.max(0);
    let stride = params.search_stride.max(1);
    let mut best: Option<PatchMatch> = None;
    for dy in (-r..=r).step_by(stride) {
        for dx in (-r..=r).step_by(stride) {
            let c = Point2::new(center.x + dx, center.y + dy);
            if !inside(cur, c) {
                continue;
            }
            let score = ncc(prev, center, cur, c, side);
            if best.is_none_or(|b| score > b.score) {
                best = Some(PatchMatch { center: c, score });
            }
        }
    }
    best
}

/// Follow the last good club head into the current frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatchTracking;

impl DetectionStrategy for PatchTracking {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::OpticalFlow
    }

    fn attempt(
        &self,
        ctx: &FrameContext<'_>,
        state: &TemporalState,
        debug: &mut DetectionDebug,
    ) -> Option<StrategyOutcome> {
        let last = state.last_good()?;
        let prev = state.prev_gray()?;
        if (prev.width, prev.height) != (ctx.width(), ctx.height()) {
            return None;
        }

        let p = ctx.to_pixels(last);
        let center = Point2::new(p.x.round() as i64, p.y.round() as i64);
        let found = track_patch(prev, ctx.gray, center, &ctx.params.tracking)?;
        debug.ncc_score = Some(found.score);
        if found.score < ctx.params.tracking.min_ncc {
            trace!("patch ncc {:.3} below cutoff", found.score);
            return None;
        }

        let px = Point2::new(found.center.x as f32, found.center.y as f32);
        Some(StrategyOutcome {
            club_head: ctx.to_normalized(px),
            shaft_line: None,
            confidence: ctx.params.confidence.optical_flow,
            method: DetectionMethod::OpticalFlow,
        })
    }
}
