//! Region of interest around the hands.

use clubhead_core::{PoseLandmarks, Roi};
use nalgebra::Point2;

use crate::params::RoiParams;

/// Estimate the search region from pose landmarks and the last club head.
///
/// Returns `None` when fewer than `min_landmarks` landmarks are usable; the
/// caller then goes straight to the pose-geometry estimate. The result is
/// clamped to the frame and never empty.
pub fn estimate_roi(
    pose: &PoseLandmarks,
    last_club_head_px: Option<Point2<f32>>,
    width: usize,
    height: usize,
    params: &RoiParams,
) -> Option<Roi> {
    let points: Vec<Point2<f32>> = pose
        .visible(params.min_visibility)
        .map(|l| l.to_pixels(width, height))
        .collect();
    if points.len() < params.min_landmarks.max(1) {
        return None;
    }

    let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
    let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in &points {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }

    let max_side = width.max(height) as f32;
    let margin = params.margin_frac * max_side;
    let roi = Roi::from_bounds(
        x0 - margin,
        y0 - margin,
        x1 + margin,
        y1 + margin,
        width,
        height,
    )?;

    let half = 0.5 * params.track_window_frac * max_side;
    let window = last_club_head_px.and_then(|c| {
        Roi::from_bounds(c.x - half, c.y - half, c.x + half, c.y + half, width, height)
    });

    Some(match window {
        Some(w) => roi.union(&w),
        None => roi,
    })
}
