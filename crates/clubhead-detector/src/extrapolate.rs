//! Club-head projection beyond the grip end of the shaft line.

use clubhead_core::Line;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::params::ExtrapolationParams;
use crate::state::ShaftCalibration;

/// Where and how far the club head was projected. Frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extrapolation {
    pub grip: Point2<f32>,
    pub direction: Vector2<f32>,
    pub extension: f32,
    pub club_head: Point2<f32>,
}

/// Projection length in pixels.
///
/// Baseline is `base_length_frac · S + wrist_separation_gain · sep · S` with
/// `S` the larger frame side and `sep` the normalized wrist separation. A
/// converged calibration overrides it with `calibrated_scale · L`, capped at
/// `max_length_frac · S`.
pub fn shaft_extension(
    frame_width: usize,
    frame_height: usize,
    wrist_separation: f32,
    calibration: &ShaftCalibration,
    params: &ExtrapolationParams,
) -> f32 {
    let s = frame_width.max(frame_height) as f32;
    match calibration.converged_length() {
        Some(len) => (params.calibrated_scale * len).min(params.max_length_frac * s),
        None => {
            let sep = if wrist_separation.is_finite() {
                wrist_separation.max(0.0)
            } else {
                0.0
            };
            params.base_length_frac * s + params.wrist_separation_gain * sep * s
        }
    }
}

/// Project the club head from the endpoint nearest `anchor` (the grip end)
/// through the other endpoint, `extension` pixels from the grip.
///
/// A degenerate line falls back to a downward direction.
pub fn extrapolate_club_head(line: &Line, anchor: Point2<f32>, extension: f32) -> Extrapolation {
    let (a, b) = (line.start(), line.end());
    let (grip, tip) = if (a - anchor).norm() <= (b - anchor).norm() {
        (a, b)
    } else {
        (b, a)
    };
    let d = tip - grip;
    let n = d.norm();
    let direction = if n > f32::EPSILON {
        d / n
    } else {
        Vector2::new(0.0, 1.0)
    };
    Extrapolation {
        grip,
        direction,
        extension,
        club_head: grip + direction * extension,
    }
}
