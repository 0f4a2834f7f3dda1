//! Per-detector temporal state: last good detection, bounded history and
//! shaft-length calibration.

use std::collections::VecDeque;

use clubhead_core::GrayImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::params::{DetectorParams, ExtrapolationParams};

/// Running estimate of the shaft's pixel length.
///
/// The first `max_samples` edge-based detections feed an exponential moving
/// average; after that the value is frozen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShaftCalibration {
    length: Option<f32>,
    samples: usize,
    max_samples: usize,
    alpha: f32,
}

impl ShaftCalibration {
    pub fn new(params: &ExtrapolationParams) -> Self {
        Self {
            length: None,
            samples: 0,
            max_samples: params.calibration_samples,
            alpha: params.calibration_alpha,
        }
    }

    /// Feed one measured shaft length. Ignored once converged.
    ///
    /// Returns `true` if the sample was accepted.
    pub fn update(&mut self, length: f32) -> bool {
        if self.is_converged() || !length.is_finite() || length <= 0.0 {
            return false;
        }
        self.length = Some(match self.length {
            None => length,
            Some(prev) => (1.0 - self.alpha) * prev + self.alpha * length,
        });
        self.samples += 1;
        true
    }

    #[inline]
    pub fn is_converged(&self) -> bool {
        self.samples >= self.max_samples
    }

    /// Current running estimate, converged or not.
    #[inline]
    pub fn length(&self) -> Option<f32> {
        self.length
    }

    /// Calibrated length, available only after convergence.
    #[inline]
    pub fn converged_length(&self) -> Option<f32> {
        self.length.filter(|_| self.is_converged())
    }

    #[inline]
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn reset(&mut self) {
        self.length = None;
        self.samples = 0;
    }
}

/// Everything one detector carries from frame to frame.
#[derive(Clone, Debug)]
pub struct TemporalState {
    /// Last club head (normalized) from edge detection or patch tracking.
    pub(crate) last_good: Option<Point2<f32>>,
    pub(crate) history: VecDeque<Point2<f32>>,
    capacity: usize,
    pub(crate) calibration: ShaftCalibration,
    pub(crate) last_angle: Option<f32>,
    /// Midpoint of the last selected shaft line, frame pixels.
    pub(crate) last_midpoint: Option<Point2<f32>>,
    pub(crate) prev_gray: Option<GrayImage>,
}

impl TemporalState {
    pub fn new(params: &DetectorParams) -> Self {
        Self {
            last_good: None,
            history: VecDeque::with_capacity(params.history.capacity),
            capacity: params.history.capacity,
            calibration: ShaftCalibration::new(&params.extrapolation),
            last_angle: None,
            last_midpoint: None,
            prev_gray: None,
        }
    }

    #[inline]
    pub fn last_good(&self) -> Option<Point2<f32>> {
        self.last_good
    }

    /// Recent club-head positions, oldest first.
    #[inline]
    pub fn history(&self) -> &VecDeque<Point2<f32>> {
        &self.history
    }

    #[inline]
    pub fn calibration(&self) -> &ShaftCalibration {
        &self.calibration
    }

    #[inline]
    pub fn last_angle(&self) -> Option<f32> {
        self.last_angle
    }

    #[inline]
    pub fn last_midpoint(&self) -> Option<Point2<f32>> {
        self.last_midpoint
    }

    #[inline]
    pub fn prev_gray(&self) -> Option<&GrayImage> {
        self.prev_gray.as_ref()
    }

    /// Append a position, dropping the oldest beyond capacity.
    pub(crate) fn push_history(&mut self, p: Point2<f32>) {
        self.history.push_back(p);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// Forget everything, as for a freshly constructed detector.
    pub fn reset(&mut self) {
        self.last_good = None;
        self.history.clear();
        self.calibration.reset();
        self.last_angle = None;
        self.last_midpoint = None;
        self.prev_gray = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn calibration_converges_and_freezes() {
        let mut cal = ShaftCalibration::new(&ExtrapolationParams::default());
        assert!(cal.update(100.0));
        for _ in 0..18 {
            cal.update(250.0);
        }
        assert!(!cal.is_converged());
        assert!(cal.converged_length().is_none());
        cal.update(250.0);
        assert!(cal.is_converged());
        assert_eq!(cal.samples(), 20);

        let frozen = cal.length().expect("length");
        assert!(!cal.update(10.0));
        assert_eq!(cal.length(), Some(frozen));
    }

    #[test]
    fn identical_samples_converge_to_their_value() {
        let mut cal = ShaftCalibration::new(&ExtrapolationParams::default());
        for _ in 0..20 {
            cal.update(173.5);
        }
        let l = cal.converged_length().expect("converged");
        assert_relative_eq!(l, 173.5, max_relative = 0.01);
    }

    #[test]
    fn rejects_degenerate_lengths() {
        let mut cal = ShaftCalibration::new(&ExtrapolationParams::default());
        assert!(!cal.update(0.0));
        assert!(!cal.update(f32::NAN));
        assert_eq!(cal.samples(), 0);
    }

    #[test]
    fn history_is_bounded_fifo() {
        let params = DetectorParams::default();
        let mut state = TemporalState::new(&params);
        for i in 0..45 {
            state.push_history(Point2::new(i as f32 / 100.0, 0.5));
        }
        assert_eq!(state.history().len(), 30);
        assert_relative_eq!(state.history()[0].x, 0.15);
        assert_relative_eq!(state.history()[29].x, 0.44);
    }

    #[test]
    fn reset_clears_everything() {
        let params = DetectorParams::default();
        let mut state = TemporalState::new(&params);
        state.push_history(Point2::new(0.2, 0.3));
        state.last_good = Some(Point2::new(0.2, 0.3));
        state.last_angle = Some(45.0);
        state.last_midpoint = Some(Point2::new(10.0, 10.0));
        state.calibration.update(120.0);
        state.prev_gray = Some(GrayImage::new(4, 4));

        state.reset();
        assert!(state.history().is_empty());
        assert!(state.last_good().is_none());
        assert!(state.last_angle().is_none());
        assert!(state.last_midpoint().is_none());
        assert!(state.prev_gray().is_none());
        assert_eq!(state.calibration().samples(), 0);
    }
}
