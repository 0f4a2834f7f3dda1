use clubhead_core::{to_grayscale, FrameView, GrayImage, PoseLandmarks};
use log::debug;
use nalgebra::Point2;

use super::{DetectError, DetectionDebug, DetectionMethod, DetectionResult};
use crate::params::DetectorParams;
use crate::roi::estimate_roi;
use crate::state::{ShaftCalibration, TemporalState};
use crate::strategy::{
    default_chain, FrameContext, PoseGeometryFallback, StrategyChain, StrategyOutcome,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Stateful per-stream club-head detector.
///
/// One instance follows one ordered sequence of frames. Call
/// [`init`](Self::init) before the first frame and whenever the frame size
/// changes; [`reset`](Self::reset) starts a new clip at the same size.
pub struct ClubHeadDetector {
    params: DetectorParams,
    frame_size: Option<(usize, usize)>,
    state: TemporalState,
    chain: StrategyChain,
    terminal: PoseGeometryFallback,
}

impl ClubHeadDetector {
    /// Create a detector with the default strategy chain.
    pub fn new(params: DetectorParams) -> Result<Self, DetectError> {
        params.validate()?;
        let state = TemporalState::new(&params);
        Ok(Self {
            params,
            frame_size: None,
            state,
            chain: default_chain(),
            terminal: PoseGeometryFallback,
        })
    }

    /// Replace the fallible part of the chain. The pose-geometry estimate
    /// always stays last.
    pub fn with_chain(mut self, chain: StrategyChain) -> Self {
        self.chain = chain;
        self
    }

    /// Set the frame size. A size change drops all temporal state.
    pub fn init(&mut self, width: usize, height: usize) -> Result<(), DetectError> {
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidFrameSize { width, height });
        }
        if self.frame_size != Some((width, height)) {
            if self.frame_size.is_some() {
                debug!("frame size changed to {width}x{height}, resetting state");
            }
            self.state.reset();
        }
        self.frame_size = Some((width, height));
        Ok(())
    }

    /// Forget history, calibration and the last detection.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    #[inline]
    pub fn frame_size(&self) -> Option<(usize, usize)> {
        self.frame_size
    }

    #[inline]
    pub fn state(&self) -> &TemporalState {
        &self.state
    }

    /// Recent club-head positions (normalized), oldest first.
    pub fn history(&self) -> Vec<Point2<f32>> {
        self.state.history().iter().copied().collect()
    }

    #[inline]
    pub fn calibration(&self) -> &ShaftCalibration {
        self.state.calibration()
    }

    /// Locate the club head in one frame.
    ///
    /// `wrist_separation` is the normalized distance between the wrists.
    /// Errors only on misuse; every frame otherwise yields a result.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = frame.width(), height = frame.height()))
    )]
    pub fn detect(
        &mut self,
        frame: &FrameView<'_>,
        pose: &PoseLandmarks,
        wrist_separation: f32,
    ) -> Result<DetectionResult, DetectError> {
        self.check_size(frame.width(), frame.height())?;
        self.detect_gray(to_grayscale(frame), pose, wrist_separation)
    }

    /// Same as [`detect`](Self::detect) for a frame already in grayscale.
    pub fn detect_gray(
        &mut self,
        gray: GrayImage,
        pose: &PoseLandmarks,
        wrist_separation: f32,
    ) -> Result<DetectionResult, DetectError> {
        let (w, h) = self.check_size(gray.width, gray.height)?;
        let wrist_separation = if wrist_separation.is_finite() {
            wrist_separation.max(0.0)
        } else {
            0.0
        };

        let mut debug = DetectionDebug::default();
        let last_px = self
            .state
            .last_good()
            .map(|p| Point2::new(p.x * w as f32, p.y * h as f32));
        let roi = estimate_roi(pose, last_px, w, h, &self.params.roi);
        debug.roi = roi;

        let outcome = {
            let ctx = FrameContext {
                gray: &gray,
                pose,
                wrist_separation,
                roi,
                params: &self.params,
            };
            let found = if roi.is_some() {
                self.chain.iter().find_map(|s| {
                    debug.attempted.push(s.method());
                    s.attempt(&ctx, &self.state, &mut debug)
                })
            } else {
                None
            };
            found.unwrap_or_else(|| {
                debug.attempted.push(DetectionMethod::PoseFallback);
                self.terminal.estimate(&ctx)
            })
        };

        let result = DetectionResult {
            club_head: Point2::new(
                sanitize_unit(outcome.club_head.x),
                sanitize_unit(outcome.club_head.y),
            ),
            shaft_line: outcome.shaft_line,
            confidence: outcome.confidence.clamp(0.0, 1.0),
            method: outcome.method,
            debug,
        };
        self.commit(&outcome, result.club_head, gray);

        debug!(
            "club head ({:.3}, {:.3}) via {} conf={:.2}",
            result.club_head.x, result.club_head.y, result.method, result.confidence
        );
        Ok(result)
    }

    fn check_size(&self, width: usize, height: usize) -> Result<(usize, usize), DetectError> {
        let expected = self.frame_size.ok_or(DetectError::NotInitialized)?;
        if expected != (width, height) {
            return Err(DetectError::FrameSizeMismatch {
                expected,
                got: (width, height),
            });
        }
        Ok(expected)
    }

    /// Carry this frame's outcome into the temporal state.
    fn commit(&mut self, outcome: &StrategyOutcome, club_head: Point2<f32>, gray: GrayImage) {
        let state = &mut self.state;
        match outcome.method {
            DetectionMethod::EdgeDetected => {
                state.last_good = Some(club_head);
                state.push_history(club_head);
                if let Some(line) = outcome.shaft_line {
                    state.last_angle = Some(line.angle);
                    state.last_midpoint = Some(line.midpoint());
                    state.calibration.update(line.length);
                }
            }
            DetectionMethod::OpticalFlow => {
                state.last_good = Some(club_head);
                state.push_history(club_head);
            }
            DetectionMethod::Interpolated => state.push_history(club_head),
            DetectionMethod::PoseFallback => {}
        }
        state.prev_gray = Some(gray);
    }
}

/// Clamp to `[0, 1]`; non-finite values land on the center.
#[inline]
fn sanitize_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.5
    }
}
