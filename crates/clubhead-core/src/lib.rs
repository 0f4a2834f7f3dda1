//! Core types and utilities for golf club-head localization.
//!
//! This crate is intentionally small: frame buffers and grayscale images,
//! pixel-space geometry, and the pose landmarks the detector consumes. It
//! does *not* depend on any concrete pose estimator or image codec.

mod geometry;
mod image;
mod logger;
mod pose;

pub use geometry::{clip_line_to_rect, line_angle_diff_deg, normalize_angle_deg, Line, Roi};
pub use image::{to_grayscale, FrameError, FrameView, GrayImage, GrayImageView, PixelFormat};
pub use pose::{Arm, Forearm, Landmark, PoseLandmarks};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
