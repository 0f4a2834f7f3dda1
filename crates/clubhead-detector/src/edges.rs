//! Gradient edge detection: Sobel gradients, adaptive threshold and
//! non-maximum suppression along the quantized gradient direction.

use clubhead_core::GrayImage;

use crate::params::EdgeParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Binary edge mask with the size of the image it was computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeMap {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>,
}

impl EdgeMap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    #[inline]
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x]
    }

    #[inline]
    fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = true;
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&e| e).count()
    }

    /// Coordinates of all edge pixels in row-major order.
    pub fn edge_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, e)| **e)
            .map(|(i, _)| (i % self.width, i / self.width))
    }
}

/// Per-pixel Sobel gradient magnitude and direction (radians, image axes).
#[derive(Clone, Debug)]
pub struct Gradients {
    pub width: usize,
    pub height: usize,
    pub magnitude: Vec<f32>,
    pub direction: Vec<f32>,
}

impl Gradients {
    /// Magnitude at `(x, y)`; zero outside the image.
    #[inline]
    pub fn magnitude_at(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0.0;
        }
        self.magnitude[y as usize * self.width + x as usize]
    }
}

/// 3×3 Sobel gradients. The one-pixel border is left at zero.
pub fn compute_gradients(img: &GrayImage) -> Gradients {
    let (w, h) = (img.width, img.height);
    let mut magnitude = vec![0.0f32; w * h];
    let mut direction = vec![0.0f32; w * h];

    if w >= 3 && h >= 3 {
        let px = |x: usize, y: usize| img.data[y * w + x] as f32;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let gx = (px(x + 1, y - 1) + 2.0 * px(x + 1, y) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2.0 * px(x - 1, y) + px(x - 1, y + 1));
                let gy = (px(x - 1, y + 1) + 2.0 * px(x, y + 1) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2.0 * px(x, y - 1) + px(x + 1, y - 1));
                let i = y * w + x;
                magnitude[i] = (gx * gx + gy * gy).sqrt();
                direction[i] = gy.atan2(gx);
            }
        }
    }

    Gradients {
        width: w,
        height: h,
        magnitude,
        direction,
    }
}

/// Mean + `stddev_gain` · stddev over the nonzero magnitudes, clamped.
pub fn adaptive_threshold(magnitude: &[f32], params: &EdgeParams) -> f32 {
    let (mut n, mut sum, mut sum_sq) = (0usize, 0.0f64, 0.0f64);
    for &m in magnitude.iter().filter(|&&m| m > 0.0) {
        n += 1;
        sum += m as f64;
        sum_sq += (m as f64) * (m as f64);
    }
    let raw = if n == 0 {
        0.0
    } else {
        let mean = sum / n as f64;
        let var = (sum_sq / n as f64 - mean * mean).max(0.0);
        mean + params.stddev_gain as f64 * var.sqrt()
    };
    (raw as f32).clamp(params.min_threshold, params.max_threshold)
}

/// Neighbor offset along a gradient direction quantized to 0°, 45°, 90°, 135°.
#[inline]
fn quantized_step(direction: f32) -> (i64, i64) {
    let deg = direction.to_degrees().rem_euclid(180.0);
    if !(22.5..157.5).contains(&deg) {
        (1, 0)
    } else if deg < 67.5 {
        (1, 1)
    } else if deg < 112.5 {
        (0, 1)
    } else {
        (-1, 1)
    }
}

/// Keep pixels that are above `threshold` and maximal along their gradient.
///
/// Plateaus of equal magnitude keep only their last pixel along the gradient,
/// so a sharp step produces a one-pixel-wide edge.
pub fn non_max_suppression(grad: &Gradients, threshold: f32) -> EdgeMap {
    let mut edges = EdgeMap::new(grad.width, grad.height);
    for y in 0..grad.height {
        for x in 0..grad.width {
            let i = y * grad.width + x;
            let m = grad.magnitude[i];
            if m <= threshold {
                continue;
            }
            let (dx, dy) = quantized_step(grad.direction[i]);
            let (xi, yi) = (x as i64, y as i64);
            let ahead = grad.magnitude_at(xi + dx, yi + dy);
            let behind = grad.magnitude_at(xi - dx, yi - dy);
            if m > ahead && m >= behind {
                edges.set(x, y);
            }
        }
    }
    edges
}

/// Full edge stage: gradients, adaptive threshold, non-maximum suppression.
///
/// A featureless image simply yields an empty map.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, params), fields(width = img.width, height = img.height))
)]
pub fn detect_edges(img: &GrayImage, params: &EdgeParams) -> EdgeMap {
    let grad = compute_gradients(img);
    let threshold = adaptive_threshold(&grad.magnitude, params);
    non_max_suppression(&grad, threshold)
}
