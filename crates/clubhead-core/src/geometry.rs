//! Pixel-space geometry: rectangles, line segments and undirected angles.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Integer pixel rectangle `[x, x + w) × [y, y + h)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Roi {
    /// Build a rectangle from float bounds, clamped to a `frame_w × frame_h` frame.
    ///
    /// Returns `None` when nothing of the rectangle remains inside the frame.
    pub fn from_bounds(
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        frame_w: usize,
        frame_h: usize,
    ) -> Option<Self> {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return None;
        }
        let cx0 = x0.floor().clamp(0.0, frame_w as f32) as usize;
        let cy0 = y0.floor().clamp(0.0, frame_h as f32) as usize;
        let cx1 = x1.ceil().clamp(0.0, frame_w as f32) as usize;
        let cy1 = y1.ceil().clamp(0.0, frame_h as f32) as usize;
        if cx1 <= cx0 || cy1 <= cy0 {
            return None;
        }
        Some(Self {
            x: cx0,
            y: cy0,
            w: cx1 - cx0,
            h: cy1 - cy0,
        })
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> usize {
        self.y + self.h
    }

    #[inline]
    pub fn min_side(&self) -> usize {
        self.w.min(self.h)
    }

    #[inline]
    pub fn diagonal(&self) -> f32 {
        ((self.w * self.w + self.h * self.h) as f32).sqrt()
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Roi) -> Roi {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Roi {
            x,
            y,
            w: self.right().max(other.right()) - x,
            h: self.bottom().max(other.bottom()) - y,
        }
    }

    #[inline]
    pub fn contains(&self, p: Point2<f32>) -> bool {
        p.x >= self.x as f32
            && p.y >= self.y as f32
            && p.x < self.right() as f32
            && p.y < self.bottom() as f32
    }

    #[inline]
    pub fn is_within(&self, frame_w: usize, frame_h: usize) -> bool {
        self.right() <= frame_w && self.bottom() <= frame_h
    }
}

/// Pixel-space line segment with its angle (degrees, `[-90, 90)`) and length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub angle: f32,
    pub length: f32,
}

impl Line {
    pub fn from_points(a: Point2<f32>, b: Point2<f32>) -> Self {
        let d = b - a;
        Self {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
            angle: normalize_angle_deg(d.y.atan2(d.x).to_degrees()),
            length: d.norm(),
        }
    }

    #[inline]
    pub fn start(&self) -> Point2<f32> {
        Point2::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point2<f32> {
        Point2::new(self.x2, self.y2)
    }

    #[inline]
    pub fn midpoint(&self) -> Point2<f32> {
        Point2::new(0.5 * (self.x1 + self.x2), 0.5 * (self.y1 + self.y2))
    }

    /// Unit vector from `start` to `end`; zero for a degenerate segment.
    pub fn direction(&self) -> Vector2<f32> {
        let d = self.end() - self.start();
        let n = d.norm();
        if n <= f32::EPSILON {
            Vector2::zeros()
        } else {
            d / n
        }
    }

    /// Perpendicular distance from `p` to the infinite line through the segment.
    pub fn distance_to_point(&self, p: Point2<f32>) -> f32 {
        let d = self.direction();
        let v = p - self.start();
        if d == Vector2::zeros() {
            return v.norm();
        }
        (v.x * d.y - v.y * d.x).abs()
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Line {
        Line {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
            ..*self
        }
    }
}

/// Wrap an undirected line angle into `[-90, 90)` degrees.
#[inline]
pub fn normalize_angle_deg(a: f32) -> f32 {
    let r = (a + 90.0).rem_euclid(180.0) - 90.0;
    // rem_euclid can round up to exactly 180 for tiny negative inputs
    if r >= 90.0 {
        r - 180.0
    } else {
        r
    }
}

/// Smallest difference between two undirected line angles, in `[0, 90]` degrees.
#[inline]
pub fn line_angle_diff_deg(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(180.0);
    d.min(180.0 - d)
}

/// Clip the infinite line `p + t * dir` to the rectangle `[x0, x1] × [y0, y1]`.
///
/// Returns the entry and exit points, ordered along `dir`.
pub fn clip_line_to_rect(
    p: Point2<f32>,
    dir: Vector2<f32>,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
) -> Option<(Point2<f32>, Point2<f32>)> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for (pc, dc, lo, hi) in [(p.x, dir.x, x0, x1), (p.y, dir.y, y0, y1)] {
        if dc.abs() <= 1e-9 {
            if pc < lo || pc > hi {
                return None;
            }
            continue;
        }
        let ta = (lo - pc) / dc;
        let tb = (hi - pc) / dc;
        t_min = t_min.max(ta.min(tb));
        t_max = t_max.min(ta.max(tb));
    }
    if !t_min.is_finite() || !t_max.is_finite() || t_max < t_min {
        return None;
    }
    Some((p + dir * t_min, p + dir * t_max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn angles_wrap_into_half_open_range() {
        assert_relative_eq!(normalize_angle_deg(50.0), 50.0);
        assert_relative_eq!(normalize_angle_deg(-130.0), 50.0);
        assert_relative_eq!(normalize_angle_deg(90.0), -90.0);
        assert_relative_eq!(normalize_angle_deg(270.0), -90.0);
        assert_relative_eq!(line_angle_diff_deg(85.0, -85.0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(line_angle_diff_deg(10.0, 40.0), 30.0, epsilon = 1e-4);
    }

    #[test]
    fn line_metrics() {
        let line = Line::from_points(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert_relative_eq!(line.length, 5.0);
        assert_relative_eq!(line.angle, 4f32.atan2(3.0).to_degrees());
        assert_relative_eq!(line.distance_to_point(Point2::new(4.0, -3.0)), 5.0, epsilon = 1e-5);
        let reversed = Line::from_points(line.end(), line.start());
        assert_relative_eq!(reversed.angle, line.angle, epsilon = 1e-4);
    }

    #[test]
    fn roi_from_bounds_clamps() {
        let roi = Roi::from_bounds(-10.0, 5.5, 700.0, 20.0, 640, 480).expect("roi");
        assert_eq!(
            roi,
            Roi {
                x: 0,
                y: 5,
                w: 640,
                h: 15
            }
        );
        assert!(Roi::from_bounds(650.0, 0.0, 700.0, 10.0, 640, 480).is_none());
        let u = roi.union(&Roi {
            x: 10,
            y: 100,
            w: 5,
            h: 5,
        });
        assert_eq!((u.y, u.bottom()), (5, 105));
    }

    #[test]
    fn clipping_a_diagonal() {
        let (a, b) = clip_line_to_rect(
            Point2::new(5.0, 5.0),
            Vector2::new(1.0, 1.0).normalize(),
            0.0,
            0.0,
            10.0,
            20.0,
        )
        .expect("clip");
        assert_relative_eq!(a.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(a.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(b.x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(b.y, 10.0, epsilon = 1e-4);
        assert!(clip_line_to_rect(
            Point2::new(50.0, 5.0),
            Vector2::new(0.0, 1.0),
            0.0,
            0.0,
            10.0,
            10.0
        )
        .is_none());
    }
}
