#![allow(dead_code)]

use clubhead_core::{Landmark, PoseLandmarks};
use nalgebra::{Point2, Vector2};

pub const WIDTH: usize = 640;
pub const HEIGHT: usize = 480;
pub const BACKGROUND: u8 = 20;
pub const SHAFT: u8 = 230;

/// Address-like pose: hands together below the elbows, lead arm on the left.
pub fn address_pose() -> PoseLandmarks {
    PoseLandmarks {
        left_wrist: Some(Landmark::new(0.40, 0.60, 0.9)),
        right_wrist: Some(Landmark::new(0.60, 0.60, 0.9)),
        left_elbow: Some(Landmark::new(0.35, 0.50, 0.9)),
        right_elbow: Some(Landmark::new(0.65, 0.50, 0.9)),
    }
}

/// Wrist center of [`address_pose`] in pixels.
pub fn hands_px() -> Point2<f32> {
    Point2::new(0.5 * WIDTH as f32, 0.6 * HEIGHT as f32)
}

pub fn direction(angle_deg: f32) -> Vector2<f32> {
    let a = angle_deg.to_radians();
    Vector2::new(a.cos(), a.sin())
}

/// Shaft segment from the hands, `t0..t1` pixels along `angle_deg`, shifted by `offset`.
pub fn shaft(angle_deg: f32, t0: f32, t1: f32, offset: (f32, f32)) -> (Point2<f32>, Point2<f32>) {
    let d = direction(angle_deg);
    let o = Vector2::new(offset.0, offset.1);
    let g = hands_px() + o;
    (g + d * t0, g + d * t1)
}

fn distance_to_segment(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let t = ((p - a).dot(&ab) / ab.norm_squared()).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Grayscale buffer: dark background with bright segments of the given half width.
pub fn render_gray(segments: &[(Point2<f32>, Point2<f32>)], half_width: f32) -> Vec<u8> {
    let mut img = vec![BACKGROUND; WIDTH * HEIGHT];
    for &(a, b) in segments {
        let x0 = (a.x.min(b.x) - half_width - 1.0).floor().max(0.0) as usize;
        let x1 = ((a.x.max(b.x) + half_width + 1.0).ceil() as usize).min(WIDTH - 1);
        let y0 = (a.y.min(b.y) - half_width - 1.0).floor().max(0.0) as usize;
        let y1 = ((a.y.max(b.y) + half_width + 1.0).ceil() as usize).min(HEIGHT - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                if distance_to_segment(Point2::new(x as f32, y as f32), a, b) <= half_width {
                    img[y * WIDTH + x] = SHAFT;
                }
            }
        }
    }
    img
}

/// Same scene as an RGBA buffer, the layout canvas capture delivers.
pub fn render_rgba(segments: &[(Point2<f32>, Point2<f32>)], half_width: f32) -> Vec<u8> {
    render_gray(segments, half_width)
        .into_iter()
        .flat_map(|v| [v, v, v, 255])
        .collect()
}

pub fn blank_rgba() -> Vec<u8> {
    render_rgba(&[], 0.0)
}
