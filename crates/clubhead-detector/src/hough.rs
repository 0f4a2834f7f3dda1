//! Hough-style line voting over a binary edge map.
//!
//! Lines are parametrized by their *direction* angle φ ∈ [-90°, 90°) and the
//! signed distance ρ = -x·sin φ + y·cos φ of the line from the ROI origin.
//! Working with the direction (rather than the normal) lets the angle band
//! around the previous shaft or the forearm be applied directly.

use clubhead_core::{clip_line_to_rect, line_angle_diff_deg, Line};
use log::trace;
use nalgebra::{Point2, Vector2};

use crate::edges::EdgeMap;
use crate::params::HoughParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Candidate shaft line in ROI-local pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineCandidate {
    pub line: Line,
    pub votes: u32,
}

struct Accumulator {
    votes: Vec<u32>,
    angles_deg: Vec<f32>,
    trig: Vec<(f32, f32)>, // (sin, cos) per angle bin
    rho_bins: usize,
    max_rho: f32,
    rho_res: f32,
}

impl Accumulator {
    fn new(angles_deg: Vec<f32>, max_rho: f32, rho_res: f32) -> Self {
        let rho_bins = (2.0 * max_rho / rho_res).ceil() as usize + 1;
        let trig = angles_deg
            .iter()
            .map(|a| a.to_radians().sin_cos())
            .collect();
        Self {
            votes: vec![0; rho_bins * angles_deg.len()],
            angles_deg,
            trig,
            rho_bins,
            max_rho,
            rho_res,
        }
    }

    #[inline]
    fn rho_index(&self, rho: f32) -> usize {
        let idx = ((rho + self.max_rho) / self.rho_res).round() as i64;
        idx.clamp(0, self.rho_bins as i64 - 1) as usize
    }

    #[inline]
    fn rho_value(&self, idx: usize) -> f32 {
        idx as f32 * self.rho_res - self.max_rho
    }

    #[inline]
    fn get(&self, a: i64, r: i64) -> u32 {
        if a < 0 || r < 0 || a >= self.angles_deg.len() as i64 || r >= self.rho_bins as i64 {
            return 0;
        }
        self.votes[a as usize * self.rho_bins + r as usize]
    }

    fn vote(&mut self, x: f32, y: f32) {
        for a in 0..self.trig.len() {
            let (s, c) = self.trig[a];
            let r = self.rho_index(-x * s + y * c);
            let i = a * self.rho_bins + r;
            self.votes[i] = self.votes[i].saturating_add(1);
        }
    }

    /// Cells at or above `threshold` that dominate their 3×3 neighbourhood,
    /// strongest first.
    fn local_maxima(&self, threshold: f32) -> Vec<(usize, usize, u32)> {
        let mut peaks = Vec::new();
        for a in 0..self.angles_deg.len() {
            for r in 0..self.rho_bins {
                let v = self.votes[a * self.rho_bins + r];
                if v == 0 || (v as f32) < threshold {
                    continue;
                }
                let (ai, ri) = (a as i64, r as i64);
                let dominated = (-1..=1)
                    .flat_map(|da| (-1..=1).map(move |dr| (da, dr)))
                    .filter(|&(da, dr)| da != 0 || dr != 0)
                    .any(|(da, dr)| self.get(ai + da, ri + dr) > v);
                if !dominated {
                    peaks.push((a, r, v));
                }
            }
        }
        peaks.sort_by(|p, q| q.2.cmp(&p.2).then(p.0.cmp(&q.0)).then(p.1.cmp(&q.1)));
        peaks
    }
}

/// Angle bin centers over [-90°, 90°), optionally restricted to a band.
fn voting_angles(params: &HoughParams, angle_center: Option<f32>) -> Vec<f32> {
    let n = params.angle_bins.max(1);
    let step = 180.0 / n as f32;
    (0..n)
        .map(|i| -90.0 + i as f32 * step)
        .filter(|&a| match angle_center {
            Some(c) => line_angle_diff_deg(a, c) <= params.angle_band_deg,
            None => true,
        })
        .collect()
}

/// Vote threshold: `max(min_votes, votes_frac · min(width, height))`.
pub fn vote_threshold(width: usize, height: usize, params: &HoughParams) -> f32 {
    (params.min_votes as f32).max(params.votes_frac * width.min(height) as f32)
}

/// Extract ranked line candidates from an edge map.
///
/// When `angle_center` is given (degrees), only directions within
/// `angle_band_deg` of it are voted. Each peak is turned into the segment
/// spanned by its supporting edge pixels, clipped to the map bounds.
/// Candidates are ranked by votes, ties broken by position.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(edges, params), fields(width = edges.width, height = edges.height))
)]
pub fn extract_lines(
    edges: &EdgeMap,
    angle_center: Option<f32>,
    params: &HoughParams,
) -> Vec<LineCandidate> {
    let pixels: Vec<(f32, f32)> = edges
        .edge_pixels()
        .map(|(x, y)| (x as f32, y as f32))
        .collect();
    if pixels.len() < 2 || edges.width == 0 || edges.height == 0 {
        return Vec::new();
    }

    let angles = voting_angles(params, angle_center);
    if angles.is_empty() {
        return Vec::new();
    }
    let max_rho = ((edges.width * edges.width + edges.height * edges.height) as f32).sqrt();
    let mut acc = Accumulator::new(angles, max_rho, params.rho_resolution);
    for &(x, y) in &pixels {
        acc.vote(x, y);
    }

    let threshold = vote_threshold(edges.width, edges.height, params);
    let peaks = acc.local_maxima(threshold);
    trace!(
        "{} edge pixels, {} peaks above {threshold:.1} votes",
        pixels.len(),
        peaks.len()
    );

    let mut kept: Vec<(f32, f32)> = Vec::new(); // (angle, rho) of accepted peaks
    let mut out = Vec::new();
    for (a, r, votes) in peaks {
        if out.len() >= params.max_candidates {
            break;
        }
        let angle = acc.angles_deg[a];
        let rho = acc.rho_value(r);
        let close = kept.iter().any(|&(ka, kr)| {
            line_angle_diff_deg(ka, angle) < params.peak_min_angle_sep_deg
                && (kr - rho).abs() < params.peak_min_rho_sep
        });
        if close {
            continue;
        }
        let (s, c) = acc.trig[a];
        if let Some(line) = peak_segment(
            &pixels,
            s,
            c,
            rho,
            edges.width,
            edges.height,
            params.inlier_tolerance_px,
        ) {
            kept.push((angle, rho));
            out.push(LineCandidate { line, votes });
        }
    }

    out.sort_by(|p, q| {
        q.votes.cmp(&p.votes).then_with(|| {
            let (mp, mq) = (p.line.midpoint(), q.line.midpoint());
            mp.y.total_cmp(&mq.y).then(mp.x.total_cmp(&mq.x))
        })
    });
    out
}

/// Segment of the peak line covered by its supporting pixels.
///
/// Falls back to the full chord through the map when fewer than two pixels
/// lie within `tolerance` of the line.
fn peak_segment(
    pixels: &[(f32, f32)],
    sin: f32,
    cos: f32,
    rho: f32,
    width: usize,
    height: usize,
    tolerance: f32,
) -> Option<Line> {
    let dir = Vector2::new(cos, sin);
    let origin = Point2::new(-rho * sin, rho * cos);
    let (chord_a, chord_b) = clip_line_to_rect(
        origin,
        dir,
        0.0,
        0.0,
        (width - 1) as f32,
        (height - 1) as f32,
    )?;
    let t_lo = (chord_a - origin).dot(&dir);
    let t_hi = (chord_b - origin).dot(&dir);

    let mut t_min = f32::INFINITY;
    let mut t_max = f32::NEG_INFINITY;
    let mut support = 0usize;
    for &(x, y) in pixels {
        if (-x * sin + y * cos - rho).abs() > tolerance {
            continue;
        }
        let t = (Point2::new(x, y) - origin).dot(&dir);
        t_min = t_min.min(t);
        t_max = t_max.max(t);
        support += 1;
    }

    let (t0, t1) = if support >= 2 && t_max > t_min {
        (t_min.max(t_lo), t_max.min(t_hi))
    } else {
        (t_lo, t_hi)
    };
    if t1 <= t0 {
        return None;
    }
    Some(Line::from_points(origin + dir * t0, origin + dir * t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_map(w: usize, h: usize, a: (f32, f32), b: (f32, f32)) -> EdgeMap {
        let mut map = EdgeMap::new(w, h);
        let n = ((b.0 - a.0).abs().max((b.1 - a.1).abs())).ceil() as usize;
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let x = (a.0 + t * (b.0 - a.0)).round() as usize;
            let y = (a.1 + t * (b.1 - a.1)).round() as usize;
            map.data[y * w + x] = true;
        }
        map
    }

    #[test]
    fn empty_map_has_no_candidates() {
        let map = EdgeMap::new(50, 40);
        assert!(extract_lines(&map, None, &HoughParams::default()).is_empty());
    }

    #[test]
    fn finds_a_diagonal_with_its_extent() {
        let map = line_map(120, 100, (10.0, 10.0), (90.0, 90.0));
        let cands = extract_lines(&map, None, &HoughParams::default());
        assert!(!cands.is_empty());
        let best = cands[0].line;
        assert!((best.angle - 45.0).abs() <= 1.0, "angle {}", best.angle);
        assert!((best.length - 80.0 * 2f32.sqrt()).abs() < 4.0, "len {}", best.length);
        assert!(cands[0].votes >= 70);
    }

    #[test]
    fn angle_band_excludes_other_directions() {
        let map = line_map(120, 100, (5.0, 50.0), (115.0, 50.0));
        let params = HoughParams::default();
        assert!(!extract_lines(&map, Some(0.0), &params).is_empty());
        assert!(extract_lines(&map, Some(60.0), &params).is_empty());
    }

    #[test]
    fn short_segments_stay_below_threshold() {
        let map = line_map(200, 200, (20.0, 20.0), (35.0, 20.0));
        assert!((vote_threshold(200, 200, &HoughParams::default()) - 30.0).abs() < 1e-3);
        assert!(extract_lines(&map, None, &HoughParams::default()).is_empty());
    }

    #[test]
    fn candidate_count_is_capped() {
        let mut map = EdgeMap::new(200, 200);
        for k in 0..25 {
            let x = 5 + k * 7;
            for y in 5..195 {
                map.data[y * 200 + x] = true;
            }
        }
        let params = HoughParams::default();
        let cands = extract_lines(&map, None, &params);
        assert_eq!(cands.len(), params.max_candidates);
        for c in &cands {
            assert!(c.line.angle.abs() >= 89.0, "angle {}", c.line.angle);
        }
    }
}
