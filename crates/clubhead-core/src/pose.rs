//! Upper-limb pose landmarks as delivered by an external pose estimator.
//!
//! All positions are normalized to the frame (`[0, 1]` on both axes, y down);
//! conversion to pixels happens where geometry needs it.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// One pose landmark with its visibility confidence in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    #[inline]
    pub fn position(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn to_pixels(&self, width: usize, height: usize) -> Point2<f32> {
        Point2::new(self.x * width as f32, self.y * height as f32)
    }

    #[inline]
    fn is_visible(&self, min_visibility: f32) -> bool {
        self.visibility > min_visibility && self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    Left,
    Right,
}

/// Elbow-to-wrist segment of one arm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Forearm {
    pub arm: Arm,
    pub elbow: Landmark,
    pub wrist: Landmark,
}

impl Forearm {
    /// Weakest visibility of the two joints.
    #[inline]
    pub fn visibility(&self) -> f32 {
        self.elbow.visibility.min(self.wrist.visibility)
    }

    /// Elbow → wrist vector in normalized coordinates.
    #[inline]
    pub fn vector(&self) -> Vector2<f32> {
        self.wrist.position() - self.elbow.position()
    }

    /// Elbow → wrist vector in pixels of a `width × height` frame.
    #[inline]
    pub fn vector_px(&self, width: usize, height: usize) -> Vector2<f32> {
        self.wrist.to_pixels(width, height) - self.elbow.to_pixels(width, height)
    }

    /// Undirected forearm angle in pixel space, degrees in `[-90, 90)`.
    pub fn angle_deg_px(&self, width: usize, height: usize) -> Option<f32> {
        let v = self.vector_px(width, height);
        if v.norm() <= f32::EPSILON {
            return None;
        }
        Some(crate::normalize_angle_deg(v.y.atan2(v.x).to_degrees()))
    }
}

/// The subset of a body pose the club-head detector consumes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    #[serde(default)]
    pub left_wrist: Option<Landmark>,
    #[serde(default)]
    pub right_wrist: Option<Landmark>,
    #[serde(default)]
    pub left_elbow: Option<Landmark>,
    #[serde(default)]
    pub right_elbow: Option<Landmark>,
}

impl PoseLandmarks {
    /// All four landmarks in a fixed order: wrists first, then elbows.
    pub fn all(&self) -> [Option<Landmark>; 4] {
        [
            self.left_wrist,
            self.right_wrist,
            self.left_elbow,
            self.right_elbow,
        ]
    }

    /// Landmarks whose visibility exceeds `min_visibility`.
    pub fn visible(&self, min_visibility: f32) -> impl Iterator<Item = Landmark> {
        self.all()
            .into_iter()
            .flatten()
            .filter(move |l| l.is_visible(min_visibility))
    }

    fn visible_wrists(&self, min_visibility: f32) -> impl Iterator<Item = Landmark> {
        [self.left_wrist, self.right_wrist]
            .into_iter()
            .flatten()
            .filter(move |l| l.is_visible(min_visibility))
    }

    /// Mean position of the visible wrists (normalized).
    pub fn wrist_center(&self, min_visibility: f32) -> Option<Point2<f32>> {
        let mut sum = Vector2::zeros();
        let mut n = 0usize;
        for w in self.visible_wrists(min_visibility) {
            sum += w.position().coords;
            n += 1;
        }
        (n > 0).then(|| Point2::from(sum / n as f32))
    }

    /// Normalized distance between the two wrists when both are visible.
    pub fn wrist_separation(&self, min_visibility: f32) -> Option<f32> {
        let l = self.left_wrist.filter(|l| l.is_visible(min_visibility))?;
        let r = self.right_wrist.filter(|r| r.is_visible(min_visibility))?;
        Some((l.position() - r.position()).norm())
    }

    pub fn forearm(&self, arm: Arm, min_visibility: f32) -> Option<Forearm> {
        let (elbow, wrist) = match arm {
            Arm::Left => (self.left_elbow, self.left_wrist),
            Arm::Right => (self.right_elbow, self.right_wrist),
        };
        let elbow = elbow.filter(|l| l.is_visible(min_visibility))?;
        let wrist = wrist.filter(|l| l.is_visible(min_visibility))?;
        Some(Forearm { arm, elbow, wrist })
    }

    /// The better-visible forearm; the left (lead) arm wins ties.
    pub fn best_forearm(&self, min_visibility: f32) -> Option<Forearm> {
        match (
            self.forearm(Arm::Left, min_visibility),
            self.forearm(Arm::Right, min_visibility),
        ) {
            (Some(l), Some(r)) if r.visibility() > l.visibility() => Some(r),
            (Some(l), _) => Some(l),
            (None, r) => r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn address_pose() -> PoseLandmarks {
        PoseLandmarks {
            left_wrist: Some(Landmark::new(0.40, 0.60, 0.9)),
            right_wrist: Some(Landmark::new(0.60, 0.60, 0.9)),
            left_elbow: Some(Landmark::new(0.35, 0.50, 0.9)),
            right_elbow: Some(Landmark::new(0.65, 0.50, 0.9)),
        }
    }

    #[test]
    fn wrist_helpers() {
        let pose = address_pose();
        let c = pose.wrist_center(0.1).expect("center");
        assert_relative_eq!(c.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(c.y, 0.6, epsilon = 1e-6);
        assert_relative_eq!(pose.wrist_separation(0.1).expect("sep"), 0.2, epsilon = 1e-6);
        assert_eq!(pose.visible(0.1).count(), 4);
        assert_eq!(pose.visible(0.95).count(), 0);
    }

    #[test]
    fn best_forearm_prefers_visibility_then_lead_arm() {
        let mut pose = address_pose();
        assert_eq!(pose.best_forearm(0.1).map(|f| f.arm), Some(Arm::Left));
        pose.left_elbow = Some(Landmark::new(0.35, 0.50, 0.5));
        assert_eq!(pose.best_forearm(0.1).map(|f| f.arm), Some(Arm::Right));
        pose.right_wrist = None;
        assert_eq!(pose.best_forearm(0.1).map(|f| f.arm), Some(Arm::Left));
    }

    #[test]
    fn forearm_angle_uses_pixel_aspect() {
        let fa = address_pose().forearm(Arm::Left, 0.1).expect("forearm");
        let angle = fa.angle_deg_px(640, 480).expect("angle");
        assert_relative_eq!(angle, 48f32.atan2(32.0).to_degrees(), epsilon = 1e-3);
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let pose: PoseLandmarks =
            serde_json::from_str(r#"{"left_wrist":{"x":0.1,"y":0.2,"visibility":0.8}}"#)
                .expect("json");
        assert!(pose.right_wrist.is_none());
        assert_eq!(pose.visible(0.1).count(), 1);
    }
}
