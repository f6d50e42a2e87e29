//! Geometric utilities shared by the sequence and single-frame analyses.

use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::{Landmarks, PoseLandmark, Position3D};

/// Margin added around the ankles when building the base of support
pub const SUPPORT_MARGIN: f64 = 0.05;

/// Landmark count needed for both ankles
pub const MIN_SUPPORT_LANDMARKS: usize = 29;

/// Landmark count needed for both hips
pub const MIN_SPINE_LANDMARKS: usize = 25;

/// Landmark count needed for both wrists
pub const MIN_ARM_LANDMARKS: usize = 17;

/// Axis-aligned bounding box in the image plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2D {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl BoundingBox2D {
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point2<f64>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            min: Point2::new(min_x, min_y),
            max: Point2::new(max_x, max_y),
        })
    }

    /// Grow the box by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Unweighted mean of the torso landmarks projected to the image plane.
///
/// Falls back to the image center when no torso landmark is present.
pub fn center_of_mass_2d(landmarks: &Landmarks) -> Point2<f64> {
    let points: Vec<Point2<f64>> = PoseLandmark::TORSO
        .iter()
        .filter_map(|&lm| landmarks.get(lm))
        .map(|l| l.point2())
        .collect();

    if points.is_empty() {
        return Point2::new(0.5, 0.5);
    }

    let n = points.len() as f64;
    Point2::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    )
}

/// Torso centroid including depth, origin when no torso landmark is present
pub fn center_of_mass_3d(landmarks: &Landmarks) -> Position3D {
    let points: Vec<Position3D> = PoseLandmark::TORSO
        .iter()
        .filter_map(|&lm| landmarks.position(lm))
        .collect();

    if points.is_empty() {
        return Position3D::origin();
    }

    let n = points.len() as f64;
    Position3D::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
        points.iter().map(|p| p.z).sum::<f64>() / n,
    )
}

/// Ankle bounding box grown by [`SUPPORT_MARGIN`].
///
/// Frames without both ankles get a fixed box around the lower image center.
pub fn base_of_support(landmarks: &Landmarks) -> BoundingBox2D {
    let ankles = (
        landmarks.get(PoseLandmark::LeftAnkle),
        landmarks.get(PoseLandmark::RightAnkle),
    );

    match ankles {
        (Some(left), Some(right)) if landmarks.len() >= MIN_SUPPORT_LANDMARKS => {
            BoundingBox2D::from_points(&[left.point2(), right.point2()])
                .map(|b| b.expanded(SUPPORT_MARGIN))
                .unwrap_or_else(default_support)
        }
        _ => default_support(),
    }
}

fn default_support() -> BoundingBox2D {
    BoundingBox2D::new(Point2::new(0.4, 0.8), Point2::new(0.6, 0.9))
}

/// Center of mass inside the base of support
pub fn is_balanced(landmarks: &Landmarks) -> bool {
    base_of_support(landmarks).contains(&center_of_mass_2d(landmarks))
}

fn midpoint(landmarks: &Landmarks, a: PoseLandmark, b: PoseLandmark) -> Option<Point2<f64>> {
    let pa = landmarks.get(a)?;
    let pb = landmarks.get(b)?;
    Some(Point2::new((pa.x + pb.x) / 2.0, (pa.y + pb.y) / 2.0))
}

/// Torso angle against the image horizontal in degrees; 90 means upright.
///
/// Uses the mid-hip to mid-shoulder vector. Lists too short to hold both
/// hips, and a collapsed torso, read as upright.
pub fn spine_angle(landmarks: &Landmarks) -> f64 {
    if landmarks.len() < MIN_SPINE_LANDMARKS {
        return 90.0;
    }

    let (Some(shoulders), Some(hips)) = (
        midpoint(landmarks, PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
        midpoint(landmarks, PoseLandmark::LeftHip, PoseLandmark::RightHip),
    ) else {
        return 90.0;
    };

    let dx = (shoulders.x - hips.x).abs();
    let dy = (shoulders.y - hips.y).abs();
    if dx < 1e-12 && dy < 1e-12 {
        return 90.0;
    }

    dy.atan2(dx).to_degrees()
}

/// Lean of the torso away from vertical, in degrees
pub fn spine_deviation(landmarks: &Landmarks) -> f64 {
    (spine_angle(landmarks) - 90.0).abs()
}

/// Cosine similarity between the left arm and the mirrored right arm.
///
/// Arms are taken as shoulder-to-wrist vectors; the right one is mirrored
/// across the vertical axis. Negative similarity floors at zero.
pub fn arm_symmetry(landmarks: &Landmarks) -> f64 {
    if landmarks.len() < MIN_ARM_LANDMARKS {
        return 0.0;
    }

    let arm = |shoulder: PoseLandmark, wrist: PoseLandmark| -> Option<Vector3<f64>> {
        let s = landmarks.position(shoulder)?;
        let w = landmarks.position(wrist)?;
        Some(s.vector_to(&w))
    };

    let (Some(left), Some(mut right)) = (
        arm(PoseLandmark::LeftShoulder, PoseLandmark::LeftWrist),
        arm(PoseLandmark::RightShoulder, PoseLandmark::RightWrist),
    ) else {
        return 0.0;
    };
    right.x = -right.x;

    cosine_similarity(&left, &right).max(0.0)
}

/// Cosine similarity, zero when either vector is degenerate
pub fn cosine_similarity(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    let norms = v1.norm() * v2.norm();
    if norms < 1e-10 {
        0.0
    } else {
        (v1.dot(v2) / norms).clamp(-1.0, 1.0)
    }
}

/// Ankle width relative to shoulder width
pub fn stance_width_ratio(landmarks: &Landmarks) -> f64 {
    if landmarks.len() < MIN_SUPPORT_LANDMARKS {
        return 1.0;
    }

    let width = |a: PoseLandmark, b: PoseLandmark| -> Option<f64> {
        Some((landmarks.get(a)?.x - landmarks.get(b)?.x).abs())
    };

    match (
        width(PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
        width(PoseLandmark::LeftAnkle, PoseLandmark::RightAnkle),
    ) {
        (Some(shoulders), Some(ankles)) if shoulders > 0.0 => ankles / shoulders,
        _ => 1.0,
    }
}

/// Calculate angle between two vectors in radians
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    let norms = v1.norm() * v2.norm();
    if norms < 1e-10 {
        0.0
    } else {
        (v1.dot(v2) / norms).clamp(-1.0, 1.0).acos()
    }
}

/// Interior angle at `vertex` formed by `a` and `c`, in degrees
pub fn joint_angle(a: &Position3D, vertex: &Position3D, c: &Position3D) -> f64 {
    angle_between(&vertex.vector_to(a), &vertex.vector_to(c)).to_degrees()
}
