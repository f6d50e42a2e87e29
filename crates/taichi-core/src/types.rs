//! Fundamental types for pose landmark sequences.

use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use uuid::Uuid;

/// Identifier for an analysis session fed frame by frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// 3D position in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn vector_to(&self, other: &Self) -> Vector3<f64> {
        Vector3::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        self.vector_to(other).norm()
    }
}

/// One anatomical keypoint as emitted by the pose detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    /// Detector confidence that the point is visible [0, 1]
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn position(&self) -> Position3D {
        Position3D::new(self.x, self.y, self.z)
    }

    pub fn point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// 33-point body model landmark indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const COUNT: usize = 33;

    /// Torso points used for the center of mass approximation
    pub const TORSO: [PoseLandmark; 4] = [
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: u8) -> Option<Self> {
        use PoseLandmark::*;
        const ALL: [PoseLandmark; PoseLandmark::COUNT] = [
            Nose,
            LeftEyeInner,
            LeftEye,
            LeftEyeOuter,
            RightEyeInner,
            RightEye,
            RightEyeOuter,
            LeftEar,
            RightEar,
            MouthLeft,
            MouthRight,
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftPinky,
            RightPinky,
            LeftIndex,
            RightIndex,
            LeftThumb,
            RightThumb,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
            LeftHeel,
            RightHeel,
            LeftFootIndex,
            RightFootIndex,
        ];
        ALL.get(idx as usize).copied()
    }
}

/// Per-frame landmark list, positioned by [`PoseLandmark`] index
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks(pub Vec<Landmark>);

impl Landmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self(points)
    }

    pub fn get(&self, landmark: PoseLandmark) -> Option<&Landmark> {
        self.0.get(landmark.index())
    }

    pub fn position(&self, landmark: PoseLandmark) -> Option<Position3D> {
        self.get(landmark).map(Landmark::position)
    }

    /// Mean visibility over all points
    pub fn mean_visibility(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().map(|l| l.visibility).sum::<f64>() / self.0.len() as f64
    }
}

impl Deref for Landmarks {
    type Target = [Landmark];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Landmark>> for Landmarks {
    fn from(points: Vec<Landmark>) -> Self {
        Self(points)
    }
}

/// One observation from the pose detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub frame_number: u64,
    /// Seconds since the start of the recording
    pub timestamp: f64,
    /// Absent when detection failed for this frame
    #[serde(default)]
    pub landmarks: Option<Landmarks>,
    #[serde(default)]
    pub world_landmarks: Option<Landmarks>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub visibility_scores: Vec<f64>,
}

impl PoseFrame {
    /// Frame with detected landmarks; confidence is the mean visibility
    pub fn detected(frame_number: u64, timestamp: f64, landmarks: Vec<Landmark>) -> Self {
        let landmarks = Landmarks::new(landmarks);
        let visibility_scores = landmarks.iter().map(|l| l.visibility).collect();
        let confidence = landmarks.mean_visibility();

        Self {
            frame_number,
            timestamp,
            landmarks: Some(landmarks),
            world_landmarks: None,
            confidence,
            visibility_scores,
        }
    }

    /// Placeholder for a frame where detection failed
    pub fn missing(frame_number: u64, timestamp: f64) -> Self {
        Self {
            frame_number,
            timestamp,
            landmarks: None,
            world_landmarks: None,
            confidence: 0.0,
            visibility_scores: Vec::new(),
        }
    }

    pub fn with_world_landmarks(mut self, world_landmarks: Vec<Landmark>) -> Self {
        self.world_landmarks = Some(Landmarks::new(world_landmarks));
        self
    }

    pub fn has_landmarks(&self) -> bool {
        self.landmarks.is_some()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.as_ref().map_or(0, |l| l.len())
    }
}

/// Ordered frames of one recording; insertion order is temporal order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseSequence {
    frames: Vec<PoseFrame>,
}

impl PoseSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: PoseFrame) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[PoseFrame] {
        &self.frames
    }

    /// Frames carrying landmarks, in order
    pub fn valid_frames(&self) -> impl Iterator<Item = &PoseFrame> {
        self.frames.iter().filter(|f| f.has_landmarks())
    }

    pub fn into_frames(self) -> Vec<PoseFrame> {
        self.frames
    }
}

impl Deref for PoseSequence {
    type Target = [PoseFrame];

    fn deref(&self) -> &Self::Target {
        &self.frames
    }
}

impl From<Vec<PoseFrame>> for PoseSequence {
    fn from(frames: Vec<PoseFrame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<PoseFrame> for PoseSequence {
    fn from_iter<I: IntoIterator<Item = PoseFrame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let p1 = Position3D::new(0.0, 0.0, 0.0);
        let p2 = Position3D::new(3.0, 4.0, 0.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_landmark_index_roundtrip() {
        for i in 0..PoseLandmark::COUNT as u8 {
            let landmark = PoseLandmark::from_index(i).unwrap();
            assert_eq!(landmark.index(), i as usize);
        }
        assert!(PoseLandmark::from_index(33).is_none());
        assert_eq!(PoseLandmark::RightAnkle.index(), 28);
    }

    #[test]
    fn test_short_landmark_list() {
        let landmarks = Landmarks::new(vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 17]);
        assert!(landmarks.get(PoseLandmark::RightWrist).is_some());
        assert!(landmarks.get(PoseLandmark::LeftHip).is_none());
    }

    #[test]
    fn test_frame_confidence_is_mean_visibility() {
        let frame = PoseFrame::detected(
            0,
            0.0,
            vec![
                Landmark::new(0.0, 0.0, 0.0, 1.0),
                Landmark::new(0.0, 0.0, 0.0, 0.5),
            ],
        );
        assert!((frame.confidence - 0.75).abs() < 1e-12);
        assert_eq!(frame.visibility_scores, vec![1.0, 0.5]);
    }

    #[test]
    fn test_frame_json_with_null_landmarks() {
        let json = r#"{"frame_number": 3, "timestamp": 0.1, "landmarks": null}"#;
        let frame: PoseFrame = serde_json::from_str(json).unwrap();
        assert!(!frame.has_landmarks());
        assert_eq!(frame.landmark_count(), 0);
    }

    #[test]
    fn test_sequence_valid_frames() {
        let sequence: PoseSequence = vec![
            PoseFrame::missing(0, 0.0),
            PoseFrame::detected(1, 0.033, vec![Landmark::new(0.5, 0.5, 0.0, 0.9)]),
            PoseFrame::missing(2, 0.066),
        ]
        .into();

        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.valid_frames().count(), 1);
    }
}
