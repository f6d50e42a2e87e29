//! Motion tracking on the frame ingestion path.
//!
//! [`MotionBuffer`] keeps a short sliding window of key-joint positions for
//! live intensity readings; [`MotionPatterns`] summarizes torso movement over
//! a whole recording.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use taichi_core::{center_of_mass_3d, stats, Landmarks, PoseFrame, PoseLandmark, Position3D};

use crate::config::MotionConfig;

pub const KEY_JOINT_COUNT: usize = 5;

/// Joints sampled into the motion buffer
pub const KEY_JOINTS: [PoseLandmark; KEY_JOINT_COUNT] = [
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
    PoseLandmark::LeftHip,
    PoseLandmark::RightHip,
    PoseLandmark::Nose,
];

/// Key-joint positions at one instant; `None` where the list was too short
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSnapshot {
    pub timestamp: f64,
    pub joints: [Option<Position3D>; KEY_JOINT_COUNT],
}

impl MotionSnapshot {
    pub fn from_landmarks(timestamp: f64, landmarks: &Landmarks) -> Self {
        Self {
            timestamp,
            joints: KEY_JOINTS.map(|joint| landmarks.position(joint)),
        }
    }

    /// Mean displacement over joints present in both snapshots
    pub fn displacement_from(&self, previous: &MotionSnapshot) -> f64 {
        let moves: Vec<f64> = self
            .joints
            .iter()
            .zip(previous.joints.iter())
            .filter_map(|(curr, prev)| Some(curr.as_ref()?.distance_to(prev.as_ref()?)))
            .collect();
        stats::mean(&moves)
    }
}

/// Bounded sliding window of recent snapshots; oldest are evicted first
#[derive(Debug, Clone)]
pub struct MotionBuffer {
    capacity: usize,
    snapshots: VecDeque<MotionSnapshot>,
}

impl MotionBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            snapshots: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, snapshot: MotionSnapshot) {
        if self.capacity == 0 {
            return;
        }
        while self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Record a frame; frames without landmarks leave the window untouched
    pub fn push_frame(&mut self, frame: &PoseFrame) {
        if let Some(landmarks) = &frame.landmarks {
            self.push(MotionSnapshot::from_landmarks(frame.timestamp, landmarks));
        }
    }

    /// Displacement between the two most recent snapshots
    pub fn motion_intensity(&self) -> f64 {
        let n = self.snapshots.len();
        if n < 2 {
            return 0.0;
        }
        self.snapshots[n - 1].displacement_from(&self.snapshots[n - 2])
    }

    pub fn latest(&self) -> Option<&MotionSnapshot> {
        self.snapshots.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionSnapshot> {
        self.snapshots.iter()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

impl Default for MotionBuffer {
    fn default() -> Self {
        Self::new(MotionConfig::default().buffer_capacity)
    }
}

/// Torso movement statistics over a recording
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionPatterns {
    pub average_velocity: f64,
    pub max_velocity: f64,
    /// 1 / (1 + var(velocity))
    pub smoothness_score: f64,
    pub pause_count: usize,
    /// Mean share of confidently visible landmarks per frame
    pub motion_consistency: f64,
}

impl MotionPatterns {
    pub fn from_frames(frames: &[PoseFrame], config: &MotionConfig) -> Self {
        if frames.is_empty() {
            return Self::default();
        }

        let velocities: Vec<f64> = frames
            .windows(2)
            .filter_map(|pair| {
                let prev = pair[0].landmarks.as_ref()?;
                let curr = pair[1].landmarks.as_ref()?;
                let dt = pair[1].timestamp - pair[0].timestamp;
                if dt <= 0.0 {
                    return None;
                }
                Some(center_of_mass_3d(prev).distance_to(&center_of_mass_3d(curr)) / dt)
            })
            .collect();

        let smoothness_score = if velocities.is_empty() {
            0.0
        } else {
            1.0 / (1.0 + stats::variance(&velocities))
        };

        Self {
            average_velocity: stats::mean(&velocities),
            max_velocity: stats::max(&velocities),
            smoothness_score,
            pause_count: velocities.iter().filter(|&&v| v < config.pause_velocity).count(),
            motion_consistency: motion_consistency(frames, config.visibility_threshold),
        }
    }
}

fn motion_consistency(frames: &[PoseFrame], visibility_threshold: f64) -> f64 {
    if frames.len() < 2 {
        return 0.0;
    }

    let rates: Vec<f64> = frames
        .iter()
        .map(|frame| match &frame.landmarks {
            Some(landmarks) if !landmarks.is_empty() => {
                let visible = landmarks
                    .iter()
                    .filter(|l| l.visibility > visibility_threshold)
                    .count();
                visible as f64 / landmarks.len() as f64
            }
            _ => 0.0,
        })
        .collect();

    stats::mean(&rates)
}
