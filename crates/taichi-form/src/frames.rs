//! Frame filtering, sequence summaries, and key frame extraction.

use serde::{Deserialize, Serialize};
use taichi_core::{stats, Error, Landmarks, PoseFrame, Result};

/// Frames that carry a landmark list.
///
/// Refuses an empty sequence and one where detection never succeeded.
pub fn valid_frames(frames: &[PoseFrame]) -> Result<Vec<&PoseFrame>> {
    if frames.is_empty() {
        return Err(Error::NoPoses);
    }

    let valid: Vec<&PoseFrame> = frames.iter().filter(|f| f.has_landmarks()).collect();
    if valid.is_empty() {
        return Err(Error::NoValidPoses);
    }

    Ok(valid)
}

/// Frames whose detector confidence is at least `min_confidence`; landmarks are not checked
pub fn filter_by_confidence(frames: &[PoseFrame], min_confidence: f64) -> Vec<&PoseFrame> {
    frames
        .iter()
        .filter(|f| f.confidence >= min_confidence)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SequenceSummary {
    pub frame_count: usize,
    pub valid_count: usize,
    pub detection_rate: f64,
    /// Mean confidence over landmark-bearing frames
    pub average_confidence: f64,
    /// Seconds between the first and last frame
    pub duration: f64,
    /// Derived from the mean timestamp step; 0 when undefined
    pub fps: f64,
}

impl SequenceSummary {
    pub fn from_frames(frames: &[PoseFrame]) -> Self {
        if frames.is_empty() {
            return Self::default();
        }

        let confidences: Vec<f64> = frames
            .iter()
            .filter(|f| f.has_landmarks())
            .map(|f| f.confidence)
            .collect();

        let steps: Vec<f64> = frames
            .windows(2)
            .map(|w| w[1].timestamp - w[0].timestamp)
            .collect();
        let mean_step = stats::mean(&steps);

        let first = frames[0].timestamp;
        let last = frames[frames.len() - 1].timestamp;

        Self {
            frame_count: frames.len(),
            valid_count: confidences.len(),
            detection_rate: confidences.len() as f64 / frames.len() as f64,
            average_confidence: stats::mean(&confidences),
            duration: last - first,
            fps: if mean_step > 0.0 { 1.0 / mean_step } else { 0.0 },
        }
    }
}

/// Mean 3D displacement over the landmarks both frames share
pub fn movement_intensity(from: Option<&Landmarks>, to: Option<&Landmarks>) -> f64 {
    let (Some(from), Some(to)) = (from, to) else {
        return 0.0;
    };

    let displacements: Vec<f64> = from
        .iter()
        .zip(to.iter())
        .map(|(a, b)| a.position().distance_to(&b.position()))
        .collect();

    stats::mean(&displacements)
}

/// Indices of frames where the movement intensity changes sharply.
///
/// The first and last frame are always key frames. An interior frame
/// qualifies when the intensity into it and out of it differ by more than
/// `motion_threshold` and it sits at least `min_distance` frames after the
/// previous key frame.
pub fn extract_key_frames(
    frames: &[PoseFrame],
    motion_threshold: f64,
    min_distance: usize,
) -> Vec<usize> {
    if frames.len() < 2 {
        return Vec::new();
    }

    let intensity = |a: usize, b: usize| {
        movement_intensity(frames[a].landmarks.as_ref(), frames[b].landmarks.as_ref())
    };

    let mut key_frames = vec![0];
    for i in 1..frames.len() - 1 {
        let previous = key_frames[key_frames.len() - 1];
        if i - previous < min_distance {
            continue;
        }

        if (intensity(i, i + 1) - intensity(i - 1, i)).abs() > motion_threshold {
            key_frames.push(i);
        }
    }

    key_frames.push(frames.len() - 1);
    key_frames
}
