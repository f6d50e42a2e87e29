//! Timing: speed consistency and pause structure.
//!
//! Instantaneous speed between consecutive frames is the mean displacement
//! of wrists and knees divided by the elapsed time. Pauses are the frames
//! slower than the 20th percentile of that series.

use serde::{Deserialize, Serialize};
use taichi_core::{stats, PoseFrame, PoseLandmark};

const TRACKED_JOINTS: [PoseLandmark; 4] = [
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
    PoseLandmark::LeftKnee,
    PoseLandmark::RightKnee,
];

/// Percentile of the speed series under which a frame counts as a pause
pub const PAUSE_PERCENTILE: f64 = 20.0;

/// Pause quality when no frame is slow enough to be a pause
pub const NO_PAUSE_QUALITY: f64 = 0.5;

/// Pause quality for a single pause
pub const SINGLE_PAUSE_QUALITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingAnalysis {
    pub score: f64,
    /// 1 / (1 + 10 · var(speed))
    pub consistency: f64,
    pub pause_quality: f64,
    pub pause_count: usize,
    pub average_speed: f64,
    /// Standard deviation of the speed series
    pub speed_variation: f64,
}

impl TimingAnalysis {
    pub fn from_frames(frames: &[&PoseFrame]) -> Self {
        if frames.len() < 2 {
            return Self::default();
        }

        let speeds = movement_speeds(frames);
        if speeds.is_empty() {
            return Self::default();
        }

        let consistency = 1.0 / (1.0 + 10.0 * stats::variance(&speeds));
        let pauses = PauseEvaluation::from_speeds(&speeds);

        Self {
            score: ((consistency + pauses.quality) / 2.0).clamp(0.0, 1.0),
            consistency,
            pause_quality: pauses.quality,
            pause_count: pauses.pause_indices.len(),
            average_speed: stats::mean(&speeds),
            speed_variation: stats::std_dev(&speeds),
        }
    }
}

/// Speed between each consecutive pair of landmark-bearing frames.
///
/// Pairs with a non-positive time step or no shared tracked joint are skipped.
pub fn movement_speeds(frames: &[&PoseFrame]) -> Vec<f64> {
    frames
        .windows(2)
        .filter_map(|pair| {
            let prev = pair[0].landmarks.as_ref()?;
            let curr = pair[1].landmarks.as_ref()?;

            let displacements: Vec<f64> = TRACKED_JOINTS
                .iter()
                .filter_map(|&joint| {
                    Some(prev.position(joint)?.distance_to(&curr.position(joint)?))
                })
                .collect();
            if displacements.is_empty() {
                return None;
            }

            let dt = pair[1].timestamp - pair[0].timestamp;
            if dt <= 0.0 {
                return None;
            }

            Some(stats::mean(&displacements) / dt)
        })
        .collect()
}

/// Distribution of pauses within a speed series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseEvaluation {
    pub pause_indices: Vec<usize>,
    pub quality: f64,
}

impl PauseEvaluation {
    pub fn from_speeds(speeds: &[f64]) -> Self {
        if speeds.is_empty() {
            return Self {
                pause_indices: Vec::new(),
                quality: 0.0,
            };
        }

        let threshold = stats::percentile(speeds, PAUSE_PERCENTILE);
        let pause_indices: Vec<usize> = speeds
            .iter()
            .enumerate()
            .filter(|(_, &speed)| speed < threshold)
            .map(|(i, _)| i)
            .collect();

        let quality = match pause_indices.len() {
            0 => NO_PAUSE_QUALITY,
            1 => SINGLE_PAUSE_QUALITY,
            _ => {
                let gaps: Vec<f64> = pause_indices
                    .windows(2)
                    .map(|w| (w[1] - w[0]) as f64)
                    .collect();
                // Placement and stretch regularity both read the same gap series
                let gap_variance = stats::variance(&gaps);
                let distribution = 1.0 / (1.0 + gap_variance / 10.0);
                let duration = 1.0 / (1.0 + gap_variance / 5.0);
                (distribution + duration) / 2.0
            }
        };

        Self {
            pause_indices,
            quality,
        }
    }
}
