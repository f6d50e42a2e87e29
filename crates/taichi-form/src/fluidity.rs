//! Fluidity: smoothness of the hands' paths.
//!
//! Each wrist trajectory is smoothed with a Savitzky-Golay filter and its
//! jerk (third difference) is mapped to a bounded smoothness score:
//!
//! smoothness = 1 / (1 + 10 · mean|jerk|)

use serde::{Deserialize, Serialize};
use taichi_core::{
    geometry::MIN_ARM_LANDMARKS, mean_absolute_component, JointTrajectory, PoseFrame,
    PoseLandmark, SavitzkyGolayFilter,
};

/// Frames needed before fluidity is measured at all
pub const MIN_FRAMES: usize = 3;

/// Samples a joint needs before its jerk is meaningful
pub const MIN_TRAJECTORY_SAMPLES: usize = 6;

pub const SMOOTHING_WINDOW: usize = 5;
pub const SMOOTHING_ORDER: usize = 2;

const TRACKED_JOINTS: [PoseLandmark; 2] = [PoseLandmark::LeftWrist, PoseLandmark::RightWrist];

/// Smoothness of a single joint path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSmoothness {
    pub joint: PoseLandmark,
    pub mean_jerk: f64,
    pub smoothness: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FluidityAnalysis {
    pub score: f64,
    pub smoothness: f64,
    /// At least one joint had enough samples to be scored
    pub continuous_flow: bool,
    pub joints: Vec<JointSmoothness>,
}

impl FluidityAnalysis {
    pub fn from_frames(frames: &[&PoseFrame]) -> Self {
        if frames.len() < MIN_FRAMES {
            return Self::default();
        }

        let filter = match SavitzkyGolayFilter::new(SMOOTHING_WINDOW, SMOOTHING_ORDER) {
            Ok(filter) => filter,
            Err(e) => {
                tracing::warn!("Fluidity smoothing unavailable: {}", e);
                return Self::default();
            }
        };

        let eligible: Vec<&PoseFrame> = frames
            .iter()
            .copied()
            .filter(|f| f.landmark_count() >= MIN_ARM_LANDMARKS)
            .collect();

        let joints: Vec<JointSmoothness> = TRACKED_JOINTS
            .iter()
            .filter_map(|&joint| {
                let trajectory = JointTrajectory::from_frames(joint, eligible.iter().copied());
                joint_smoothness(&trajectory, &filter)
            })
            .collect();

        if joints.is_empty() {
            return Self::default();
        }

        let score = (joints.iter().map(|j| j.smoothness).sum::<f64>() / joints.len() as f64)
            .clamp(0.0, 1.0);

        Self {
            score,
            smoothness: score,
            continuous_flow: true,
            joints,
        }
    }
}

fn joint_smoothness(
    trajectory: &JointTrajectory,
    filter: &SavitzkyGolayFilter,
) -> Option<JointSmoothness> {
    if trajectory.len() < MIN_TRAJECTORY_SAMPLES {
        return None;
    }

    let mean_jerk = mean_absolute_component(&trajectory.jerk_profile(filter))?;

    Some(JointSmoothness {
        joint: trajectory.landmark,
        mean_jerk,
        smoothness: 1.0 / (1.0 + 10.0 * mean_jerk),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use taichi_core::Landmark;

    fn frames_with_wrists(n: u64, wrist: impl Fn(f64) -> (f64, f64, f64)) -> Vec<PoseFrame> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                let mut points = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); PoseLandmark::COUNT];
                let (x, y, z) = wrist(t);
                points[PoseLandmark::LeftWrist.index()] = Landmark::new(x, y, z, 1.0);
                points[PoseLandmark::RightWrist.index()] = Landmark::new(1.0 - x, y, z, 1.0);
                PoseFrame::detected(i, t / 30.0, points)
            })
            .collect()
    }

    #[test]
    fn test_constant_velocity_is_perfectly_smooth() {
        let frames = frames_with_wrists(20, |t| (0.01 * t, 0.02 * t, 0.0));
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = FluidityAnalysis::from_frames(&refs);

        assert!(analysis.continuous_flow);
        assert_eq!(analysis.joints.len(), 2);
        assert!((analysis.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_lowers_score() {
        let frames = frames_with_wrists(20, |t| {
            let jitter = if (t as u64) % 2 == 0 { 0.05 } else { -0.05 };
            (0.01 * t + jitter, 0.5 + jitter, 0.0)
        });
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = FluidityAnalysis::from_frames(&refs);

        assert!(analysis.score < 0.9);
        assert!(analysis.score > 0.0);
    }

    #[test]
    fn test_too_few_frames() {
        let frames = frames_with_wrists(2, |t| (t, t, t));
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = FluidityAnalysis::from_frames(&refs);

        assert_eq!(analysis.score, 0.0);
        assert!(!analysis.continuous_flow);
    }

    #[test]
    fn test_short_trajectories_are_excluded() {
        let frames = frames_with_wrists(5, |t| (0.1 * t, 0.0, 0.0));
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = FluidityAnalysis::from_frames(&refs);

        assert!(analysis.joints.is_empty());
        assert!(!analysis.continuous_flow);
    }
}
