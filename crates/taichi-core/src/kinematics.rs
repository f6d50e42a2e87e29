//! Joint trajectories and discrete derivatives.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::filtering::SavitzkyGolayFilter;
use crate::types::{PoseFrame, PoseLandmark, Position3D};

/// Time-series trajectory point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Seconds since the start of the recording
    pub timestamp: f64,
    pub position: Position3D,
}

/// Path of a single landmark across a frame sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointTrajectory {
    pub landmark: PoseLandmark,
    pub points: Vec<TrajectoryPoint>,
}

impl JointTrajectory {
    /// Collect the landmark from every frame that has it
    pub fn from_frames<'a>(
        landmark: PoseLandmark,
        frames: impl IntoIterator<Item = &'a PoseFrame>,
    ) -> Self {
        let points = frames
            .into_iter()
            .filter_map(|frame| {
                let position = frame.landmarks.as_ref()?.position(landmark)?;
                Some(TrajectoryPoint {
                    timestamp: frame.timestamp,
                    position,
                })
            })
            .collect();

        Self { landmark, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> Vec<Position3D> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Smoothed per-sample jerk vectors (third difference of position)
    pub fn jerk_profile(&self, filter: &SavitzkyGolayFilter) -> Vec<Vector3<f64>> {
        let smoothed = filter.filter_positions(&self.positions());
        let positions: Vec<Vector3<f64>> = smoothed
            .iter()
            .map(|p| Vector3::new(p.x, p.y, p.z))
            .collect();

        let velocities = differences(&positions);
        let accelerations = differences(&velocities);
        differences(&accelerations)
    }
}

/// First discrete difference of a vector series
pub fn differences(series: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Mean of the absolute jerk components, `None` when there are no jerk samples
pub fn mean_absolute_component(jerks: &[Vector3<f64>]) -> Option<f64> {
    if jerks.is_empty() {
        return None;
    }
    let sum: f64 = jerks.iter().map(|j| j.abs().sum()).sum();
    Some(sum / (jerks.len() * 3) as f64)
}
