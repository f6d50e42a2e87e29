//! Balance: center of mass against base of support.
//!
//! A frame is balanced when the torso centroid falls inside the ankle box.
//! Unbalanced frames still contribute half credit, so the score never drops
//! to zero for a detected body.

use serde::{Deserialize, Serialize};
use taichi_core::{base_of_support, center_of_mass_2d, stats, PoseFrame};

/// Credit for a frame whose center of mass leaves the base of support
pub const UNBALANCED_CREDIT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceAnalysis {
    /// Mean per-frame balance credit [0, 1]
    pub score: f64,
    /// 1 - mean per-axis spread of the center of mass [0, 1]
    pub stability: f64,
    /// Frames with the center of mass inside the base of support
    pub balance_maintained: usize,
    pub total_frames: usize,
}

impl BalanceAnalysis {
    pub fn from_frames(frames: &[&PoseFrame]) -> Self {
        let mut com_x = Vec::with_capacity(frames.len());
        let mut com_y = Vec::with_capacity(frames.len());
        let mut credits = Vec::with_capacity(frames.len());

        for landmarks in frames.iter().filter_map(|f| f.landmarks.as_ref()) {
            let com = center_of_mass_2d(landmarks);
            let balanced = base_of_support(landmarks).contains(&com);

            com_x.push(com.x);
            com_y.push(com.y);
            credits.push(if balanced { 1.0 } else { UNBALANCED_CREDIT });
        }

        if credits.is_empty() {
            return Self::default();
        }

        let spread = (stats::std_dev(&com_x) + stats::std_dev(&com_y)) / 2.0;

        Self {
            score: stats::mean(&credits).clamp(0.0, 1.0),
            stability: (1.0 - spread).clamp(0.0, 1.0),
            balance_maintained: credits.iter().filter(|&&c| c == 1.0).count(),
            total_frames: credits.len(),
        }
    }
}
