//! Stateless single-frame posture check for live feedback.

use serde::{Deserialize, Serialize};
use taichi_core::{
    arm_symmetry, geometry::MIN_SUPPORT_LANDMARKS, is_balanced, spine_deviation,
    stance_width_ratio, Error, Landmarks, Result,
};

use crate::alignment::{hip_level_score, shoulder_level_score, spine_score};
use crate::config::RealtimeThresholds;

pub const BALANCE_WARNING: &str = "Adjust your balance - center of mass is off";
pub const SPINE_ADVICE: &str = "Keep your spine more upright";
pub const SYMMETRY_ADVICE: &str = "Focus on symmetrical arm movements";
pub const STANCE_ADVICE: &str = "Adjust your stance width";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeFeedback {
    pub feedback: Vec<String>,
    pub warnings: Vec<String>,
    /// Mean of spine, shoulder level, and hip level scores
    pub posture_score: f64,
    pub balance_indicator: bool,
    pub spine_deviation: f64,
    pub arm_symmetry: f64,
    pub stance_ratio: f64,
}

/// Evaluate one frame of landmarks against the live advisory limits
pub fn evaluate_frame(
    landmarks: &Landmarks,
    thresholds: &RealtimeThresholds,
) -> Result<RealtimeFeedback> {
    if landmarks.len() < MIN_SUPPORT_LANDMARKS {
        return Err(Error::InsufficientLandmarks {
            required: MIN_SUPPORT_LANDMARKS,
            available: landmarks.len(),
        });
    }

    let mut feedback = Vec::new();
    let mut warnings = Vec::new();

    let balanced = is_balanced(landmarks);
    if !balanced {
        warnings.push(BALANCE_WARNING.to_string());
    }

    let deviation = spine_deviation(landmarks);
    if deviation > thresholds.max_spine_deviation_deg {
        feedback.push(SPINE_ADVICE.to_string());
    }

    let symmetry = arm_symmetry(landmarks);
    if symmetry < thresholds.min_arm_symmetry {
        feedback.push(SYMMETRY_ADVICE.to_string());
    }

    let stance = stance_width_ratio(landmarks);
    if stance < thresholds.min_stance_ratio || stance > thresholds.max_stance_ratio {
        feedback.push(STANCE_ADVICE.to_string());
    }

    Ok(RealtimeFeedback {
        feedback,
        warnings,
        posture_score: posture_score(landmarks),
        balance_indicator: balanced,
        spine_deviation: deviation,
        arm_symmetry: symmetry,
        stance_ratio: stance,
    })
}

pub fn posture_score(landmarks: &Landmarks) -> f64 {
    let score = (spine_score(landmarks)
        + shoulder_level_score(landmarks)
        + hip_level_score(landmarks))
        / 3.0;
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taichi_core::{Landmark, PoseLandmark};

    /// Torso stacked over ankles at x=0.4/0.6, y=0.9
    fn grounded_pose(len: usize) -> Landmarks {
        let mut points = vec![Landmark::new(0.5, 0.9, 0.0, 1.0); len];
        points[PoseLandmark::LeftShoulder.index()] = Landmark::new(0.45, 0.9, 0.0, 1.0);
        points[PoseLandmark::RightShoulder.index()] = Landmark::new(0.55, 0.9, 0.0, 1.0);
        points[PoseLandmark::LeftHip.index()] = Landmark::new(0.45, 0.9, 0.0, 1.0);
        points[PoseLandmark::RightHip.index()] = Landmark::new(0.55, 0.9, 0.0, 1.0);
        points[PoseLandmark::LeftAnkle.index()] = Landmark::new(0.4, 0.9, 0.0, 1.0);
        points[PoseLandmark::RightAnkle.index()] = Landmark::new(0.6, 0.9, 0.0, 1.0);
        Landmarks::new(points)
    }

    #[test]
    fn test_balanced_over_ankles() {
        let result = evaluate_frame(&grounded_pose(29), &RealtimeThresholds::default()).unwrap();
        assert!(result.balance_indicator);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_insufficient_landmarks() {
        let short = Landmarks::new(grounded_pose(29).0[..28].to_vec());
        let err = evaluate_frame(&short, &RealtimeThresholds::default()).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientLandmarks {
                required: 29,
                available: 28
            }
        );
    }

    #[test]
    fn test_off_balance_and_narrow_stance() {
        let mut landmarks = grounded_pose(33);
        for lm in PoseLandmark::TORSO {
            landmarks.0[lm.index()].y = 0.4;
        }
        landmarks.0[PoseLandmark::LeftAnkle.index()].x = 0.49;
        landmarks.0[PoseLandmark::RightAnkle.index()].x = 0.51;

        let result = evaluate_frame(&landmarks, &RealtimeThresholds::default()).unwrap();

        assert!(!result.balance_indicator);
        assert_eq!(result.warnings, vec![BALANCE_WARNING.to_string()]);
        assert!(result.feedback.contains(&STANCE_ADVICE.to_string()));
    }

    #[test]
    fn test_asymmetric_arms() {
        let mut landmarks = grounded_pose(33);
        // Left arm raised, right arm lowered
        landmarks.0[PoseLandmark::LeftWrist.index()] = Landmark::new(0.35, 0.6, 0.0, 1.0);
        landmarks.0[PoseLandmark::RightWrist.index()] = Landmark::new(0.65, 1.2, 0.0, 1.0);

        let result = evaluate_frame(&landmarks, &RealtimeThresholds::default()).unwrap();

        assert!(result.arm_symmetry < 0.8);
        assert!(result.feedback.contains(&SYMMETRY_ADVICE.to_string()));
    }

    #[test]
    fn test_level_posture_scores_full() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 33];
        points[PoseLandmark::LeftShoulder.index()] = Landmark::new(0.45, 0.3, 0.0, 1.0);
        points[PoseLandmark::RightShoulder.index()] = Landmark::new(0.55, 0.3, 0.0, 1.0);
        points[PoseLandmark::LeftHip.index()] = Landmark::new(0.46, 0.55, 0.0, 1.0);
        points[PoseLandmark::RightHip.index()] = Landmark::new(0.54, 0.55, 0.0, 1.0);

        assert!((posture_score(&Landmarks::new(points)) - 1.0).abs() < 1e-9);
    }
}
