//! Reference forms and comparison of a recording against them.
//!
//! Each form carries a handful of key poses expressed as joint-angle
//! profiles. A user frame is scored by its closest key pose, so the
//! comparison is independent of where the practitioner stands in the image
//! and of the order in which poses appear.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use taichi_core::{
    geometry::MIN_SUPPORT_LANDMARKS, joint_angle, stats, Error, Landmarks, PoseFrame,
    PoseLandmark, Result,
};

use crate::config::{ComparisonConfig, QualityThresholds};
use crate::scoring::QualityLevel;

pub const OVERALL_IMPROVEMENT: &str = "Overall form accuracy needs improvement";

/// Interior joint angles of one pose, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngles {
    pub left_elbow: f64,
    pub right_elbow: f64,
    pub left_shoulder: f64,
    pub right_shoulder: f64,
    pub left_hip: f64,
    pub right_hip: f64,
    pub left_knee: f64,
    pub right_knee: f64,
}

impl JointAngles {
    /// Angles in field order: elbows, shoulders, hips, knees (left first)
    pub const fn from_array(a: [f64; 8]) -> Self {
        Self {
            left_elbow: a[0],
            right_elbow: a[1],
            left_shoulder: a[2],
            right_shoulder: a[3],
            left_hip: a[4],
            right_hip: a[5],
            left_knee: a[6],
            right_knee: a[7],
        }
    }

    pub fn to_array(&self) -> [f64; 8] {
        [
            self.left_elbow,
            self.right_elbow,
            self.left_shoulder,
            self.right_shoulder,
            self.left_hip,
            self.right_hip,
            self.left_knee,
            self.right_knee,
        ]
    }

    /// Profile of a detected pose; `None` when a limb landmark is missing
    pub fn from_landmarks(landmarks: &Landmarks) -> Option<Self> {
        use PoseLandmark::*;

        let angle = |a: PoseLandmark, vertex: PoseLandmark, c: PoseLandmark| -> Option<f64> {
            Some(joint_angle(
                &landmarks.position(a)?,
                &landmarks.position(vertex)?,
                &landmarks.position(c)?,
            ))
        };

        Some(Self {
            left_elbow: angle(LeftShoulder, LeftElbow, LeftWrist)?,
            right_elbow: angle(RightShoulder, RightElbow, RightWrist)?,
            left_shoulder: angle(LeftHip, LeftShoulder, LeftElbow)?,
            right_shoulder: angle(RightHip, RightShoulder, RightElbow)?,
            left_hip: angle(LeftShoulder, LeftHip, LeftKnee)?,
            right_hip: angle(RightShoulder, RightHip, RightKnee)?,
            left_knee: angle(LeftHip, LeftKnee, LeftAnkle)?,
            right_knee: angle(RightHip, RightKnee, RightAnkle)?,
        })
    }

    pub fn mean_abs_difference(&self, other: &JointAngles) -> f64 {
        let diffs: Vec<f64> = self
            .to_array()
            .iter()
            .zip(other.to_array())
            .map(|(a, b)| (a - b).abs())
            .collect();
        stats::mean(&diffs)
    }

    /// Similarity in (0, 1]: 1 / (1 + mean_diff / tolerance)
    pub fn similarity(&self, other: &JointAngles, tolerance_deg: f64) -> f64 {
        if tolerance_deg <= 0.0 {
            return 0.0;
        }
        1.0 / (1.0 + self.mean_abs_difference(other) / tolerance_deg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPose {
    pub name: String,
    pub angles: JointAngles,
}

impl KeyPose {
    pub fn new(name: &str, angles: [f64; 8]) -> Self {
        Self {
            name: name.to_string(),
            angles: JointAngles::from_array(angles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormStyle {
    Yang,
    Chen,
    Wu,
    Sun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormReference {
    pub id: String,
    pub name: String,
    pub style: FormStyle,
    pub difficulty: Difficulty,
    pub movement_count: u32,
    /// Expected performance length in minutes, inclusive
    pub duration_minutes: (u32, u32),
    pub quality_thresholds: QualityThresholds,
    pub key_poses: Vec<KeyPose>,
}

impl FormReference {
    /// Similarity of one pose to the closest key pose
    pub fn best_similarity(&self, angles: &JointAngles, tolerance_deg: f64) -> f64 {
        self.key_poses
            .iter()
            .map(|pose| pose.angles.similarity(angles, tolerance_deg))
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for FormReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} movements, {}-{} minutes)",
            self.name, self.movement_count, self.duration_minutes.0, self.duration_minutes.1
        )
    }
}

/// Named reference forms, read-only during analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormCatalog {
    forms: BTreeMap<String, FormReference>,
}

impl FormCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yang 24, Yang 40, and Chen 18
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(yang_24());
        catalog.insert(yang_40());
        catalog.insert(chen_18());
        catalog
    }

    pub fn insert(&mut self, form: FormReference) {
        self.forms.insert(form.id.clone(), form);
    }

    pub fn get(&self, id: &str) -> Result<&FormReference> {
        self.forms
            .get(id)
            .ok_or_else(|| Error::UnknownForm(id.to_string()))
    }

    pub fn forms(&self) -> impl Iterator<Item = &FormReference> {
        self.forms.values()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

// Angles: [l_elbow, r_elbow, l_shoulder, r_shoulder, l_hip, r_hip, l_knee, r_knee]

fn yang_24() -> FormReference {
    FormReference {
        id: "yang_24".to_string(),
        name: "Yang Style 24 Forms".to_string(),
        style: FormStyle::Yang,
        difficulty: Difficulty::Beginner,
        movement_count: 24,
        duration_minutes: (5, 7),
        quality_thresholds: QualityThresholds::default(),
        key_poses: vec![
            KeyPose::new("Commencing Form", [165.0, 165.0, 80.0, 80.0, 175.0, 175.0, 165.0, 165.0]),
            KeyPose::new(
                "Part Wild Horse's Mane",
                [150.0, 160.0, 100.0, 30.0, 160.0, 170.0, 140.0, 170.0],
            ),
            KeyPose::new(
                "White Crane Spreads Its Wings",
                [160.0, 130.0, 25.0, 150.0, 170.0, 170.0, 165.0, 145.0],
            ),
            KeyPose::new("Brush Knee", [165.0, 120.0, 20.0, 70.0, 155.0, 170.0, 135.0, 170.0]),
            KeyPose::new("Single Whip", [170.0, 120.0, 90.0, 90.0, 160.0, 170.0, 140.0, 165.0]),
            KeyPose::new("Cloud Hands", [140.0, 150.0, 60.0, 35.0, 170.0, 170.0, 155.0, 155.0]),
            KeyPose::new("Closing Form", [175.0, 175.0, 15.0, 15.0, 178.0, 178.0, 175.0, 175.0]),
        ],
    }
}

fn yang_40() -> FormReference {
    FormReference {
        id: "yang_40".to_string(),
        name: "Yang Style 40 Forms".to_string(),
        style: FormStyle::Yang,
        difficulty: Difficulty::Intermediate,
        movement_count: 40,
        duration_minutes: (10, 12),
        quality_thresholds: QualityThresholds::default(),
        key_poses: vec![
            KeyPose::new("Commencing Form", [165.0, 165.0, 80.0, 80.0, 175.0, 175.0, 165.0, 165.0]),
            KeyPose::new(
                "Grasp the Bird's Tail",
                [120.0, 140.0, 75.0, 60.0, 155.0, 170.0, 135.0, 170.0],
            ),
            KeyPose::new("Single Whip", [170.0, 120.0, 90.0, 90.0, 160.0, 170.0, 140.0, 165.0]),
            KeyPose::new(
                "Snake Creeps Down",
                [170.0, 130.0, 60.0, 85.0, 120.0, 150.0, 170.0, 70.0],
            ),
            KeyPose::new(
                "Golden Rooster Stands on One Leg",
                [100.0, 160.0, 110.0, 20.0, 175.0, 95.0, 175.0, 90.0],
            ),
            KeyPose::new("Closing Form", [175.0, 175.0, 15.0, 15.0, 178.0, 178.0, 175.0, 175.0]),
        ],
    }
}

fn chen_18() -> FormReference {
    FormReference {
        id: "chen_18".to_string(),
        name: "Chen Style 18 Forms".to_string(),
        style: FormStyle::Chen,
        difficulty: Difficulty::Intermediate,
        movement_count: 18,
        duration_minutes: (6, 8),
        quality_thresholds: QualityThresholds::default(),
        key_poses: vec![
            KeyPose::new("Preparing Form", [170.0, 170.0, 15.0, 15.0, 175.0, 175.0, 170.0, 170.0]),
            KeyPose::new(
                "Buddha's Warrior Pounds the Mortar",
                [90.0, 95.0, 45.0, 45.0, 165.0, 100.0, 150.0, 95.0],
            ),
            KeyPose::new(
                "Lazily Tying Coat",
                [170.0, 110.0, 95.0, 40.0, 150.0, 170.0, 125.0, 165.0],
            ),
            KeyPose::new(
                "Six Sealing Four Closing",
                [130.0, 130.0, 70.0, 70.0, 150.0, 165.0, 130.0, 160.0],
            ),
            KeyPose::new("Closing Form", [175.0, 175.0, 15.0, 15.0, 178.0, 178.0, 175.0, 175.0]),
        ],
    }
}

/// Similarity of one user frame to the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSimilarity {
    /// Position of the frame in the submitted sequence
    pub frame_index: usize,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub form_id: String,
    pub average_similarity: f64,
    pub best_match_frames: Vec<usize>,
    pub improvement_areas: Vec<String>,
    /// Matching frames over all submitted frames
    pub form_completion: f64,
    pub quality_level: QualityLevel,
    pub frame_scores: Vec<FrameSimilarity>,
}

/// Score a recording against a reference form.
///
/// Frames lacking the limb landmarks are not scored but still count
/// towards `form_completion`.
pub fn compare_with_reference(
    frames: &[PoseFrame],
    form: &FormReference,
    config: &ComparisonConfig,
) -> Result<ComparisonResult> {
    if frames.is_empty() {
        return Err(Error::NoUserPoses);
    }

    let frame_scores: Vec<FrameSimilarity> = frames
        .iter()
        .enumerate()
        .filter_map(|(frame_index, frame)| {
            let landmarks = frame.landmarks.as_ref()?;
            if landmarks.len() < MIN_SUPPORT_LANDMARKS {
                return None;
            }
            let angles = JointAngles::from_landmarks(landmarks)?;
            Some(FrameSimilarity {
                frame_index,
                similarity: form.best_similarity(&angles, config.angle_tolerance_deg),
            })
        })
        .collect();

    let similarities: Vec<f64> = frame_scores.iter().map(|s| s.similarity).collect();
    let average_similarity = stats::mean(&similarities);

    let matches: Vec<usize> = frame_scores
        .iter()
        .filter(|s| s.similarity > config.match_similarity)
        .map(|s| s.frame_index)
        .collect();

    Ok(ComparisonResult {
        form_id: form.id.clone(),
        average_similarity,
        form_completion: matches.len() as f64 / frames.len() as f64,
        best_match_frames: matches.into_iter().take(config.max_best_matches).collect(),
        improvement_areas: improvement_areas(&frame_scores, config),
        quality_level: QualityLevel::from_score(average_similarity, &form.quality_thresholds),
        frame_scores,
    })
}

/// Low-similarity stretches of the recording, as readable time ranges
pub fn improvement_areas(scores: &[FrameSimilarity], config: &ComparisonConfig) -> Vec<String> {
    if scores.is_empty() {
        return Vec::new();
    }

    let low: Vec<usize> = scores
        .iter()
        .filter(|s| s.similarity < config.low_similarity)
        .map(|s| s.frame_index)
        .collect();

    if low.len() as f64 > scores.len() as f64 * config.overall_issue_fraction {
        return vec![OVERALL_IMPROVEMENT.to_string()];
    }

    let mut groups: Vec<(usize, usize)> = Vec::new();
    for index in low {
        match groups.last_mut() {
            Some((_, end)) if index - *end <= config.group_gap => *end = index,
            _ => groups.push((index, index)),
        }
    }

    let seconds = |index: usize| index as f64 / config.assumed_fps;
    groups
        .into_iter()
        .take(config.max_ranges)
        .map(|(start, end)| {
            format!("Movement sequence from {:.1}s to {:.1}s", seconds(start), seconds(end))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use taichi_core::Landmark;

    fn stance(arms_raised: bool) -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); PoseLandmark::COUNT];
        let mut set = |lm: PoseLandmark, x: f64, y: f64| {
            points[lm.index()] = Landmark::new(x, y, 0.0, 1.0);
        };
        set(PoseLandmark::LeftShoulder, 0.45, 0.3);
        set(PoseLandmark::RightShoulder, 0.55, 0.3);
        set(PoseLandmark::LeftHip, 0.46, 0.55);
        set(PoseLandmark::RightHip, 0.54, 0.55);
        set(PoseLandmark::LeftKnee, 0.46, 0.72);
        set(PoseLandmark::RightKnee, 0.54, 0.72);
        set(PoseLandmark::LeftAnkle, 0.46, 0.9);
        set(PoseLandmark::RightAnkle, 0.54, 0.9);
        if arms_raised {
            set(PoseLandmark::LeftElbow, 0.33, 0.3);
            set(PoseLandmark::LeftWrist, 0.21, 0.3);
            set(PoseLandmark::RightElbow, 0.67, 0.3);
            set(PoseLandmark::RightWrist, 0.79, 0.3);
        } else {
            set(PoseLandmark::LeftElbow, 0.45, 0.42);
            set(PoseLandmark::LeftWrist, 0.45, 0.54);
            set(PoseLandmark::RightElbow, 0.55, 0.42);
            set(PoseLandmark::RightWrist, 0.55, 0.54);
        }
        points
    }

    fn standing_form() -> FormReference {
        let angles = JointAngles::from_landmarks(&Landmarks::new(stance(false))).unwrap();
        FormReference {
            id: "standing".to_string(),
            name: "Standing".to_string(),
            style: FormStyle::Yang,
            difficulty: Difficulty::Beginner,
            movement_count: 1,
            duration_minutes: (1, 1),
            quality_thresholds: QualityThresholds::default(),
            key_poses: vec![KeyPose {
                name: "Wuji".to_string(),
                angles,
            }],
        }
    }

    fn recording(raised: &[usize], len: usize) -> Vec<PoseFrame> {
        (0..len)
            .map(|i| PoseFrame::detected(i as u64, i as f64 / 30.0, stance(raised.contains(&i))))
            .collect()
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = FormCatalog::builtin();
        assert_eq!(catalog.len(), 3);

        let yang = catalog.get("yang_24").unwrap();
        assert_eq!(yang.movement_count, 24);
        assert_eq!(yang.difficulty, Difficulty::Beginner);
        assert_eq!(yang.duration_minutes, (5, 7));
        assert_eq!(catalog.get("chen_18").unwrap().style, FormStyle::Chen);

        let ids: Vec<&str> = catalog.forms().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["chen_18", "yang_24", "yang_40"]);

        assert_eq!(
            catalog.get("sun_73").unwrap_err(),
            Error::UnknownForm("sun_73".to_string())
        );
    }

    #[test]
    fn test_joint_angles_of_hanging_arms() {
        let angles = JointAngles::from_landmarks(&Landmarks::new(stance(false))).unwrap();
        assert!((angles.left_elbow - 180.0).abs() < 1e-4);
        assert!(angles.left_shoulder < 5.0);

        let raised = JointAngles::from_landmarks(&Landmarks::new(stance(true))).unwrap();
        assert!((raised.left_shoulder - angles.left_shoulder - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_recording() {
        let err = compare_with_reference(&[], &standing_form(), &ComparisonConfig::default())
            .unwrap_err();
        assert_eq!(err, Error::NoUserPoses);
    }

    #[test]
    fn test_matching_recording_with_one_low_stretch() {
        let frames = recording(&[6, 7], 10);

        let config = ComparisonConfig::default();
        let result = compare_with_reference(&frames, &standing_form(), &config).unwrap();

        assert_eq!(result.best_match_frames, vec![0, 1, 2, 3, 4, 5, 8, 9]);
        assert!((result.form_completion - 0.8).abs() < 1e-12);
        assert_eq!(
            result.improvement_areas,
            vec!["Movement sequence from 0.2s to 0.2s".to_string()]
        );
        // Raised arms differ by 90 degrees at both shoulders
        let low = 1.0 / (1.0 + 22.5 / 30.0);
        assert!((result.average_similarity - (0.8 + 0.2 * low)).abs() < 1e-6);
        assert_eq!(result.quality_level, QualityLevel::Excellent);
    }

    #[test]
    fn test_mostly_low_recording() {
        let frames = recording(&[0, 1, 2, 3], 10);

        let config = ComparisonConfig::default();
        let result = compare_with_reference(&frames, &standing_form(), &config).unwrap();

        assert_eq!(result.improvement_areas, vec![OVERALL_IMPROVEMENT.to_string()]);
    }

    #[test]
    fn test_low_frames_grouped_by_gap() {
        const LOW: [usize; 6] = [30, 33, 60, 90, 95, 99];
        let config = ComparisonConfig::default();
        let scores: Vec<FrameSimilarity> = (0..100)
            .map(|frame_index| FrameSimilarity {
                frame_index,
                similarity: if LOW.contains(&frame_index) { 0.5 } else { 0.9 },
            })
            .collect();

        let areas = improvement_areas(&scores, &config);

        assert_eq!(
            areas,
            vec![
                "Movement sequence from 1.0s to 1.1s".to_string(),
                "Movement sequence from 2.0s to 2.0s".to_string(),
                "Movement sequence from 3.0s to 3.3s".to_string(),
            ]
        );
    }

    #[test]
    fn test_unscored_frames_count_toward_completion() {
        let mut frames = recording(&[], 2);
        frames.push(PoseFrame::missing(2, 2.0 / 30.0));
        frames.push(PoseFrame::detected(3, 0.1, vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 20]));

        let config = ComparisonConfig::default();
        let result = compare_with_reference(&frames, &standing_form(), &config).unwrap();

        assert_eq!(result.frame_scores.len(), 2);
        assert!((result.form_completion - 0.5).abs() < 1e-12);
        assert!(result.improvement_areas.is_empty());
    }
}
