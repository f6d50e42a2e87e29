//! Alignment: spine, shoulder, and hip posture.

use serde::{Deserialize, Serialize};
use taichi_core::{
    geometry::MIN_SUPPORT_LANDMARKS, spine_deviation, stats, Landmarks, PoseFrame, PoseLandmark,
};

/// Landmarks a frame needs to be scored for alignment
pub const MIN_LANDMARKS: usize = MIN_SUPPORT_LANDMARKS;

/// Spine lean (degrees) at which the spine sub-score reaches zero
pub const SPINE_TOLERANCE_DEG: f64 = 45.0;

/// Sub-scores below this flag the body region as an issue
pub const ISSUE_THRESHOLD: f64 = 0.8;

pub const MAX_REPORTED_ISSUES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostureIssue {
    Spine,
    Shoulders,
    Hips,
}

impl PostureIssue {
    pub const ALL: [PostureIssue; 3] = [
        PostureIssue::Spine,
        PostureIssue::Shoulders,
        PostureIssue::Hips,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PostureIssue::Spine => "spine",
            PostureIssue::Shoulders => "shoulders",
            PostureIssue::Hips => "hips",
        }
    }
}

/// Alignment sub-scores for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameAlignment {
    pub spine: f64,
    pub shoulders: f64,
    pub hips: f64,
}

impl FrameAlignment {
    pub fn from_landmarks(landmarks: &Landmarks) -> Self {
        Self {
            spine: spine_score(landmarks),
            shoulders: shoulder_score(landmarks),
            hips: hip_score(landmarks),
        }
    }

    pub fn overall(&self) -> f64 {
        (self.spine + self.shoulders + self.hips) / 3.0
    }

    pub fn issues(&self) -> impl Iterator<Item = PostureIssue> + '_ {
        PostureIssue::ALL.into_iter().filter(move |issue| {
            let score = match issue {
                PostureIssue::Spine => self.spine,
                PostureIssue::Shoulders => self.shoulders,
                PostureIssue::Hips => self.hips,
            };
            score < ISSUE_THRESHOLD
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentAnalysis {
    pub score: f64,
    pub average_alignment: f64,
    /// Most frequent issues first, at most three
    pub common_issues: Vec<PostureIssue>,
    pub frames_evaluated: usize,
}

impl AlignmentAnalysis {
    pub fn from_frames(frames: &[&PoseFrame]) -> Self {
        let per_frame: Vec<FrameAlignment> = frames
            .iter()
            .filter_map(|f| f.landmarks.as_ref())
            .filter(|l| l.len() >= MIN_LANDMARKS)
            .map(FrameAlignment::from_landmarks)
            .collect();

        if per_frame.is_empty() {
            return Self::default();
        }

        let mut counts = [0usize; 3];
        for frame in &per_frame {
            for issue in frame.issues() {
                counts[issue as usize] += 1;
            }
        }

        let mut common_issues: Vec<(PostureIssue, usize)> = PostureIssue::ALL
            .into_iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .collect();
        // Stable sort keeps spine, shoulders, hips order among ties
        common_issues.sort_by(|a, b| b.1.cmp(&a.1));

        let overall: Vec<f64> = per_frame.iter().map(FrameAlignment::overall).collect();
        let score = stats::mean(&overall).clamp(0.0, 1.0);

        Self {
            score,
            average_alignment: score,
            common_issues: common_issues
                .into_iter()
                .take(MAX_REPORTED_ISSUES)
                .map(|(issue, _)| issue)
                .collect(),
            frames_evaluated: per_frame.len(),
        }
    }
}

fn bounded_penalty(value: f64) -> f64 {
    (1.0 - value.min(1.0)).clamp(0.0, 1.0)
}

/// Spine upright score: full at vertical, zero at [`SPINE_TOLERANCE_DEG`] lean
pub fn spine_score(landmarks: &Landmarks) -> f64 {
    bounded_penalty(spine_deviation(landmarks) / SPINE_TOLERANCE_DEG)
}

/// Level score from the vertical offset between two paired landmarks
fn level_score(landmarks: &Landmarks, left: PoseLandmark, right: PoseLandmark) -> f64 {
    match (landmarks.get(left), landmarks.get(right)) {
        (Some(l), Some(r)) => bounded_penalty((l.y - r.y).abs() * 10.0),
        _ => 0.0,
    }
}

pub fn shoulder_level_score(landmarks: &Landmarks) -> f64 {
    level_score(landmarks, PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder)
}

pub fn hip_level_score(landmarks: &Landmarks) -> f64 {
    level_score(landmarks, PoseLandmark::LeftHip, PoseLandmark::RightHip)
}

/// Shoulders dropped away from the head score higher
fn shoulder_relaxation_score(landmarks: &Landmarks) -> f64 {
    match (
        landmarks.get(PoseLandmark::LeftShoulder),
        landmarks.get(PoseLandmark::Nose),
    ) {
        (Some(shoulder), Some(nose)) => ((shoulder.y - nose.y).abs() * 5.0).min(1.0),
        _ => 0.0,
    }
}

/// Mean of shoulder levelness and relaxation
pub fn shoulder_score(landmarks: &Landmarks) -> f64 {
    (shoulder_level_score(landmarks) + shoulder_relaxation_score(landmarks)) / 2.0
}

/// Mean of hip levelness and hip center stacked under shoulder center
pub fn hip_score(landmarks: &Landmarks) -> f64 {
    let center_x = |a: PoseLandmark, b: PoseLandmark| -> Option<f64> {
        Some((landmarks.get(a)?.x + landmarks.get(b)?.x) / 2.0)
    };

    let stacking = match (
        center_x(PoseLandmark::LeftHip, PoseLandmark::RightHip),
        center_x(PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder),
    ) {
        (Some(hips), Some(shoulders)) => bounded_penalty((hips - shoulders).abs() * 10.0),
        _ => 0.0,
    };

    (hip_level_score(landmarks) + stacking) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use taichi_core::Landmark;

    fn upright_landmarks() -> Vec<Landmark> {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); PoseLandmark::COUNT];
        let mut set = |lm: PoseLandmark, x: f64, y: f64| {
            points[lm.index()] = Landmark::new(x, y, 0.0, 1.0);
        };
        set(PoseLandmark::Nose, 0.5, 0.1);
        set(PoseLandmark::LeftShoulder, 0.45, 0.3);
        set(PoseLandmark::RightShoulder, 0.55, 0.3);
        set(PoseLandmark::LeftHip, 0.46, 0.55);
        set(PoseLandmark::RightHip, 0.54, 0.55);
        points
    }

    #[test]
    fn test_upright_frame_scores_full() {
        let landmarks = Landmarks::new(upright_landmarks());
        let frame = FrameAlignment::from_landmarks(&landmarks);

        assert!((frame.spine - 1.0).abs() < 1e-9);
        assert!((shoulder_level_score(&landmarks) - 1.0).abs() < 1e-9);
        assert!((hip_level_score(&landmarks) - 1.0).abs() < 1e-9);
        assert!((frame.shoulders - 1.0).abs() < 1e-9);
        assert!((frame.hips - 1.0).abs() < 1e-9);
        assert_eq!(frame.issues().count(), 0);
    }

    #[test]
    fn test_tilted_shoulders_reported() {
        let mut points = upright_landmarks();
        points[PoseLandmark::LeftShoulder.index()].y = 0.25;
        points[PoseLandmark::RightShoulder.index()].y = 0.35;
        let frames = vec![PoseFrame::detected(0, 0.0, points)];
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = AlignmentAnalysis::from_frames(&refs);

        assert_eq!(analysis.common_issues, vec![PostureIssue::Shoulders]);
        assert!(analysis.score < 1.0);
    }

    #[test]
    fn test_issues_ordered_by_frequency() {
        let mut leaning = upright_landmarks();
        for lm in [PoseLandmark::LeftShoulder, PoseLandmark::RightShoulder] {
            leaning[lm.index()].x += 0.2;
        }
        let mut uneven_hips = upright_landmarks();
        uneven_hips[PoseLandmark::LeftHip.index()].y = 0.45;

        let frames = vec![
            PoseFrame::detected(0, 0.0, uneven_hips.clone()),
            PoseFrame::detected(1, 0.1, uneven_hips),
            PoseFrame::detected(2, 0.2, leaning),
        ];
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = AlignmentAnalysis::from_frames(&refs);

        assert_eq!(analysis.common_issues[0], PostureIssue::Hips);
        assert!(analysis.common_issues.contains(&PostureIssue::Spine));
        assert!(analysis.common_issues.len() <= MAX_REPORTED_ISSUES);
    }

    #[test]
    fn test_short_frames_are_skipped() {
        let frames = vec![PoseFrame::detected(0, 0.0, vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 20])];
        let refs: Vec<&PoseFrame> = frames.iter().collect();

        let analysis = AlignmentAnalysis::from_frames(&refs);

        assert_eq!(analysis.frames_evaluated, 0);
        assert_eq!(analysis.score, 0.0);
    }
}
