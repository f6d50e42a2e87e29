//! Rule-based coaching feedback.
//!
//! Rules run in a fixed order and each may append independently.

use crate::alignment::{AlignmentAnalysis, PostureIssue};
use crate::balance::BalanceAnalysis;
use crate::config::FeedbackThresholds;
use crate::fluidity::FluidityAnalysis;
use crate::scoring::PrincipleScores;
use crate::timing::TimingAnalysis;

pub const BALANCE_ADVICE: &str =
    "Focus on maintaining better balance - keep your center of mass over your base of support";
pub const STABILITY_ADVICE: &str = "Work on stability - minimize unnecessary swaying or shifting";
pub const FLUIDITY_ADVICE: &str =
    "Practice smoother transitions between movements - avoid sudden stops or jerky motions";
pub const CONSISTENCY_ADVICE: &str = "Work on maintaining consistent speed throughout the form";
pub const PACING_ADVICE: &str = "Practice the rhythm and pacing of the movements";

pub fn posture_correction(issue: PostureIssue) -> &'static str {
    match issue {
        PostureIssue::Spine => "Keep your spine more upright and aligned",
        PostureIssue::Shoulders => "Relax your shoulders and keep them level",
        PostureIssue::Hips => "Maintain proper hip alignment throughout the form",
    }
}

/// Extractor outputs the feedback rules read from
pub struct FeedbackInput<'a> {
    pub balance: &'a BalanceAnalysis,
    pub fluidity: &'a FluidityAnalysis,
    pub alignment: &'a AlignmentAnalysis,
    pub timing: &'a TimingAnalysis,
}

impl FeedbackInput<'_> {
    fn scores(&self) -> PrincipleScores {
        PrincipleScores {
            balance: self.balance.score,
            fluidity: self.fluidity.score,
            alignment: self.alignment.score,
            timing: self.timing.score,
        }
    }
}

pub fn generate_feedback(
    input: &FeedbackInput<'_>,
    thresholds: &FeedbackThresholds,
) -> Vec<String> {
    let mut feedback = Vec::new();

    if input.balance.score < thresholds.low_score {
        feedback.push(BALANCE_ADVICE.to_string());
    } else if input.balance.stability < thresholds.low_stability {
        feedback.push(STABILITY_ADVICE.to_string());
    }

    if input.fluidity.score < thresholds.low_score {
        feedback.push(FLUIDITY_ADVICE.to_string());
    }

    if input.alignment.score < thresholds.low_score {
        feedback.extend(
            input
                .alignment
                .common_issues
                .iter()
                .map(|&issue| posture_correction(issue).to_string()),
        );
    }

    if input.timing.score < thresholds.low_score {
        if input.timing.consistency < thresholds.low_consistency {
            feedback.push(CONSISTENCY_ADVICE.to_string());
        } else {
            feedback.push(PACING_ADVICE.to_string());
        }
    }

    let (best, best_score) = input.scores().best();
    if best_score > thresholds.praise {
        feedback.push(format!("Excellent {best}! Keep up the good work"));
    }

    feedback
}
