//! Weighted aggregation of principle scores and quality tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{PrincipleWeights, QualityThresholds};

/// The four assessed Tai Chi principles, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Principle {
    Balance,
    Fluidity,
    Alignment,
    Timing,
}

impl Principle {
    pub const ALL: [Principle; 4] = [
        Principle::Balance,
        Principle::Fluidity,
        Principle::Alignment,
        Principle::Timing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Principle::Balance => "balance",
            Principle::Fluidity => "fluidity",
            Principle::Alignment => "alignment",
            Principle::Timing => "timing",
        }
    }
}

impl fmt::Display for Principle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One score per principle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PrincipleScores {
    pub balance: f64,
    pub fluidity: f64,
    pub alignment: f64,
    pub timing: f64,
}

impl PrincipleScores {
    pub fn get(&self, principle: Principle) -> f64 {
        match principle {
            Principle::Balance => self.balance,
            Principle::Fluidity => self.fluidity,
            Principle::Alignment => self.alignment,
            Principle::Timing => self.timing,
        }
    }

    /// Weighted sum, clamped to [0, 1]
    pub fn weighted(&self, weights: &PrincipleWeights) -> f64 {
        let overall = self.balance * weights.balance
            + self.fluidity * weights.fluidity
            + self.alignment * weights.alignment
            + self.timing * weights.timing;
        overall.clamp(0.0, 1.0)
    }

    /// Highest scoring principle; earlier principles win ties
    pub fn best(&self) -> (Principle, f64) {
        Principle::ALL
            .iter()
            .map(|&p| (p, self.get(p)))
            .fold((Principle::Balance, f64::NEG_INFINITY), |best, current| {
                if current.1 > best.1 {
                    current
                } else {
                    best
                }
            })
    }
}

/// Categorical grade derived from an overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl QualityLevel {
    pub fn from_score(score: f64, thresholds: &QualityThresholds) -> Self {
        if score >= thresholds.excellent {
            QualityLevel::Excellent
        } else if score >= thresholds.good {
            QualityLevel::Good
        } else if score >= thresholds.fair {
            QualityLevel::Fair
        } else {
            QualityLevel::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Excellent",
            QualityLevel::Good => "Good",
            QualityLevel::Fair => "Fair",
            QualityLevel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_overall() {
        let scores = PrincipleScores {
            balance: 1.0,
            fluidity: 0.5,
            alignment: 0.5,
            timing: 0.0,
        };
        let overall = scores.weighted(&PrincipleWeights::default());
        assert!((overall - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_quality_tiers() {
        let t = QualityThresholds::default();
        assert_eq!(QualityLevel::from_score(0.95, &t), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(0.90, &t), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(0.75, &t), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(0.60, &t), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_score(0.59, &t), QualityLevel::NeedsImprovement);
    }

    #[test]
    fn test_quality_label_serialization() {
        let json = serde_json::to_string(&QualityLevel::NeedsImprovement).unwrap();
        assert_eq!(json, "\"Needs Improvement\"");
    }

    #[test]
    fn test_best_principle_tie_goes_to_first() {
        let scores = PrincipleScores {
            balance: 0.7,
            fluidity: 0.9,
            alignment: 0.9,
            timing: 0.2,
        };
        assert_eq!(scores.best(), (Principle::Fluidity, 0.9));
    }
}
