//! Analyzer configuration.

use serde::{Deserialize, Serialize};
use taichi_core::{Error, Result};

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Contribution of each principle to the overall score
    pub weights: PrincipleWeights,

    /// Overall score cut-offs for the quality tiers
    pub quality: QualityThresholds,

    /// Score levels that trigger feedback rules
    pub feedback: FeedbackThresholds,

    /// Single-frame advisory limits
    pub realtime: RealtimeThresholds,

    /// Frame ingestion and motion pattern settings
    pub motion: MotionConfig,

    /// Reference form comparison settings
    pub comparison: ComparisonConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipleWeights {
    pub balance: f64,
    pub fluidity: f64,
    pub alignment: f64,
    pub timing: f64,
}

impl PrincipleWeights {
    pub fn total(&self) -> f64 {
        self.balance + self.fluidity + self.alignment + self.timing
    }
}

impl Default for PrincipleWeights {
    fn default() -> Self {
        Self {
            balance: 0.30,
            fluidity: 0.25,
            alignment: 0.25,
            timing: 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            excellent: 0.90,
            good: 0.75,
            fair: 0.60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackThresholds {
    /// Principle scores below this get corrective advice
    pub low_score: f64,
    /// Balance stability below this gets sway advice
    pub low_stability: f64,
    /// Timing consistency below this gets speed advice instead of pacing advice
    pub low_consistency: f64,
    /// Best principle above this earns praise
    pub praise: f64,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            low_score: 0.7,
            low_stability: 0.6,
            low_consistency: 0.6,
            praise: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealtimeThresholds {
    /// Maximum spine lean from vertical (degrees)
    pub max_spine_deviation_deg: f64,
    pub min_arm_symmetry: f64,
    /// Accepted ankle width relative to shoulder width
    pub min_stance_ratio: f64,
    pub max_stance_ratio: f64,
}

impl Default for RealtimeThresholds {
    fn default() -> Self {
        Self {
            max_spine_deviation_deg: 15.0,
            min_arm_symmetry: 0.8,
            min_stance_ratio: 0.8,
            max_stance_ratio: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Sliding window length in frames (one second at 30 fps)
    pub buffer_capacity: usize,
    /// Center of mass speed below which a frame pair counts as a pause
    pub pause_velocity: f64,
    /// Landmarks above this visibility count as detected
    pub visibility_threshold: f64,
    /// Intensity change that marks a key frame
    pub key_frame_motion: f64,
    /// Minimum spacing between key frames
    pub key_frame_distance: usize,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 30,
            pause_velocity: 0.02,
            visibility_threshold: 0.5,
            key_frame_motion: 0.1,
            key_frame_distance: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Similarity above which a frame matches the reference
    pub match_similarity: f64,
    /// Similarity below which a frame is flagged
    pub low_similarity: f64,
    /// Flagged frames closer than this join one range
    pub group_gap: usize,
    pub max_ranges: usize,
    pub max_best_matches: usize,
    /// Share of flagged frames that makes the whole form the issue
    pub overall_issue_fraction: f64,
    /// Assumed frame rate when converting indices to seconds
    pub assumed_fps: f64,
    /// Angle difference (degrees) at which key pose similarity halves
    pub angle_tolerance_deg: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            match_similarity: 0.85,
            low_similarity: 0.7,
            group_gap: 5,
            max_ranges: 3,
            max_best_matches: 10,
            overall_issue_fraction: 0.3,
            assumed_fps: 30.0,
            angle_tolerance_deg: 30.0,
        }
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            weights: PrincipleWeights::default(),
            quality: QualityThresholds::default(),
            feedback: FeedbackThresholds::default(),
            realtime: RealtimeThresholds::default(),
            motion: MotionConfig::default(),
            comparison: ComparisonConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from file, overridden by `TAICHI_` environment variables
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?)
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("TAICHI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?)
            .add_source(
                config::Environment::with_prefix("TAICHI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_error)?;

        let config: Self = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let total = self.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "principle weights must sum to 1.0, got {total}"
            )));
        }

        let q = &self.quality;
        if !(q.excellent >= q.good && q.good >= q.fair && q.fair >= 0.0 && q.excellent <= 1.0) {
            return Err(Error::Config(
                "quality thresholds must satisfy 1 >= excellent >= good >= fair >= 0".to_string(),
            ));
        }

        let r = &self.realtime;
        if r.min_stance_ratio > r.max_stance_ratio {
            return Err(Error::Config("stance ratio range is inverted".to_string()));
        }

        if self.motion.buffer_capacity == 0 {
            return Err(Error::Config("motion buffer capacity must be positive".to_string()));
        }

        if self.comparison.assumed_fps <= 0.0 {
            return Err(Error::Config("assumed fps must be positive".to_string()));
        }

        Ok(())
    }
}

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}
