//! # Taichi-Form
//!
//! Tai Chi form assessment over pose landmark sequences.
//!
//! ## Principles
//!
//! A recording is scored on four principles, each in [0, 1]:
//!
//! - **Balance** - torso center of mass held over the base of support
//! - **Fluidity** - low jerk along the hands' smoothed paths
//! - **Alignment** - upright spine, level and relaxed shoulders, stacked hips
//! - **Timing** - steady speed and evenly placed pauses
//!
//! The weighted sum (0.30 / 0.25 / 0.25 / 0.20 by default) gives the overall
//! score and its quality tier. Rule-based feedback is derived from the
//! individual extractor outputs.
//!
//! ## Entry points
//!
//! [`FormAnalyzer`] exposes sequence analysis, single-frame real-time
//! feedback, and comparison against a [`FormCatalog`] entry, along with
//! frame-by-frame live sessions.

pub mod alignment;
pub mod analyzer;
pub mod balance;
pub mod config;
pub mod feedback;
pub mod fluidity;
pub mod frames;
pub mod job;
pub mod motion;
pub mod realtime;
pub mod reference;
pub mod scoring;
pub mod timing;

pub use alignment::{AlignmentAnalysis, FrameAlignment, PostureIssue};
pub use analyzer::*;
pub use balance::BalanceAnalysis;
pub use config::*;
pub use feedback::generate_feedback;
pub use fluidity::{FluidityAnalysis, JointSmoothness};
pub use frames::{extract_key_frames, filter_by_confidence, valid_frames, SequenceSummary};
pub use job::{JobRecord, JobStatus};
pub use motion::{MotionBuffer, MotionPatterns, MotionSnapshot};
pub use realtime::{evaluate_frame, RealtimeFeedback};
pub use reference::{
    compare_with_reference, ComparisonResult, Difficulty, FormCatalog, FormReference, FormStyle,
    FrameSimilarity, JointAngles, KeyPose,
};
pub use scoring::{Principle, PrincipleScores, QualityLevel};
pub use timing::{PauseEvaluation, TimingAnalysis};
