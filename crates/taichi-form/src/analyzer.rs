//! Form analyzer orchestrating the four principle extractors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use taichi_core::{Error, Landmarks, PoseFrame, Result, SessionId};
use tokio::sync::RwLock;

use crate::alignment::AlignmentAnalysis;
use crate::balance::BalanceAnalysis;
use crate::config::AnalyzerConfig;
use crate::feedback::{generate_feedback, FeedbackInput};
use crate::fluidity::FluidityAnalysis;
use crate::frames::{extract_key_frames, valid_frames, SequenceSummary};
use crate::motion::{MotionBuffer, MotionPatterns};
use crate::realtime::{evaluate_frame, RealtimeFeedback};
use crate::reference::{compare_with_reference, ComparisonResult, FormCatalog};
use crate::scoring::{PrincipleScores, QualityLevel};
use crate::timing::TimingAnalysis;

/// Assessment of one recorded sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub balance: BalanceAnalysis,
    pub fluidity: FluidityAnalysis,
    pub alignment: AlignmentAnalysis,
    pub timing: TimingAnalysis,
    pub feedback: Vec<String>,
    pub quality_level: QualityLevel,
}

impl AnalysisResult {
    fn assemble(
        balance: BalanceAnalysis,
        fluidity: FluidityAnalysis,
        alignment: AlignmentAnalysis,
        timing: TimingAnalysis,
        config: &AnalyzerConfig,
    ) -> Self {
        let scores = PrincipleScores {
            balance: balance.score,
            fluidity: fluidity.score,
            alignment: alignment.score,
            timing: timing.score,
        };
        let overall_score = scores.weighted(&config.weights);

        let feedback = generate_feedback(
            &FeedbackInput {
                balance: &balance,
                fluidity: &fluidity,
                alignment: &alignment,
                timing: &timing,
            },
            &config.feedback,
        );

        Self {
            overall_score,
            balance,
            fluidity,
            alignment,
            timing,
            feedback,
            quality_level: QualityLevel::from_score(overall_score, &config.quality),
        }
    }

    pub fn scores(&self) -> PrincipleScores {
        PrincipleScores {
            balance: self.balance.score,
            fluidity: self.fluidity.score,
            alignment: self.alignment.score,
            timing: self.timing.score,
        }
    }
}

/// Frames collected for a live session
#[derive(Debug, Clone)]
struct Session {
    frames: Vec<PoseFrame>,
    motion: MotionBuffer,
}

/// Tai Chi form analyzer
pub struct FormAnalyzer {
    config: AnalyzerConfig,
    catalog: FormCatalog,
    /// Frame buffer per live session
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl FormAnalyzer {
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            catalog: FormCatalog::builtin(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_catalog(mut self, catalog: FormCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &FormCatalog {
        &self.catalog
    }

    /// Score a complete recording
    pub fn analyze_sequence(&self, frames: &[PoseFrame]) -> Result<AnalysisResult> {
        let valid = self.accept(frames)?;

        let balance = BalanceAnalysis::from_frames(&valid);
        let fluidity = FluidityAnalysis::from_frames(&valid);
        let alignment = AlignmentAnalysis::from_frames(&valid);
        let timing = TimingAnalysis::from_frames(&valid);

        Ok(self.finish(balance, fluidity, alignment, timing))
    }

    /// Same as [`Self::analyze_sequence`], with each extractor on a blocking task
    pub async fn analyze_sequence_concurrent(
        &self,
        frames: Arc<[PoseFrame]>,
    ) -> Result<AnalysisResult> {
        self.accept(&frames)?;

        let balance = {
            let frames = Arc::clone(&frames);
            tokio::task::spawn_blocking(move || {
                BalanceAnalysis::from_frames(&landmark_frames(&frames))
            })
        };
        let fluidity = {
            let frames = Arc::clone(&frames);
            tokio::task::spawn_blocking(move || {
                FluidityAnalysis::from_frames(&landmark_frames(&frames))
            })
        };
        let alignment = {
            let frames = Arc::clone(&frames);
            tokio::task::spawn_blocking(move || {
                AlignmentAnalysis::from_frames(&landmark_frames(&frames))
            })
        };
        let timing = {
            let frames = Arc::clone(&frames);
            tokio::task::spawn_blocking(move || {
                TimingAnalysis::from_frames(&landmark_frames(&frames))
            })
        };

        let (balance, fluidity, alignment, timing) =
            tokio::try_join!(balance, fluidity, alignment, timing)
                .map_err(|e| Error::TaskFailed(e.to_string()))?;

        Ok(self.finish(balance, fluidity, alignment, timing))
    }

    fn accept<'a>(&self, frames: &'a [PoseFrame]) -> Result<Vec<&'a PoseFrame>> {
        match valid_frames(frames) {
            Ok(valid) => {
                tracing::info!(
                    "Analyzing {} valid frames of {}",
                    valid.len(),
                    frames.len()
                );
                Ok(valid)
            }
            Err(e) => {
                tracing::warn!("Sequence analysis refused: {}", e);
                Err(e)
            }
        }
    }

    fn finish(
        &self,
        balance: BalanceAnalysis,
        fluidity: FluidityAnalysis,
        alignment: AlignmentAnalysis,
        timing: TimingAnalysis,
    ) -> AnalysisResult {
        tracing::debug!("Balance score {:.3}", balance.score);
        tracing::debug!("Fluidity score {:.3}", fluidity.score);
        tracing::debug!("Alignment score {:.3}", alignment.score);
        tracing::debug!("Timing score {:.3}", timing.score);

        let result = AnalysisResult::assemble(balance, fluidity, alignment, timing, &self.config);
        tracing::info!(
            "Form analysis complete: overall {:.3} ({})",
            result.overall_score,
            result.quality_level
        );
        result
    }

    /// Advisory check of a single frame
    pub fn get_realtime_feedback(&self, landmarks: &Landmarks) -> Result<RealtimeFeedback> {
        evaluate_frame(landmarks, &self.config.realtime).inspect_err(|e| {
            tracing::warn!("Real-time feedback refused: {}", e);
        })
    }

    /// Compare a recording against a catalog form
    pub fn compare_with_reference(
        &self,
        frames: &[PoseFrame],
        form_id: &str,
    ) -> Result<ComparisonResult> {
        if frames.is_empty() {
            tracing::warn!("Reference comparison refused: no user poses");
            return Err(Error::NoUserPoses);
        }
        let form = self.catalog.get(form_id)?;
        let result = compare_with_reference(frames, form, &self.config.comparison)?;
        tracing::info!(
            "Compared {} frames with {}: similarity {:.3}",
            frames.len(),
            form.id,
            result.average_similarity
        );
        Ok(result)
    }

    pub fn motion_patterns(&self, frames: &[PoseFrame]) -> MotionPatterns {
        MotionPatterns::from_frames(frames, &self.config.motion)
    }

    pub fn summarize(&self, frames: &[PoseFrame]) -> SequenceSummary {
        SequenceSummary::from_frames(frames)
    }

    pub fn key_frames(&self, frames: &[PoseFrame]) -> Vec<usize> {
        extract_key_frames(
            frames,
            self.config.motion.key_frame_motion,
            self.config.motion.key_frame_distance,
        )
    }

    /// Append a frame to a live session; returns the current motion intensity
    pub async fn ingest_frame(&self, session_id: SessionId, frame: PoseFrame) -> f64 {
        let mut sessions = self.sessions.write().await;

        let session = sessions.entry(session_id).or_insert_with(|| Session {
            frames: Vec::new(),
            motion: MotionBuffer::new(self.config.motion.buffer_capacity),
        });

        session.motion.push_frame(&frame);
        session.frames.push(frame);
        session.motion.motion_intensity()
    }

    /// Score everything a live session has collected so far
    pub async fn analyze_session(&self, session_id: SessionId) -> Result<AnalysisResult> {
        let frames: Arc<[PoseFrame]> = {
            let sessions = self.sessions.read().await;
            sessions
                .get(&session_id)
                .map(|s| s.frames.as_slice())
                .unwrap_or_default()
                .into()
        };
        self.analyze_sequence_concurrent(frames).await
    }

    pub async fn session_motion(&self, session_id: SessionId) -> Option<MotionPatterns> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .map(|s| self.motion_patterns(&s.frames))
    }

    pub async fn session_frame_count(&self, session_id: SessionId) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(&session_id).map_or(0, |s| s.frames.len())
    }

    pub async fn active_sessions(&self) -> Vec<SessionId> {
        let sessions = self.sessions.read().await;
        sessions.keys().copied().collect()
    }

    pub async fn clear_session(&self, session_id: SessionId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&session_id);
    }

    pub async fn clear_all(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.clear();
    }
}

impl Default for FormAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn landmark_frames(frames: &[PoseFrame]) -> Vec<&PoseFrame> {
    frames.iter().filter(|f| f.has_landmarks()).collect()
}
