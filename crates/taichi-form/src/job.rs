//! Processing job record owned by the host application.
//!
//! Analysis functions never touch it; the host advances it around calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use taichi_core::{Error, Result};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Uploaded => "uploaded",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub filename: String,
    pub status: JobStatus,
    /// Percent complete, 0..=100
    pub progress: u8,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(filename: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            status: JobStatus::Uploaded,
            progress: 0,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, allowed_from: &[JobStatus], to: JobStatus) -> Result<()> {
        if !allowed_from.contains(&self.status) {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition(&[JobStatus::Uploaded], JobStatus::Processing)
    }

    /// Update progress while processing; values above 100 are capped
    pub fn set_progress(&mut self, percent: u8) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: JobStatus::Processing.to_string(),
            });
        }
        self.progress = percent.min(100);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(&[JobStatus::Processing], JobStatus::Completed)?;
        self.progress = 100;
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.transition(&[JobStatus::Uploaded, JobStatus::Processing], JobStatus::Error)?;
        self.error = Some(message.into());
        Ok(())
    }
}
