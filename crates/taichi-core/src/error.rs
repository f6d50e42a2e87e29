//! Error types for Tai Chi form analysis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No poses to analyze")]
    NoPoses,

    #[error("No valid poses detected")]
    NoValidPoses,

    #[error("No user poses to compare")]
    NoUserPoses,

    #[error("Insufficient landmarks")]
    InsufficientLandmarks { required: usize, available: usize },

    #[error("Unknown reference form: {0}")]
    UnknownForm(String),

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid filter parameters: {0}")]
    InvalidFilter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Analysis task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// JSON shape returned across the API boundary when an operation is refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

impl From<Error> for ErrorResponse {
    fn from(e: Error) -> Self {
        Self::from(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse::from(Error::NoValidPoses);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"error":"No valid poses detected"}"#);
    }

    #[test]
    fn test_insufficient_landmarks_message() {
        let err = Error::InsufficientLandmarks {
            required: 29,
            available: 12,
        };
        assert_eq!(err.to_string(), "Insufficient landmarks");
    }
}
