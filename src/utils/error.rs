//! Error types and handling
//!
//! Every sub-component defines its own error enum; this module funnels them
//! into the application-wide `AppError` and the presentation-facing
//! `ErrorResponse` projection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CaptureError;
use crate::recorder::RecordError;
use crate::save::SaveError;
use crate::transcode::TranscodeError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("recorder error: {0}")]
    Record(#[from] RecordError),

    #[error("transcode error: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("save error: {0}")]
    Save(#[from] SaveError),

    #[error("a recording session is already active")]
    AlreadyActive,

    #[error("no recording in progress")]
    NotRecording,
}

/// Error projection for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let code = match error {
            AppError::Capture(_) => "CAPTURE_ERROR",
            AppError::Record(_) => "RECORD_ERROR",
            AppError::Transcode(_) => "TRANSCODE_ERROR",
            AppError::Save(_) => "SAVE_ERROR",
            AppError::AlreadyActive => "ALREADY_ACTIVE",
            AppError::NotRecording => "NOT_RECORDING",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
