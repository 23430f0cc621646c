//! Recording engine seam
//!
//! The recording engine collaborator is constructed per session from a live
//! stream. Finalization is an explicit asynchronous continuation returning
//! the artifact, so failures surface structurally instead of being dropped
//! inside a fire-and-forget callback.

use super::state::RecorderOptions;
use crate::capture::StreamHandle;
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the recording layer
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("no media stream")]
    NoStream,

    #[error("already recording")]
    AlreadyRecording,

    #[error("not recording")]
    NotRecording,

    #[error("recording engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for recording operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Encoded media produced when a recording session finalizes.
///
/// Immutable once produced; ownership moves to the transcoder (or straight
/// to the save sink when transcoding is skipped).
#[derive(Debug, Clone)]
pub struct RawArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl RawArtifact {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// An active recording engine instance, exclusive to one session.
#[async_trait]
pub trait RecordingEngine: Send + Sync {
    /// Begin capture. Buffering continues until `stop`.
    async fn start(&mut self) -> RecordResult<()>;

    /// Flush, finalize, and hand back the finished artifact.
    async fn stop(&mut self) -> RecordResult<RawArtifact>;
}

/// Factory for recording engines; the concrete backend is supplied by the
/// embedding shell (browser MediaRecorder, a native encoder, a test double).
pub trait RecordingBackend: Send + Sync {
    fn open(
        &self,
        stream: &StreamHandle,
        options: &RecorderOptions,
    ) -> RecordResult<Box<dyn RecordingEngine>>;
}
