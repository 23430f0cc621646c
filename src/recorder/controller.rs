//! Recorder controller
//!
//! Drives one recording session at a time over the engine seam:
//! idle -(begin)-> recording -(finish)-> finalizing -> idle, with any step
//! able to divert to the error state instead.

use super::engine::{RawArtifact, RecordError, RecordResult, RecordingBackend, RecordingEngine};
use super::state::{RecorderOptions, RecorderState, SessionInfo};
use crate::capture::StreamHandle;
use std::sync::Arc;
use std::time::Instant;

/// A finalized session: its metadata plus the extracted artifact.
#[derive(Debug, Clone)]
pub struct FinishedRecording {
    pub session: SessionInfo,
    pub artifact: RawArtifact,
}

/// Owns the engine instance and session state for the current recording.
pub struct RecorderController {
    backend: Arc<dyn RecordingBackend>,
    engine: Option<Box<dyn RecordingEngine>>,
    state: RecorderState,
    session: Option<SessionInfo>,
    started: Option<Instant>,
    error: Option<String>,
}

impl RecorderController {
    pub fn new(backend: Arc<dyn RecordingBackend>) -> Self {
        Self {
            backend,
            engine: None,
            state: RecorderState::Idle,
            session: None,
            started: None,
            error: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    /// Message of the most recent engine failure, for the error funnel.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Milliseconds of capture so far in the active session
    pub fn elapsed_ms(&self) -> u64 {
        match self.state {
            RecorderState::Recording | RecorderState::Finalizing => self
                .started
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or(0),
            _ => self
                .session
                .as_ref()
                .map(|s| s.duration_ms)
                .unwrap_or(0),
        }
    }

    /// Open an engine on the stream and start capturing.
    pub async fn begin(
        &mut self,
        stream: &StreamHandle,
        options: &RecorderOptions,
    ) -> RecordResult<()> {
        if matches!(self.state, RecorderState::Recording | RecorderState::Finalizing) {
            return Err(RecordError::AlreadyRecording);
        }
        if !stream.is_live() {
            self.fail("no media stream");
            return Err(RecordError::NoStream);
        }

        let mut engine = match self.backend.open(stream, options) {
            Ok(engine) => engine,
            Err(err) => {
                self.fail(&err.to_string());
                return Err(err);
            }
        };
        if let Err(err) = engine.start().await {
            self.fail(&err.to_string());
            return Err(err);
        }

        let session = SessionInfo::begin();
        tracing::info!(
            "recording started (session {}, {} @ {}ms slices)",
            session.id,
            options.mime_type,
            options.time_slice_ms
        );

        self.engine = Some(engine);
        self.session = Some(session);
        self.started = Some(Instant::now());
        self.state = RecorderState::Recording;
        self.error = None;
        Ok(())
    }

    /// Signal the engine to flush and finalize, then extract the artifact.
    ///
    /// The engine instance is discarded afterwards either way.
    pub async fn finish(&mut self) -> RecordResult<FinishedRecording> {
        if self.state != RecorderState::Recording {
            return Err(RecordError::NotRecording);
        }
        let mut engine = self.engine.take().ok_or(RecordError::NotRecording)?;

        self.state = RecorderState::Finalizing;
        match engine.stop().await {
            Ok(artifact) => {
                let mut session = self.session.take().ok_or(RecordError::NotRecording)?;
                session.end();
                tracing::info!(
                    "recording finished (session {}, {} bytes, {}ms)",
                    session.id,
                    artifact.bytes.len(),
                    session.duration_ms
                );

                self.state = RecorderState::Idle;
                self.started = None;
                // keep the closed session around for reporting
                self.session = Some(session.clone());
                Ok(FinishedRecording { session, artifact })
            }
            Err(err) => {
                self.fail(&err.to_string());
                Err(err)
            }
        }
    }

    /// Leave the error state and become usable again.
    pub fn reset(&mut self) {
        self.engine = None;
        self.session = None;
        self.started = None;
        self.error = None;
        self.state = RecorderState::Idle;
    }

    fn fail(&mut self, message: &str) {
        tracing::error!("recorder error: {message}");
        self.engine = None;
        self.started = None;
        self.state = RecorderState::Error;
        self.error = Some(message.to_string());
    }
}
