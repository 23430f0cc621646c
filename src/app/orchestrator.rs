//! Application orchestrator
//!
//! One state machine over the whole pipeline: acquire stream, record, stop,
//! transcode, save. Errors from every sub-component funnel into a single
//! error slot; lifecycle changes broadcast to the presentation layer.

use super::options::AppOptions;
use crate::capture::{StreamAcquirer, StreamSource};
use crate::recorder::{RecorderController, RecordingBackend, SessionInfo};
use crate::save::SaveSink;
use crate::transcode::{EngineLogLine, FinalArtifact, TranscodeEngine, TranscoderBridge};
use crate::utils::error::{AppError, AppResult, ErrorResponse};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Top-level application phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Idle, ready to start a session
    Ready,
    /// A session is actively capturing
    Recording,
    /// Stop requested; finalizing, transcoding, and saving
    Processing,
    /// A step failed; reset() returns to Ready
    Error,
}

impl Default for Phase {
    fn default() -> Self {
        Self::Ready
    }
}

/// Snapshot of orchestrator state for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub phase: Phase,
    pub error: Option<ErrorResponse>,
}

/// Lifecycle events broadcast to subscribers
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Recording started
    Started,
    /// Stop requested, processing began
    Stopped,
    /// Artifact written
    Saved(PathBuf),
    /// Conversion failed; nothing was saved
    TranscodeFailed(String),
    /// A step failed and the orchestrator entered the error phase
    Failed(ErrorResponse),
    /// Manual reset back to ready
    Reset,
}

/// Outcome of a completed stop-sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopReport {
    pub session: SessionInfo,

    /// Where the artifact landed, if anything was saved
    pub saved: Option<PathBuf>,

    /// Set when conversion failed and the save was skipped
    pub transcode_error: Option<String>,
}

/// Deduplicated state trace: identical consecutive snapshots are suppressed
/// by comparing serialized representations.
struct StateTrace {
    enabled: bool,
    last: Mutex<Option<String>>,
}

impl StateTrace {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: Mutex::new(None),
        }
    }

    fn observe(&self, snapshot: &AppSnapshot) {
        if !self.enabled {
            return;
        }
        let line = serde_json::to_string(snapshot).unwrap_or_default();
        let mut last = self.last.lock();
        if last.as_deref() == Some(line.as_str()) {
            return;
        }
        tracing::debug!(target: "gifrec::state", state = %line);
        *last = Some(line);
    }
}

/// Composes the sub-components into one recording/transcoding session
/// pipeline with a minimal control surface: `start()`, `stop()`, `reset()`,
/// and the current `{phase, error}` snapshot.
pub struct Orchestrator {
    options: AppOptions,
    acquirer: StreamAcquirer,
    recorder: RecorderController,
    bridge: TranscoderBridge,
    saver: Arc<dyn SaveSink>,
    phase: Arc<RwLock<Phase>>,
    error: Arc<RwLock<Option<ErrorResponse>>>,
    event_tx: broadcast::Sender<AppEvent>,
    trace: StateTrace,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn StreamSource>,
        backend: Arc<dyn RecordingBackend>,
        engine: Arc<dyn TranscodeEngine>,
        saver: Arc<dyn SaveSink>,
        options: AppOptions,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        let bridge = TranscoderBridge::new(engine);
        if options.enable_logging && options.engine.log {
            bridge.set_logger(Box::new(|line: EngineLogLine| {
                tracing::debug!(target: "gifrec::engine", category = %line.category, "{}", line.message);
            }));
        }

        Self {
            trace: StateTrace::new(options.enable_logging),
            acquirer: StreamAcquirer::new(source),
            recorder: RecorderController::new(backend),
            bridge,
            saver,
            options,
            phase: Arc::new(RwLock::new(Phase::Ready)),
            error: Arc::new(RwLock::new(None)),
            event_tx,
        }
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            phase: *self.phase.read(),
            error: self.error.read().clone(),
        }
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Milliseconds of capture so far in the active session
    pub fn duration_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    /// Acquire a stream and begin recording.
    ///
    /// Allowed from `Ready` or `Error` (the retry path); the error slot is
    /// cleared on entry. Any failure along the chain lands in the error
    /// phase with the causing error.
    pub async fn start(&mut self) -> AppResult<()> {
        if !matches!(self.phase(), Phase::Ready | Phase::Error) {
            return Err(AppError::AlreadyActive);
        }
        *self.error.write() = None;
        self.recorder.reset();

        let stream = match self
            .acquirer
            .acquire(self.options.capture_kind, &self.options.constraints)
            .await
        {
            Ok(stream) => stream,
            Err(err) => return Err(self.fail(err.into())),
        };

        if let Err(err) = self.recorder.begin(&stream, &self.options.recorder).await {
            self.acquirer.release();
            return Err(self.fail(err.into()));
        }

        self.set_phase(Phase::Recording);
        let _ = self.event_tx.send(AppEvent::Started);
        Ok(())
    }

    /// Stop recording, then transcode and save the artifact.
    ///
    /// Only allowed from `Recording`. The phase is `Processing` for the
    /// whole finalize/transcode/save stretch and returns to `Ready` once the
    /// save completes. A failed conversion skips the save but still returns
    /// to `Ready`, with the failure reported in the `StopReport` and as a
    /// `TranscodeFailed` event; a failed save lands in the error phase.
    pub async fn stop(&mut self) -> AppResult<StopReport> {
        if self.phase() != Phase::Recording {
            return Err(AppError::NotRecording);
        }
        self.set_phase(Phase::Processing);
        let _ = self.event_tx.send(AppEvent::Stopped);

        let finished = match self.recorder.finish().await {
            Ok(finished) => finished,
            Err(err) => {
                self.acquirer.release();
                return Err(self.fail(err.into()));
            }
        };
        // the session is over; stop the capture tracks
        self.acquirer.release();

        let mut transcode_error = None;
        let final_artifact = if self.options.transcode {
            match self
                .bridge
                .transcode(
                    Some(finished.artifact),
                    &self.options.filename,
                    &self.options.ffmpeg_args,
                )
                .await
            {
                Ok(artifact) => artifact,
                Err(err) => {
                    // the recording already ended, so a failed conversion
                    // skips the save instead of aborting the session; it is
                    // still reported, not silently dropped
                    tracing::warn!("transcode failed, nothing will be saved: {err}");
                    let _ = self
                        .event_tx
                        .send(AppEvent::TranscodeFailed(err.to_string()));
                    transcode_error = Some(err.to_string());
                    None
                }
            }
        } else {
            Some(FinalArtifact::passthrough(
                finished.artifact,
                &self.options.filename,
            ))
        };

        let saved = match final_artifact {
            Some(artifact) => match self.saver.save(&artifact) {
                Ok(path) => {
                    let _ = self.event_tx.send(AppEvent::Saved(path.clone()));
                    Some(path)
                }
                Err(err) => return Err(self.fail(err.into())),
            },
            None => None,
        };

        self.set_phase(Phase::Ready);
        Ok(StopReport {
            session: finished.session,
            saved,
            transcode_error,
        })
    }

    /// Manual reset: `error -> ready`, clearing the error slot.
    pub fn reset(&mut self) {
        self.recorder.reset();
        self.acquirer.release();
        *self.error.write() = None;
        self.set_phase(Phase::Ready);
        let _ = self.event_tx.send(AppEvent::Reset);
    }

    /// Funnel a late sub-component failure into the error slot.
    ///
    /// Last writer wins, including while already in the error phase.
    pub fn report_failure(&self, err: AppError) {
        tracing::error!("component failure: {err}");
        let response = ErrorResponse::from(&err);
        *self.error.write() = Some(response.clone());
        *self.phase.write() = Phase::Error;
        self.trace.observe(&self.snapshot());
        let _ = self.event_tx.send(AppEvent::Failed(response));
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.write() = phase;
        self.trace.observe(&self.snapshot());
    }

    fn fail(&self, err: AppError) -> AppError {
        let response = ErrorResponse::from(&err);
        *self.error.write() = Some(response.clone());
        *self.phase.write() = Phase::Error;
        self.trace.observe(&self.snapshot());
        let _ = self.event_tx.send(AppEvent::Failed(response));
        err
    }
}
