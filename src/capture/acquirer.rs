//! Stream acquisition state machine
//!
//! Tracks whether a live stream is held and routes acquisition failures into
//! a terminal error slot the orchestrator can funnel upward.

use super::traits::{
    CaptureError, CaptureKind, CaptureResult, StreamConstraints, StreamHandle, StreamSource,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Acquisition state of the stream acquirer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamState {
    /// No stream held
    NoStream,
    /// A live stream is held
    HasStream,
    /// The last acquisition attempt failed
    Error,
}

impl Default for StreamState {
    fn default() -> Self {
        Self::NoStream
    }
}

/// Owns the currently acquired stream, if any.
pub struct StreamAcquirer {
    source: Arc<dyn StreamSource>,
    state: StreamState,
    stream: Option<StreamHandle>,
    error: Option<CaptureError>,
}

impl StreamAcquirer {
    pub fn new(source: Arc<dyn StreamSource>) -> Self {
        Self {
            source,
            state: StreamState::NoStream,
            stream: None,
            error: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stream(&self) -> Option<&StreamHandle> {
        self.stream.as_ref()
    }

    pub fn last_error(&self) -> Option<&CaptureError> {
        self.error.as_ref()
    }

    /// Prompt for a fresh stream.
    ///
    /// A previously held stream is released first so repeated acquisition
    /// cannot leak capture devices. No dedup: calling again while a stream is
    /// held always prompts for a new one.
    pub async fn acquire(
        &mut self,
        kind: CaptureKind,
        constraints: &StreamConstraints,
    ) -> CaptureResult<StreamHandle> {
        if let Some(previous) = self.stream.take() {
            tracing::debug!("releasing previous stream {} before reacquiring", previous.id());
            previous.release();
            self.state = StreamState::NoStream;
        }

        match self.source.request_stream(kind, constraints).await {
            Ok(handle) => {
                tracing::info!("acquired {:?} stream {}", kind, handle.id());
                self.state = StreamState::HasStream;
                self.error = None;
                self.stream = Some(handle.clone());
                Ok(handle)
            }
            Err(err) => {
                tracing::error!("stream acquisition failed: {err}");
                self.state = StreamState::Error;
                self.stream = None;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Release the held stream, if any, and return to `NoStream`.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.release();
        }
        if self.state == StreamState::HasStream {
            self.state = StreamState::NoStream;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct ScriptedSource {
        outcomes: Mutex<Vec<CaptureResult<()>>>,
        issued: Mutex<Vec<StreamHandle>>,
    }

    impl ScriptedSource {
        fn new(outcomes: Vec<CaptureResult<()>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                issued: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl StreamSource for ScriptedSource {
        async fn request_stream(
            &self,
            kind: CaptureKind,
            constraints: &StreamConstraints,
        ) -> CaptureResult<StreamHandle> {
            let mut outcomes = self.outcomes.lock();
            match outcomes.remove(0) {
                Ok(()) => {
                    let handle = StreamHandle::new(kind, constraints.audio);
                    self.issued.lock().push(handle.clone());
                    Ok(handle)
                }
                Err(err) => Err(err),
            }
        }
    }

    #[tokio::test]
    async fn grant_transitions_to_has_stream() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(())]));
        let mut acquirer = StreamAcquirer::new(source);

        let handle = acquirer
            .acquire(CaptureKind::Camera, &StreamConstraints::default())
            .await
            .unwrap();

        assert_eq!(acquirer.state(), StreamState::HasStream);
        assert!(handle.is_live());
        assert!(acquirer.last_error().is_none());
    }

    #[tokio::test]
    async fn denial_is_terminal_and_recorded() {
        let source = Arc::new(ScriptedSource::new(vec![Err(
            CaptureError::PermissionDenied("user dismissed the prompt".into()),
        )]));
        let mut acquirer = StreamAcquirer::new(source);

        let err = acquirer
            .acquire(CaptureKind::Camera, &StreamConstraints::default())
            .await
            .unwrap_err();

        assert!(matches!(err, CaptureError::PermissionDenied(_)));
        assert_eq!(acquirer.state(), StreamState::Error);
        assert!(acquirer.stream().is_none());
        assert!(acquirer.last_error().is_some());
    }

    #[tokio::test]
    async fn reacquire_releases_the_previous_stream() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(()), Ok(())]));
        let mut acquirer = StreamAcquirer::new(source.clone());

        let first = acquirer
            .acquire(CaptureKind::Display, &StreamConstraints::default())
            .await
            .unwrap();
        let second = acquirer
            .acquire(CaptureKind::Display, &StreamConstraints::default())
            .await
            .unwrap();

        assert!(!first.is_live());
        assert!(second.is_live());
        assert_ne!(first.id(), second.id());
        assert_eq!(source.issued.lock().len(), 2);
    }

    #[tokio::test]
    async fn retry_after_denial_prompts_again() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(CaptureError::DeviceUnavailable("no camera".into())),
            Ok(()),
        ]));
        let mut acquirer = StreamAcquirer::new(source);

        assert!(acquirer
            .acquire(CaptureKind::Camera, &StreamConstraints::default())
            .await
            .is_err());
        assert!(acquirer
            .acquire(CaptureKind::Camera, &StreamConstraints::default())
            .await
            .is_ok());
        assert_eq!(acquirer.state(), StreamState::HasStream);
    }
}
