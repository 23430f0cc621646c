//! Capture trait definitions
//!
//! Platform-agnostic seam for capture sources. The embedding shell provides
//! the concrete `StreamSource` (browser `getUserMedia`/`getDisplayMedia`,
//! a native device layer, or a test double); the core only sees handles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors reported while acquiring a capture stream
#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("capture backend error: {0}")]
    Backend(String),
}

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// What kind of source to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    /// Webcam capture
    Camera,
    /// Screen/display capture
    Display,
}

/// Constraints passed to the capture prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConstraints {
    /// Whether to request an audio track alongside video
    pub audio: bool,

    /// Requested frame width in pixels
    pub width: Option<u32>,

    /// Requested frame height in pixels
    pub height: Option<u32>,

    /// Requested frame rate in Hz
    pub frame_rate: Option<u32>,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            audio: false,
            width: None,
            height: None,
            frame_rate: None,
        }
    }
}

/// Live reference to a capture device's audio/video feed.
///
/// Cloning shares the underlying liveness flag: releasing any clone stops
/// the tracks for all of them.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    id: Uuid,
    kind: CaptureKind,
    has_audio: bool,
    live: Arc<AtomicBool>,
}

impl StreamHandle {
    pub fn new(kind: CaptureKind, has_audio: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            has_audio,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    /// Whether the underlying tracks are still running
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Stop the underlying tracks. Idempotent.
    pub fn release(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            tracing::debug!("stream {} released", self.id);
        }
    }
}

/// Device capture API collaborator.
///
/// Must only be invoked in direct response to a user gesture; callers do not
/// pre-fetch streams.
#[async_trait]
pub trait StreamSource: Send + Sync {
    async fn request_stream(
        &self,
        kind: CaptureKind,
        constraints: &StreamConstraints,
    ) -> CaptureResult<StreamHandle>;
}
