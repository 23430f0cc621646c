//! Orchestrator configuration
//!
//! Everything the presentation layer resolves before a session starts.

use crate::capture::{CaptureKind, StreamConstraints};
use crate::recorder::RecorderOptions;
use crate::transcode::EngineConfig;
use serde::{Deserialize, Serialize};

/// Filename stem used when the form leaves it blank
pub const DEFAULT_FILENAME: &str = "recording";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOptions {
    /// Comma-separated extra transcoder arguments
    pub ffmpeg_args: String,

    /// Filename stem for the saved artifact (extension is derived)
    pub filename: String,

    /// Emit the deduplicated state trace and engine log lines
    pub enable_logging: bool,

    /// Convert the recording to GIF before saving; when off the raw
    /// recording is saved as-is
    pub transcode: bool,

    /// Which source to prompt for
    pub capture_kind: CaptureKind,

    /// Constraints passed to the capture prompt
    pub constraints: StreamConstraints,

    /// Transcoding engine configuration
    pub engine: EngineConfig,

    /// Recording engine configuration
    pub recorder: RecorderOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            ffmpeg_args: String::new(),
            filename: DEFAULT_FILENAME.to_string(),
            enable_logging: false,
            transcode: true,
            capture_kind: CaptureKind::Camera,
            constraints: StreamConstraints::default(),
            engine: EngineConfig::default(),
            recorder: RecorderOptions::default(),
        }
    }
}
