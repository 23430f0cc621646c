//! Transcoding engine seam
//!
//! The engine is an opaque external service: load it once, stage input bytes
//! in its virtual filesystem, run it with command-line-style arguments, and
//! read the produced bytes back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the transcoding layer
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("engine failed to load: {0}")]
    EngineLoad(String),

    #[error("engine not loaded")]
    NotLoaded,

    #[error("engine run failed: {0}")]
    Run(String),

    #[error("sandbox violation: {0}")]
    Sandbox(String),

    #[error("engine produced no output: {0}")]
    MissingOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for transcoding operations
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// One diagnostic line emitted by the engine
#[derive(Debug, Clone)]
pub struct EngineLogLine {
    /// Engine-defined category ("info", "fferr", ...)
    pub category: String,
    pub message: String,
}

/// Observer for engine log lines
pub type LogHandler = Box<dyn Fn(EngineLogLine) + Send + Sync>;

/// Engine-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Forward engine log lines to the registered observer
    pub log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { log: false }
    }
}

/// Transcoding engine collaborator.
///
/// Loading is a one-time asynchronous operation; `run` is not reentrant and
/// callers must serialize invocations.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Fetch/initialize the engine. Idempotent after success.
    async fn load(&self) -> TranscodeResult<()>;

    fn is_loaded(&self) -> bool;

    /// Stage bytes into the engine's virtual filesystem.
    fn write_file(&self, name: &str, bytes: &[u8]) -> TranscodeResult<()>;

    /// Invoke the engine with command-line-style arguments.
    async fn run(&self, args: &[String]) -> TranscodeResult<()>;

    /// Read produced bytes back out of the virtual filesystem.
    fn read_file(&self, name: &str) -> TranscodeResult<Vec<u8>>;

    /// Register the observer for engine log lines.
    fn set_logger(&self, handler: LogHandler);
}
