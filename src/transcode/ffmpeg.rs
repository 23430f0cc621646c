//! FFmpeg-backed transcoding engine
//!
//! Concrete `TranscodeEngine` that shells out to the system `ffmpeg` binary.
//! The engine's virtual filesystem is a temporary directory created at load
//! time; file names are confined to it.

use super::engine::{EngineLogLine, LogHandler, TranscodeEngine, TranscodeError, TranscodeResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

pub struct FfmpegEngine {
    binary: String,
    workdir: Mutex<Option<TempDir>>,
    logger: Mutex<Option<LogHandler>>,
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    /// Use a specific binary instead of `ffmpeg` from PATH.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            workdir: Mutex::new(None),
            logger: Mutex::new(None),
        }
    }

    fn emit(&self, category: &str, message: String) {
        if let Some(handler) = &*self.logger.lock() {
            handler(EngineLogLine {
                category: category.to_string(),
                message,
            });
        }
    }

    fn sandbox_path(&self, name: &str) -> TranscodeResult<PathBuf> {
        validate_name(name)?;
        let workdir = self.workdir.lock();
        let dir = workdir.as_ref().ok_or(TranscodeError::NotLoaded)?;
        Ok(dir.path().join(name))
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// File names must stay inside the sandbox: no separators, no traversal,
/// no NUL bytes.
fn validate_name(name: &str) -> TranscodeResult<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.contains("..")
    {
        return Err(TranscodeError::Sandbox(name.to_string()));
    }
    Ok(())
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn load(&self) -> TranscodeResult<()> {
        let output = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                TranscodeError::EngineLoad(format!("failed to launch {}: {e}", self.binary))
            })?;

        if !output.status.success() {
            return Err(TranscodeError::EngineLoad(format!(
                "{} -version exited with {}",
                self.binary, output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or("unknown version")
            .to_string();
        tracing::info!("transcoding engine ready: {version}");
        self.emit("info", version);

        *self.workdir.lock() = Some(TempDir::new()?);
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.workdir.lock().is_some()
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> TranscodeResult<()> {
        let path = self.sandbox_path(name)?;
        std::fs::write(&path, bytes)?;
        tracing::debug!("staged {} bytes as {name}", bytes.len());
        Ok(())
    }

    async fn run(&self, args: &[String]) -> TranscodeResult<()> {
        let workdir = {
            let guard = self.workdir.lock();
            guard
                .as_ref()
                .map(|d| d.path().to_path_buf())
                .ok_or(TranscodeError::NotLoaded)?
        };

        let output = Command::new(&self.binary)
            .args(["-hide_banner", "-y"])
            .args(args)
            .current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| TranscodeError::Run(format!("failed to spawn {}: {e}", self.binary)))?;

        // ffmpeg reports progress and diagnostics on stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            self.emit("fferr", line.to_string());
        }

        if !output.status.success() {
            let detail = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("no diagnostic output");
            return Err(TranscodeError::Run(format!(
                "{} exited with {}: {detail}",
                self.binary, output.status
            )));
        }
        Ok(())
    }

    fn read_file(&self, name: &str) -> TranscodeResult<Vec<u8>> {
        let path = self.sandbox_path(name)?;
        if !path.exists() {
            return Err(TranscodeError::MissingOutput(name.to_string()));
        }
        Ok(std::fs::read(&path)?)
    }

    fn set_logger(&self, handler: LogHandler) {
        *self.logger.lock() = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_with_traversal_are_rejected() {
        assert!(validate_name("recording.webm").is_ok());
        assert!(validate_name("recording.gif").is_ok());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a/b.webm").is_err());
        assert!(validate_name("a\\b.webm").is_err());
        assert!(validate_name("nul\0byte").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn filesystem_access_requires_load() {
        let engine = FfmpegEngine::new();
        assert!(!engine.is_loaded());
        assert!(matches!(
            engine.write_file("in.webm", b"bytes"),
            Err(TranscodeError::NotLoaded)
        ));
        assert!(matches!(
            engine.read_file("recording.gif"),
            Err(TranscodeError::NotLoaded)
        ));
    }

    #[tokio::test]
    async fn load_failure_reports_the_binary() {
        let engine = FfmpegEngine::with_binary("definitely-not-ffmpeg-on-this-host");
        let err = engine.load().await.unwrap_err();
        match err {
            TranscodeError::EngineLoad(message) => {
                assert!(message.contains("definitely-not-ffmpeg-on-this-host"));
            }
            other => panic!("expected EngineLoad, got {other:?}"),
        }
        assert!(!engine.is_loaded());
    }
}
