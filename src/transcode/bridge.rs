//! Transcoder bridge
//!
//! Feeds a finished recording artifact through the engine: lazy single-flight
//! load, stage input, run with `-i {stem}.webm <extra-args> recording.gif`,
//! read the GIF back.

use super::engine::{LogHandler, TranscodeEngine, TranscodeError, TranscodeResult};
use crate::recorder::RawArtifact;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed output name inside the engine filesystem; the output container is
/// determined by this extension, not by the caller's filename stem.
const OUTPUT_NAME: &str = "recording.gif";
const OUTPUT_MIME: &str = "image/gif";

/// Artifact ready for saving, with its target filename.
#[derive(Debug, Clone)]
pub struct FinalArtifact {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

impl FinalArtifact {
    /// Wrap a raw recording unchanged, for when transcoding is skipped.
    pub fn passthrough(artifact: RawArtifact, stem: &str) -> Self {
        Self {
            bytes: artifact.bytes,
            mime_type: artifact.mime_type,
            filename: format!("{stem}.webm"),
        }
    }
}

enum LoadState {
    Idle,
    Loaded,
    /// Load failed; the bridge is terminal and never retries.
    Failed(String),
}

/// Bridges finished recordings into the shared engine instance.
pub struct TranscoderBridge {
    engine: Arc<dyn TranscodeEngine>,
    load_state: Mutex<LoadState>,
}

impl TranscoderBridge {
    pub fn new(engine: Arc<dyn TranscodeEngine>) -> Self {
        Self {
            engine,
            load_state: Mutex::new(LoadState::Idle),
        }
    }

    /// Register the observer for engine log lines.
    pub fn set_logger(&self, handler: LogHandler) {
        self.engine.set_logger(handler);
    }

    /// Await the memoized engine load, performing it if not yet started.
    ///
    /// Concurrent requesters block on the state lock and observe the first
    /// caller's outcome rather than triggering duplicate loads.
    async fn ensure_loaded(&self) -> TranscodeResult<()> {
        let mut state = self.load_state.lock().await;
        match &*state {
            LoadState::Loaded => Ok(()),
            LoadState::Failed(message) => Err(TranscodeError::EngineLoad(message.clone())),
            LoadState::Idle => {
                if self.engine.is_loaded() {
                    *state = LoadState::Loaded;
                    return Ok(());
                }
                tracing::info!("loading transcoding engine");
                match self.engine.load().await {
                    Ok(()) => {
                        *state = LoadState::Loaded;
                        Ok(())
                    }
                    Err(err) => {
                        tracing::error!("engine load failed: {err}");
                        *state = LoadState::Failed(err.to_string());
                        Err(err)
                    }
                }
            }
        }
    }

    /// Convert a finished recording into a GIF artifact.
    ///
    /// An absent artifact resolves to `None` without touching the engine.
    pub async fn transcode(
        &self,
        artifact: Option<RawArtifact>,
        stem: &str,
        args: &str,
    ) -> TranscodeResult<Option<FinalArtifact>> {
        let Some(artifact) = artifact else {
            return Ok(None);
        };

        self.ensure_loaded().await?;

        let input_name = format!("{stem}.webm");
        self.engine.write_file(&input_name, &artifact.bytes)?;

        let mut run_args = vec!["-i".to_string(), input_name];
        run_args.extend(tokenize_args(args));
        run_args.push(OUTPUT_NAME.to_string());

        tracing::debug!("running engine: {:?}", run_args);
        self.engine.run(&run_args).await?;

        let bytes = self.engine.read_file(OUTPUT_NAME)?;
        Ok(Some(FinalArtifact {
            bytes,
            mime_type: OUTPUT_MIME.to_string(),
            filename: format!("{stem}.gif"),
        }))
    }
}

/// Split a comma-separated extra-argument string into discrete engine
/// arguments. An empty string yields none.
pub fn tokenize_args(args: &str) -> Vec<String> {
    args.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex as SyncMutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeEngine {
        loaded: AtomicBool,
        load_calls: AtomicUsize,
        fail_load: AtomicBool,
        fail_run: AtomicBool,
        files: SyncMutex<HashMap<String, Vec<u8>>>,
        runs: SyncMutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl TranscodeEngine for FakeEngine {
        async fn load(&self) -> TranscodeResult<()> {
            self.load_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(TranscodeError::EngineLoad("core fetch failed".into()));
            }
            self.loaded.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_loaded(&self) -> bool {
            self.loaded.load(Ordering::SeqCst)
        }

        fn write_file(&self, name: &str, bytes: &[u8]) -> TranscodeResult<()> {
            self.files.lock().insert(name.to_string(), bytes.to_vec());
            Ok(())
        }

        async fn run(&self, args: &[String]) -> TranscodeResult<()> {
            self.runs.lock().push(args.to_vec());
            if self.fail_run.load(Ordering::SeqCst) {
                return Err(TranscodeError::Run("conversion failed".into()));
            }
            self.files
                .lock()
                .insert("recording.gif".to_string(), b"GIF89a".to_vec());
            Ok(())
        }

        fn read_file(&self, name: &str) -> TranscodeResult<Vec<u8>> {
            self.files
                .lock()
                .get(name)
                .cloned()
                .ok_or_else(|| TranscodeError::MissingOutput(name.to_string()))
        }

        fn set_logger(&self, _handler: LogHandler) {}
    }

    fn artifact() -> RawArtifact {
        RawArtifact::new(vec![0xde, 0xad], "video/webm")
    }

    #[test]
    fn tokenize_splits_on_commas() {
        assert_eq!(tokenize_args("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(
            tokenize_args("-vf,scale=320:-1"),
            vec!["-vf", "scale=320:-1"]
        );
    }

    #[test]
    fn tokenize_empty_yields_no_arguments() {
        assert!(tokenize_args("").is_empty());
        assert!(tokenize_args("  ").is_empty());
        assert_eq!(tokenize_args("a,,b"), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn absent_artifact_is_a_noop() {
        let engine = Arc::new(FakeEngine::default());
        let bridge = TranscoderBridge::new(engine.clone());

        let result = bridge.transcode(None, "recording", "").await.unwrap();
        assert!(result.is_none());
        assert_eq!(engine.load_calls.load(Ordering::SeqCst), 0);
        assert!(engine.runs.lock().is_empty());
    }

    #[tokio::test]
    async fn engine_receives_the_fixed_argument_shape() {
        let engine = Arc::new(FakeEngine::default());
        let bridge = TranscoderBridge::new(engine.clone());

        let result = bridge
            .transcode(Some(artifact()), "demo", "-vf,scale=320:-1")
            .await
            .unwrap()
            .unwrap();

        let runs = engine.runs.lock();
        assert_eq!(
            runs[0],
            vec!["-i", "demo.webm", "-vf", "scale=320:-1", "recording.gif"]
        );
        assert_eq!(result.filename, "demo.gif");
        assert_eq!(result.mime_type, "image/gif");
        assert_eq!(result.bytes, b"GIF89a");
        assert!(engine.files.lock().contains_key("demo.webm"));
    }

    #[tokio::test]
    async fn empty_args_invoke_with_no_extras() {
        let engine = Arc::new(FakeEngine::default());
        let bridge = TranscoderBridge::new(engine.clone());

        bridge
            .transcode(Some(artifact()), "recording", "")
            .await
            .unwrap();

        let runs = engine.runs.lock();
        assert_eq!(runs[0], vec!["-i", "recording.webm", "recording.gif"]);
    }

    #[tokio::test]
    async fn load_happens_exactly_once() {
        let engine = Arc::new(FakeEngine::default());
        let bridge = TranscoderBridge::new(engine.clone());

        bridge
            .transcode(Some(artifact()), "recording", "")
            .await
            .unwrap();
        bridge
            .transcode(Some(artifact()), "recording", "")
            .await
            .unwrap();

        assert_eq!(engine.load_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_failure_is_terminal() {
        let engine = Arc::new(FakeEngine::default());
        engine.fail_load.store(true, Ordering::SeqCst);
        let bridge = TranscoderBridge::new(engine.clone());

        let first = bridge.transcode(Some(artifact()), "recording", "").await;
        assert!(matches!(first, Err(TranscodeError::EngineLoad(_))));

        // the fault is cleared, but the bridge must not retry
        engine.fail_load.store(false, Ordering::SeqCst);
        let second = bridge.transcode(Some(artifact()), "recording", "").await;
        assert!(matches!(second, Err(TranscodeError::EngineLoad(_))));
        assert_eq!(engine.load_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_failure_propagates() {
        let engine = Arc::new(FakeEngine::default());
        engine.fail_run.store(true, Ordering::SeqCst);
        let bridge = TranscoderBridge::new(engine.clone());

        let result = bridge.transcode(Some(artifact()), "recording", "").await;
        assert!(matches!(result, Err(TranscodeError::Run(_))));
    }

    #[test]
    fn passthrough_keeps_bytes_and_mime() {
        let final_artifact = FinalArtifact::passthrough(artifact(), "demo");
        assert_eq!(final_artifact.filename, "demo.webm");
        assert_eq!(final_artifact.mime_type, "video/webm");
        assert_eq!(final_artifact.bytes, vec![0xde, 0xad]);
    }
}
