//! Transcoding subsystem
//!
//! Converts a finished recording into an animated GIF through an opaque
//! engine collaborator:
//! - TranscodeEngine seam (load/write/run/read/log contract)
//! - TranscoderBridge with lazy, memoized, single-flight engine loading
//! - FfmpegEngine, a concrete engine shelling out to the system ffmpeg

pub mod bridge;
pub mod engine;
pub mod ffmpeg;

pub use bridge::{FinalArtifact, TranscoderBridge};
pub use engine::{
    EngineConfig, EngineLogLine, LogHandler, TranscodeEngine, TranscodeError, TranscodeResult,
};
pub use ffmpeg::FfmpegEngine;
