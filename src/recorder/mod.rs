//! Recording system module
//!
//! Owns the lifecycle of a recording session built on an acquired stream:
//! - RecordingEngine/RecordingBackend seam for the underlying capture engine
//! - RecorderController state machine (idle -> recording -> finalizing -> idle)
//! - Session metadata tracking

pub mod controller;
pub mod engine;
pub mod state;

pub use controller::{FinishedRecording, RecorderController};
pub use engine::{RawArtifact, RecordError, RecordResult, RecordingBackend, RecordingEngine};
pub use state::{MediaType, RecorderOptions, RecorderState, SessionInfo};
