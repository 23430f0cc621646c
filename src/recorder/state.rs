//! Recorder state management
//!
//! Defines the recorder state machine, recording options, and session
//! metadata tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current state of a recorder session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    /// No session in progress
    Idle,
    /// Actively buffering captured media
    Recording,
    /// Stop requested, waiting for the engine to flush
    Finalizing,
    /// A capture step failed
    Error,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Media container class requested from the recording engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    Gif,
}

/// Configuration handed to the recording engine when a session starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderOptions {
    /// Media class to record
    pub media_type: MediaType,

    /// Container/mime type of the produced artifact
    pub mime_type: String,

    /// Suppress engine-internal logging
    pub disable_logs: bool,

    /// How often internal buffers flush, in milliseconds
    pub time_slice_ms: u64,

    /// Overall target bitrate
    pub bits_per_second: u32,

    /// Video track target bitrate
    pub video_bits_per_second: u32,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            media_type: MediaType::Video,
            mime_type: "video/webm".to_string(),
            disable_logs: true,
            time_slice_ms: 1_000,
            bits_per_second: 128_000,
            video_bits_per_second: 128_000,
        }
    }
}

/// Metadata for one recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Session identifier
    pub id: Uuid,

    /// Wall-clock time the session started
    pub started_at: DateTime<Utc>,

    /// Wall-clock time the session finalized
    pub ended_at: Option<DateTime<Utc>>,

    /// Total session duration in milliseconds
    pub duration_ms: u64,
}

impl SessionInfo {
    /// Create a session starting now
    pub fn begin() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: 0,
        }
    }

    /// Close the session
    pub fn end(&mut self) {
        let now = Utc::now();
        self.duration_ms = (now - self.started_at).num_milliseconds().max(0) as u64;
        self.ended_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_recording_profile() {
        let options = RecorderOptions::default();
        assert_eq!(options.media_type, MediaType::Video);
        assert_eq!(options.mime_type, "video/webm");
        assert!(options.disable_logs);
        assert_eq!(options.time_slice_ms, 1_000);
        assert_eq!(options.bits_per_second, 128_000);
        assert_eq!(options.video_bits_per_second, 128_000);
    }

    #[test]
    fn ending_a_session_stamps_duration() {
        let mut session = SessionInfo::begin();
        assert!(session.ended_at.is_none());

        session.end();
        assert!(session.ended_at.is_some());
        assert!(session.ended_at.unwrap() >= session.started_at);
    }
}
