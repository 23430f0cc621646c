//! Generic form state for collecting configuration
//!
//! Ordered key/value state used to gather recorder options, transcoder
//! arguments, and the output filename before a session starts. Widgets are
//! described by tagged field descriptors and raw input is parsed by an
//! exhaustive match on the field kind, then resolved into the typed option
//! structs the core consumes.

use crate::app::options::AppOptions;
use crate::recorder::{MediaType, RecorderOptions};
use serde::{Deserialize, Serialize};

/// A collected value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }
}

/// What kind of widget a field is, with kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum FieldKind {
    Text,
    Number,
    Flag,
    Select { options: Vec<String> },
}

/// Describes one form field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Parse raw widget input according to the field's declared kind.
pub fn parse_field(kind: &FieldKind, raw: &str) -> FieldValue {
    match kind {
        FieldKind::Number => FieldValue::Number(raw.parse().unwrap_or(0)),
        FieldKind::Flag => FieldValue::Flag(raw == "true"),
        FieldKind::Select { options } => {
            if options.iter().any(|o| o == raw) {
                FieldValue::Text(raw.to_string())
            } else {
                FieldValue::Text(options.first().cloned().unwrap_or_default())
            }
        }
        FieldKind::Text => match raw {
            "true" => FieldValue::Flag(true),
            "false" => FieldValue::Flag(false),
            _ => FieldValue::Text(raw.to_string()),
        },
    }
}

/// Ordered key -> value form state.
///
/// Insertion order is preserved; setting an existing key overwrites in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionBag {
    entries: Vec<(String, FieldValue)>,
}

impl OptionBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn number(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_i64)
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve recorder options, falling back to defaults for absent keys.
    pub fn resolve_recorder_options(&self) -> RecorderOptions {
        let mut options = RecorderOptions::default();
        if let Some(media_type) = self.text("type") {
            options.media_type = match media_type {
                "audio" => MediaType::Audio,
                "gif" => MediaType::Gif,
                _ => MediaType::Video,
            };
        }
        if let Some(mime_type) = self.text("mimeType") {
            options.mime_type = mime_type.to_string();
        }
        if let Some(disable_logs) = self.flag("disableLogs") {
            options.disable_logs = disable_logs;
        }
        if let Some(time_slice) = self.number("timeSlice") {
            options.time_slice_ms = time_slice.max(0) as u64;
        }
        if let Some(bits) = self.number("bitsPerSecond") {
            options.bits_per_second = bits.max(0) as u32;
        }
        if let Some(bits) = self.number("videoBitsPerSecond") {
            options.video_bits_per_second = bits.max(0) as u32;
        }
        options
    }

    /// Resolve the full orchestrator configuration, nesting recorder options.
    pub fn resolve_app_options(&self) -> AppOptions {
        let mut options = AppOptions::default();
        if let Some(args) = self.text("ffmpegArgs") {
            options.ffmpeg_args = args.to_string();
        }
        if let Some(filename) = self.text("filename") {
            if !filename.is_empty() {
                options.filename = filename.to_string();
            }
        }
        if let Some(enable_logging) = self.flag("enableLogging") {
            options.enable_logging = enable_logging;
        }
        if let Some(transcode) = self.flag("transcode") {
            options.transcode = transcode;
        }
        if let Some(log) = self.flag("ffmpegLog") {
            options.engine.log = log;
        }
        options.recorder = self.resolve_recorder_options();
        options
    }
}
