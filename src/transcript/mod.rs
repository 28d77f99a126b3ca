//! Transcript module for briefly
//!
//! Raw transcript records, their cleaned form, and where they come from.

mod normalize;
mod source;

pub use normalize::normalize;
pub use source::{FileSource, TranscriptSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transcript text exactly as retrieved from its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTranscript {
    /// Identifier of the transcript at its source (file path, document id)
    pub source: String,

    /// When the text was retrieved
    pub retrieved_at: DateTime<Utc>,

    /// Unprocessed transcript text
    pub text: String,
}

impl RawTranscript {
    /// Create a transcript retrieved now
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            retrieved_at: Utc::now(),
            text: text.into(),
        }
    }

    /// Decode bytes as UTF-8, replacing invalid sequences
    pub fn from_bytes(source: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(source, String::from_utf8_lossy(bytes).into_owned())
    }

    /// Whether the text looks like WebVTT captions
    pub fn is_webvtt(&self) -> bool {
        self.source.to_lowercase().ends_with(".vtt")
            || self
                .text
                .trim_start_matches('\u{feff}')
                .trim_start()
                .to_uppercase()
                .starts_with("WEBVTT")
    }
}

/// Cleaned transcript text, one `Speaker: text` or plain line per entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTranscript {
    pub source: String,
    pub text: String,
}

impl NormalizedTranscript {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}
