//! Transcript sources

use std::path::{Path, PathBuf};

use crate::transcript::RawTranscript;
use crate::{BrieflyError, Result};

/// Supplies raw transcript text for an identifier
pub trait TranscriptSource {
    fn fetch(&self, id: &str) -> Result<RawTranscript>;
}

/// Reads `.txt` and `.vtt` transcripts from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative identifiers against `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let path = Path::new(id);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl TranscriptSource for FileSource {
    fn fetch(&self, id: &str) -> Result<RawTranscript> {
        let path = self.resolve(id);
        if !path.is_file() {
            return Err(BrieflyError::Source(format!(
                "Transcript not found: {}",
                path.display()
            )));
        }

        let bytes = std::fs::read(&path)?;
        let raw = RawTranscript::from_bytes(path.display().to_string(), &bytes);

        tracing::debug!(
            "Read {} bytes from {} (webvtt: {})",
            bytes.len(),
            path.display(),
            raw.is_webvtt()
        );

        Ok(raw)
    }
}
