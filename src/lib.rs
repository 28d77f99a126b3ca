//! briefly - Meeting transcripts in, summaries and action items out
//!
//! Cleans a raw transcript, asks a locally hosted language model to summarise it
//! and parses the reply into a structured [`summary::SummaryResult`].

pub mod cli;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod summary;
pub mod transcript;

use thiserror::Error;

/// Main error type for briefly
///
/// Covers everything outside the summarization call itself; model failures
/// are reported through [`llm::ModelError`].
#[derive(Error, Debug)]
pub enum BrieflyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown prompt template version '{0}'")]
    UnknownTemplate(String),

    #[error("Transcript source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BrieflyError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "briefly";
