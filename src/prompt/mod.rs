//! Prompt construction
//!
//! Turns a normalized transcript into the exact text sent to the model.

mod templates;

pub use templates::{OutputFormat, PromptTemplate};

use crate::config::PromptSettings;
use crate::transcript::NormalizedTranscript;
use crate::{BrieflyError, Result};

/// Appended once where an over-long transcript was cut.
pub const TRUNCATION_MARKER: &str = "[[TRANSCRIPT TRUNCATED]]";

/// A model-ready prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub template_version: String,
    /// Whether the transcript was cut to fit `max_input_chars`
    pub truncated: bool,
    /// Characters of normalized transcript offered to the builder
    pub input_chars: usize,
}

/// Builds prompts from a fixed template version and input budget.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: &'static PromptTemplate,
    max_input_chars: usize,
}

impl PromptBuilder {
    pub fn new(settings: &PromptSettings) -> Result<Self> {
        let template = PromptTemplate::lookup(&settings.template_version)
            .ok_or_else(|| BrieflyError::UnknownTemplate(settings.template_version.clone()))?;

        Ok(Self {
            template,
            max_input_chars: settings.max_input_chars,
        })
    }

    pub fn template(&self) -> &'static PromptTemplate {
        self.template
    }

    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    pub fn build(&self, transcript: &NormalizedTranscript) -> Prompt {
        let body = strip_marker(&transcript.text);
        let input_chars = body.chars().count();

        let (text, truncated) = match truncate_chars(&body, self.max_input_chars) {
            Some(kept) => {
                tracing::warn!(
                    "Transcript {} truncated: {} of {} chars kept",
                    transcript.source,
                    kept.chars().count(),
                    input_chars
                );
                let mut cut = kept.trim_end().to_string();
                if !cut.is_empty() {
                    cut.push('\n');
                }
                cut.push_str(TRUNCATION_MARKER);
                (self.template.render(&cut), true)
            }
            None => (self.template.render(&body), false),
        };

        Prompt {
            text,
            template_version: self.template.version.to_string(),
            truncated,
            input_chars,
        }
    }
}

/// Remove every occurrence of the marker, including ones formed by joining
/// the text around a removed occurrence.
fn strip_marker(text: &str) -> String {
    let mut body = text.to_string();
    while body.contains(TRUNCATION_MARKER) {
        body = body.replace(TRUNCATION_MARKER, "");
    }
    body
}

/// Cut `text` to at most `max_chars` characters, preferring a whitespace
/// boundary in the last quarter of the budget. `None` if it already fits.
fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    let (end, _) = text.char_indices().nth(max_chars)?;
    let cut = &text[..end];

    let floor = max_chars - max_chars / 4;
    match cut.rfind(char::is_whitespace) {
        Some(pos) if cut[..pos].chars().count() >= floor => Some(&cut[..pos]),
        _ => Some(cut),
    }
}
