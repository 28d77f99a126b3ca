//! Summarization pipeline orchestration
//!
//! Normalizer -> prompt builder -> model client -> output parser, in that order.
//! Only the model call can fail a run.

use anyhow::Result;

use crate::config::{PromptSettings, Settings};
use crate::llm::{build_provider, LlmProvider, ModelError};
use crate::prompt::{Prompt, PromptBuilder};
use crate::summary::{OutputParser, SummaryResult};
use crate::transcript::{normalize, RawTranscript};

/// One configured pipeline; holds no per-run state
pub struct SummaryPipeline {
    provider: Box<dyn LlmProvider>,
    builder: PromptBuilder,
    parser: OutputParser,
}

impl SummaryPipeline {
    /// Create a pipeline talking to the configured model endpoint
    pub fn new(settings: &Settings) -> Result<Self> {
        let provider = build_provider(&settings.model)?;
        Ok(Self::with_provider(provider, &settings.prompt)?)
    }

    /// Create a pipeline around an existing provider
    pub fn with_provider(
        provider: Box<dyn LlmProvider>,
        settings: &PromptSettings,
    ) -> crate::Result<Self> {
        let builder = PromptBuilder::new(settings)?;
        let parser = OutputParser::new(builder.template().format);

        Ok(Self {
            provider,
            builder,
            parser,
        })
    }

    /// The prompt a run would send for this transcript
    pub fn prompt(&self, raw: &RawTranscript) -> Prompt {
        self.builder.build(&normalize(raw))
    }

    /// Summarize one transcript
    pub async fn summarize(&self, raw: &RawTranscript) -> Result<SummaryResult, ModelError> {
        tracing::info!("Summarizing transcript: {}", raw.source);

        let normalized = normalize(raw);
        if normalized.is_empty() {
            tracing::warn!("Transcript {} is empty after normalization", raw.source);
        }

        let prompt = self.builder.build(&normalized);
        tracing::debug!(
            "Built prompt {} ({} transcript chars, {} lines, truncated: {})",
            prompt.template_version,
            prompt.input_chars,
            normalized.line_count(),
            prompt.truncated
        );

        let response = self.provider.complete(&prompt).await?;
        let result = self.parser.parse(&response);

        tracing::info!(
            "Summary complete: {} action items (structured: {})",
            result.action_items.len(),
            result.parse_succeeded
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a canned result and remembers the prompts it saw
    struct ScriptedProvider {
        reply: std::result::Result<String, ModelError>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(reply: std::result::Result<&str, ModelError>) -> Self {
            Self {
                reply: reply.map(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for std::sync::Arc<ScriptedProvider> {
        async fn complete(
            &self,
            prompt: &Prompt,
        ) -> std::result::Result<ModelResponse, ModelError> {
            self.prompts.lock().unwrap().push(prompt.text.clone());
            self.reply.clone().map(|text| ModelResponse {
                text,
                model: "scripted".to_string(),
            })
        }
    }

    fn pipeline(
        reply: std::result::Result<&str, ModelError>,
    ) -> (SummaryPipeline, std::sync::Arc<ScriptedProvider>) {
        let provider = std::sync::Arc::new(ScriptedProvider::new(reply));
        let pipeline =
            SummaryPipeline::with_provider(Box::new(provider.clone()), &PromptSettings::default())
                .unwrap();
        (pipeline, provider)
    }

    #[tokio::test]
    async fn cleans_transcript_before_prompting() {
        let (pipeline, provider) = pipeline(Ok("SUMMARY: ok ACTIONITEMS: None"));
        let raw = RawTranscript::new("sync.txt", "Alice: hi [filler] there");

        let result = pipeline.summarize(&raw).await.unwrap();
        assert!(result.parse_succeeded);

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Alice: hi there"));
        assert!(!prompts[0].contains("[filler]"));
    }

    #[tokio::test]
    async fn unparseable_reply_degrades_instead_of_failing() {
        let (pipeline, _) = pipeline(Ok("I could not find any structure."));
        let result = pipeline
            .summarize(&RawTranscript::new("sync.txt", "Alice: hi"))
            .await
            .unwrap();

        assert!(!result.parse_succeeded);
        assert_eq!(result.summary_text, "I could not find any structure.");
        assert!(result.action_items.is_empty());
    }

    #[tokio::test]
    async fn model_errors_propagate_unchanged() {
        let err = ModelError::ModelUnavailable {
            attempts: 3,
            reason: "connection refused".to_string(),
        };
        let (pipeline, _) = pipeline(Err(err.clone()));

        let got = pipeline
            .summarize(&RawTranscript::new("sync.txt", "Alice: hi"))
            .await
            .unwrap_err();
        assert_eq!(got, err);
    }

    #[test]
    fn prompt_matches_what_summarize_sends() {
        let (pipeline, provider) = pipeline(Ok("SUMMARY: ok ACTIONITEMS: None"));
        let raw = RawTranscript::new("sync.txt", "Um, Bob: let's go");

        let expected = pipeline.prompt(&raw);
        tokio_test::block_on(pipeline.summarize(&raw)).unwrap();

        assert_eq!(provider.prompts.lock().unwrap()[0], expected.text);
    }

    #[test]
    fn unknown_template_fails_construction() {
        let provider = std::sync::Arc::new(ScriptedProvider::new(Ok("")));
        let settings = PromptSettings {
            template_version: "v0".to_string(),
            ..PromptSettings::default()
        };
        assert!(SummaryPipeline::with_provider(Box::new(provider), &settings).is_err());
    }
}
