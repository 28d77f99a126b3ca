use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use briefly::config::{PromptSettings, Settings};
use briefly::llm::{LlmProvider, ModelError, ModelResponse};
use briefly::pipeline::SummaryPipeline;
use briefly::prompt::Prompt;
use briefly::summary::{ActionItem, SummaryResult};
use briefly::transcript::RawTranscript;

const STANDUP: &str =
    "Alice: We should ship by Friday. [filler] Bob: I'll own the deploy script.";

/// Canned reply; prompts it receives are recorded in a shared log
struct StubProvider {
    reply: String,
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn complete(&self, prompt: &Prompt) -> Result<ModelResponse, ModelError> {
        self.seen.lock().unwrap().push(prompt.text.clone());
        Ok(ModelResponse {
            text: self.reply.clone(),
            model: "stub".to_string(),
        })
    }
}

fn stub(reply: &str) -> (Box<dyn LlmProvider>, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let provider = StubProvider {
        reply: reply.to_string(),
        seen: Arc::clone(&seen),
    };
    (Box::new(provider), seen)
}

fn expected_standup() -> SummaryResult {
    SummaryResult::structured(
        "Ship by Friday.",
        vec![ActionItem::new("owns deploy script").with_owner("Bob")],
    )
}

#[tokio::test]
async fn standup_transcript_yields_summary_and_owner() {
    let (provider, seen) = stub("SUMMARY: Ship by Friday. ACTIONITEMS: Bob: owns deploy script");
    let pipeline = SummaryPipeline::with_provider(provider, &PromptSettings::default()).unwrap();

    let result = pipeline
        .summarize(&RawTranscript::new("standup.txt", STANDUP))
        .await
        .unwrap();

    assert_eq!(result, expected_standup());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("Alice: We should ship by Friday."));
    assert!(seen[0].contains("Bob: I'll own the deploy script."));
    assert!(!seen[0].contains("[filler]"));
}

#[tokio::test]
async fn standup_transcript_through_ollama_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate")
        .match_body(mockito::Matcher::Regex("deploy script".to_string()))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "response": "SUMMARY: Ship by Friday. ACTIONITEMS: Bob: owns deploy script"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let mut settings = Settings::default();
    settings.model.endpoint = server.url();
    let pipeline = SummaryPipeline::new(&settings).unwrap();

    let result = pipeline
        .summarize(&RawTranscript::new("standup.txt", STANDUP))
        .await
        .unwrap();

    assert_eq!(result, expected_standup());
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_model_times_out_through_pipeline() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut settings = Settings::default();
    settings.model.endpoint = format!("http://127.0.0.1:{}", port);
    settings.model.timeout_ms = 1;
    settings.model.max_retries = 2;
    settings.model.retry_backoff_ms = 1;
    let pipeline = SummaryPipeline::new(&settings).unwrap();

    let err = pipeline
        .summarize(&RawTranscript::new("standup.txt", STANDUP))
        .await
        .unwrap_err();

    assert!(
        matches!(err, ModelError::ModelTimeout { attempts: 3, .. }),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn unstructured_reply_degrades_to_raw_text() {
    let reply = "Everyone agreed to ship soon.";
    let (provider, _) = stub(reply);
    let pipeline = SummaryPipeline::with_provider(provider, &PromptSettings::default()).unwrap();

    let result = pipeline
        .summarize(&RawTranscript::new("standup.txt", STANDUP))
        .await
        .unwrap();

    assert_eq!(result, SummaryResult::degraded(reply));
}

#[tokio::test]
async fn json_template_is_parsed_as_json() {
    let reply = r#"```json
{"summary": "Ship by Friday.", "action_items": [{"task": "owns deploy script", "owner": "Bob", "due": null}]}
```"#;
    let settings = PromptSettings {
        template_version: "json-v1".to_string(),
        ..PromptSettings::default()
    };
    let (provider, seen) = stub(reply);
    let pipeline = SummaryPipeline::with_provider(provider, &settings).unwrap();

    let result = pipeline
        .summarize(&RawTranscript::new("standup.txt", STANDUP))
        .await
        .unwrap();

    assert_eq!(result, expected_standup());
    assert!(seen.lock().unwrap()[0].contains("JSON"));
}

#[test]
fn same_input_builds_same_prompt() {
    let (provider, _) = stub("");
    let pipeline = SummaryPipeline::with_provider(provider, &PromptSettings::default()).unwrap();
    let raw = RawTranscript::new("standup.txt", STANDUP);

    assert_eq!(pipeline.prompt(&raw).text, pipeline.prompt(&raw).text);
}
