use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use condenser_engine::{
    Completion, CompletionClient, CompletionError, CompletionRequest, Summarizer, TokenUsage,
    MAP_PROMPT, REDUCE_PROMPT,
};
use pretty_assertions::assert_eq;

fn completion(id: &str, text: Option<&str>) -> Completion {
    Completion {
        id: id.to_string(),
        text: text.map(ToOwned::to_owned),
        finish_reason: Some("stop".to_string()),
        usage: TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        },
    }
}

/// Records every request and answers with a fixed reply.
struct RecordingClient {
    seen: Mutex<Vec<CompletionRequest>>,
    reply: String,
}

impl RecordingClient {
    fn new(reply: &str) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            reply: reply.to_string(),
        }
    }
}

#[async_trait]
impl CompletionClient for RecordingClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(completion("cmpl-1", Some(&self.reply)))
    }
}

/// Answers `chunk-<n>` inputs with `summary-<n>`, after a delay that makes
/// later inputs complete first.
struct ShuffledLatencyClient;

#[async_trait]
impl CompletionClient for ShuffledLatencyClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let index: u64 = request
            .system_prompt
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap();
        tokio::time::sleep(Duration::from_millis((9 - index) * 10)).await;
        Ok(completion("cmpl-1", Some(&format!("summary-{index}"))))
    }
}

struct EmptyMessageClient;

#[async_trait]
impl CompletionClient for EmptyMessageClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, CompletionError> {
        Ok(completion("cmpl-404", None))
    }
}

/// Fails on one poisoned input, succeeds on everything else.
struct PartiallyFailingClient;

#[async_trait]
impl CompletionClient for PartiallyFailingClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        if request.system_prompt.contains("poison") {
            return Err(CompletionError::Network("connection reset".to_string()));
        }
        Ok(completion("cmpl-1", Some("ok")))
    }
}

#[tokio::test]
async fn summarize_cleans_text_and_builds_prompts() {
    let client = Arc::new(RecordingClient::new("a summary"));
    let summarizer = Summarizer::new(client.clone());

    let result = summarizer
        .summarize("Hello\n\n\nworld   with `ticks`  ", None)
        .await
        .unwrap();
    assert_eq!(result, "a summary");

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].system_prompt, "```\nHello\nworld with ticks\n```");
    assert_eq!(seen[0].user_prompt, MAP_PROMPT);
    assert_eq!(seen[0].assistant_prompt, "");
}

#[tokio::test]
async fn summarize_honours_a_caller_prompt() {
    let client = Arc::new(RecordingClient::new("a summary"));
    let summarizer = Summarizer::new(client.clone());

    summarizer
        .summarize("text", Some(REDUCE_PROMPT))
        .await
        .unwrap();

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen[0].user_prompt, REDUCE_PROMPT);
}

#[tokio::test]
async fn missing_message_fails_with_the_completion_id() {
    let summarizer = Summarizer::new(Arc::new(EmptyMessageClient));

    let err = summarizer.summarize("anything", None).await.unwrap_err();
    assert_eq!(
        err,
        CompletionError::EmptyResponse {
            id: "cmpl-404".to_string()
        }
    );
}

#[tokio::test]
async fn batch_preserves_input_order_under_shuffled_latency() {
    let summarizer = Summarizer::new(Arc::new(ShuffledLatencyClient));
    let chunks: Vec<String> = (0..10).map(|i| format!("chunk-{i}")).collect();

    let summaries = summarizer.summarize_batch(&chunks, None).await.unwrap();

    let expected: Vec<String> = (0..10).map(|i| format!("summary-{i}")).collect();
    assert_eq!(summaries, expected);
}

#[tokio::test]
async fn batch_fails_whole_when_one_item_fails() {
    let summarizer = Summarizer::new(Arc::new(PartiallyFailingClient));
    let chunks = vec![
        "fine".to_string(),
        "poison".to_string(),
        "also fine".to_string(),
    ];

    let err = summarizer.summarize_batch(&chunks, None).await.unwrap_err();
    assert_eq!(
        err,
        CompletionError::Network("connection reset".to_string())
    );
}

#[tokio::test]
async fn empty_batch_yields_empty_output() {
    let summarizer = Summarizer::new(Arc::new(RecordingClient::new("unused")));
    let summaries = summarizer.summarize_batch(&[], None).await.unwrap();
    assert_eq!(summaries, Vec::<String>::new());
}
