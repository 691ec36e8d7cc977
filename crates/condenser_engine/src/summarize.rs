use std::sync::Arc;

use futures_util::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;

use engine_logging::engine_debug;

use crate::complete::{Completion, CompletionClient, CompletionError, CompletionRequest};

/// Instruction for the per-chunk map pass.
pub const MAP_PROMPT: &str = "tldr;";
/// Instruction for the final reduce pass over the joined partial summaries.
pub const REDUCE_PROMPT: &str = "detailed tldr;";

static MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static MULTI_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

/// Normalize transcript text before it goes into a prompt: strip backticks
/// (they would break the fenced block), collapse blank-line runs, collapse
/// whitespace runs, trim.
pub fn clean_transcript(text: &str) -> String {
    let stripped = text.replace('`', "");
    let collapsed = MULTI_NEWLINE.replace_all(&stripped, "\n");
    let collapsed = MULTI_WHITESPACE.replace_all(&collapsed, " ");
    collapsed.trim().to_string()
}

/// Produces summaries through an injected [`CompletionClient`].
pub struct Summarizer {
    client: Arc<dyn CompletionClient>,
}

impl Summarizer {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Summarize one text. The cleaned text becomes the system prompt inside
    /// a fenced code block; `prompt` (default [`MAP_PROMPT`]) is the user
    /// instruction. A response whose first choice has no message fails with
    /// [`CompletionError::EmptyResponse`] carrying the completion id.
    pub async fn summarize(
        &self,
        text: &str,
        prompt: Option<&str>,
    ) -> Result<String, CompletionError> {
        let cleaned = clean_transcript(text);
        let request = CompletionRequest {
            system_prompt: format!("```\n{cleaned}\n```"),
            user_prompt: prompt.unwrap_or(MAP_PROMPT).to_string(),
            assistant_prompt: String::new(),
        };

        let Completion {
            id,
            text,
            finish_reason,
            usage,
        } = self.client.complete(&request).await?;

        let Some(summary) = text else {
            return Err(CompletionError::EmptyResponse { id });
        };
        engine_debug!(
            "completion {}: {} prompt + {} completion = {} tokens, finish reason {:?}",
            id,
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
            finish_reason
        );
        Ok(summary)
    }

    /// Summarize every text concurrently, preserving input order in the
    /// output. There is no partial-success mode: the first failing call fails
    /// the whole batch.
    pub async fn summarize_batch(
        &self,
        texts: &[String],
        prompt: Option<&str>,
    ) -> Result<Vec<String>, CompletionError> {
        try_join_all(texts.iter().map(|text| self.summarize(text, prompt))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_backticks() {
        assert_eq!(clean_transcript("a `code` b"), "a code b");
    }

    #[test]
    fn clean_collapses_blank_lines_and_whitespace() {
        assert_eq!(clean_transcript("a\n\n\nb"), "a\nb");
        assert_eq!(clean_transcript("a   b\t\tc"), "a b c");
    }

    #[test]
    fn clean_trims_edges() {
        assert_eq!(clean_transcript("  hello  "), "hello");
        assert_eq!(clean_transcript(""), "");
    }
}
