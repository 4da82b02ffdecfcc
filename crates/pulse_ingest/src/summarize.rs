use async_trait::async_trait;
use pulse_core::{Result, Summarizer};
use serde::Deserialize;
use serde_json::json;

/// Sentence-based fallback summarizer: first three sentences, capped at
/// forty words.
pub struct HeuristicSummarizer;

const MAX_SUMMARY_WORDS: usize = 40;
const EMPTY_CONTENT_SUMMARY: &str = "No content available to summarize.";

#[async_trait]
impl Summarizer for HeuristicSummarizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        if content.trim().is_empty() {
            return Ok(EMPTY_CONTENT_SUMMARY.to_string());
        }

        let sentences: Vec<&str> = content.split(". ").take(3).collect();
        let summary = format!("{}.", sentences.join(". ").trim_end_matches('.'));

        let words: Vec<&str> = summary.split_whitespace().collect();
        if words.len() > MAX_SUMMARY_WORDS {
            return Ok(format!("{}...", words[..MAX_SUMMARY_WORDS].join(" ")));
        }
        Ok(summary)
    }
}

/// Chat-completions summarizer against an OpenAI-compatible endpoint. Any
/// transport or decode failure falls back to the heuristic, so ingestion
/// never stalls on the model provider.
pub struct RemoteSummarizer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    fallback: HeuristicSummarizer,
}

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const SYSTEM_PROMPT: &str = "You are a financial news assistant. Summarize the \
following news article in 30-40 words. Focus on the main financial impact or event.";
const MAX_PROMPT_CHARS: usize = 4_000;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl RemoteSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL)
    }

    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            fallback: HeuristicSummarizer,
        }
    }

    async fn complete(&self, content: &str) -> Result<String> {
        let prompt: String = content.chars().take(MAX_PROMPT_CHARS).collect();
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });

        let response: ChatResponse = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| pulse_core::Error::Summarize("Empty completion response".to_string()))
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn summarize(&self, content: &str) -> Result<String> {
        if content.trim().is_empty() {
            return self.fallback.summarize(content).await;
        }
        match self.complete(content).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::warn!("Remote summarizer failed, using heuristic: {}", e);
                self.fallback.summarize(content).await
            }
        }
    }
}
