/// LLM Client: the single point of entry for all generative-AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// The HTTP transport lives behind [`GenerativeModel`]; this module owns the
/// retry policy and the response-text extraction rules.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod gemini;
pub mod prompts;

/// Substituted for the model output when no text can be pulled out of a response.
pub const EMPTY_JSON_OBJECT: &str = "{}";

const MAX_ATTEMPTS: u32 = 3;
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Provider-side quota / rate-limit signal (`RESOURCE_EXHAUSTED`). Retryable.
    #[error("Resource exhausted: {message}")]
    ResourceExhausted { message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::ResourceExhausted { .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider response shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Convenience field some gateways add on top of the raw candidate list.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// The response's direct text: the top-level `text` field when present,
    /// otherwise every text part of the first candidate joined together.
    pub fn direct_text(&self) -> Option<String> {
        if let Some(text) = self.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return Some(text.to_string());
        }
        let joined: String = self
            .first_content()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!joined.trim().is_empty()).then_some(joined)
    }

    /// Text of the first part of the first candidate.
    pub fn first_part_text(&self) -> Option<&str> {
        self.first_content()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    fn first_content(&self) -> Option<&Content> {
        self.candidates.first()?.content.as_ref()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transport seam
// ────────────────────────────────────────────────────────────────────────────

/// A single generate-content call against a hosted model. No retries here.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError>;
}

/// Bounded retry with a fixed wait, applied to rate-limit failures only.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            backoff: RATE_LIMIT_BACKOFF,
        }
    }
}

/// Where the returned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    Direct,
    FirstPart,
    /// Nothing extractable; `text` is [`EMPTY_JSON_OBJECT`].
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Completion {
    /// Trimmed model output.
    pub text: String,
    pub source: TextSource,
    /// How many fixed backoff waits happened before the successful attempt.
    pub rate_limit_waits: u32,
}

/// The single LLM client shared by all handlers.
#[derive(Clone)]
pub struct LlmClient {
    model: Arc<dyn GenerativeModel>,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            retry: RetryPolicy::default(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends the prompt and returns the model's text output.
    ///
    /// Rate-limit failures wait `backoff` and retry, up to `max_attempts`
    /// attempts in total; no wait follows the final attempt. Any other failure
    /// is returned immediately.
    pub async fn complete(&self, prompt: &str) -> Result<Completion, LlmError> {
        let (response, rate_limit_waits) = self.generate_with_retry(prompt).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        let (text, source) = if let Some(text) = response.direct_text() {
            (text, TextSource::Direct)
        } else if let Some(text) = response.first_part_text() {
            (text.to_string(), TextSource::FirstPart)
        } else {
            error!(
                "Could not extract AI response text (candidates={}, finish_reason={:?})",
                response.candidates.len(),
                response.candidates.first().and_then(|c| c.finish_reason.as_deref())
            );
            (EMPTY_JSON_OBJECT.to_string(), TextSource::Fallback)
        };

        Ok(Completion {
            text: text.trim().to_string(),
            source,
            rate_limit_waits,
        })
    }

    async fn generate_with_retry(
        &self,
        prompt: &str,
    ) -> Result<(GenerateContentResponse, u32), LlmError> {
        let mut waits = 0;

        for attempt in 1..=self.retry.max_attempts {
            match self.model.generate_content(prompt).await {
                Ok(response) => return Ok((response, waits)),
                Err(e) if e.is_rate_limit() => {
                    if attempt == self.retry.max_attempts {
                        warn!("LLM rate limited on final attempt {attempt}: {e}");
                        break;
                    }
                    warn!(
                        "LLM API limit reached (attempt {}/{}), retrying in {}s...",
                        attempt,
                        self.retry.max_attempts,
                        self.retry.backoff.as_secs()
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    waits += 1;
                }
                Err(e) => {
                    error!("Unexpected LLM error: {e}");
                    return Err(e);
                }
            }
        }

        Err(LlmError::RateLimited {
            retries: self.retry.max_attempts,
        })
    }
}
