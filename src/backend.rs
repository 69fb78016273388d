//! Generative text backend: the trait seam and the Gemini REST client.
//!
//! The pipeline treats the backend as an opaque capability: prompt plus
//! system instruction in, free-form natural-language text out. Everything
//! the crate knows about Gemini lives in this module; the stages only see
//! [`GenerativeBackend`], which keeps them testable with scripted fakes
//! and leaves room for other providers behind the same trait.
//!
//! Sampling parameters other than temperature are fixed by policy
//! (top-p 0.9, top-k 40): stages vary only the creativity knob, lower for
//! extraction-type work and higher for generative rewriting.

use crate::error::StageError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default Gemini model used when the caller does not override it.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Fixed nucleus-sampling parameter sent with every request.
const TOP_P: f32 = 0.9;
/// Fixed top-k sampling parameter sent with every request.
const TOP_K: u32 = 40;
/// Default cap on generated tokens per round trip.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// One generation round trip: task prompt, fixed per-stage system
/// instruction, and the stage's temperature.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    pub system: &'a str,
    /// Creativity knob, 0.0–1.0.
    pub temperature: f32,
}

/// An opaque generative text service.
///
/// Implementations carry no per-run session state; a request is a pure
/// function of its inputs from the caller's perspective (the backend's
/// generative nature means a retried request can yield a different — but
/// still valid — reply).
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Send one prompt and return the reply text.
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, StageError>;

    /// Provider name for diagnostics.
    fn name(&self) -> &str {
        "unknown"
    }
}

// ── GeminiBackend ────────────────────────────────────────────────────────

/// REST client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_output_tokens: u32,
    request_timeout: Duration,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Read the API key from `GEMINI_API_KEY`, falling back to
    /// `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self, StageError> {
        let key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| StageError::BackendRejected {
                detail: "GEMINI_API_KEY is not set".into(),
            })?;
        Ok(Self::new(key))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_tokens(mut self, n: u32) -> Self {
        self.max_output_tokens = n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn build_request_body(&self, request: &GenerationRequest<'_>) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "systemInstruction": {
                "parts": [{ "text": request.system }],
            },
            "generationConfig": {
                "temperature": request.temperature,
                "topP": TOP_P,
                "topK": TOP_K,
                "maxOutputTokens": self.max_output_tokens,
            },
        })
    }
}

/// Pull the reply text out of a `generateContent` response envelope.
///
/// Joins every text part of the first candidate. An envelope with no
/// candidates or no text parts is a malformed reply, not a transport
/// failure.
fn parse_reply(envelope: &serde_json::Value) -> Result<String, StageError> {
    let candidate = envelope["candidates"]
        .as_array()
        .and_then(|c| c.first())
        .ok_or_else(|| StageError::MalformedOutput {
            detail: "response envelope has no candidates".into(),
        })?;

    let mut text = String::new();
    if let Some(parts) = candidate["content"]["parts"].as_array() {
        for part in parts {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
        }
    }

    if text.is_empty() {
        return Err(StageError::MalformedOutput {
            detail: "response candidate contained no text parts".into(),
        });
    }

    Ok(text)
}

/// Map an HTTP error status onto the stage-error taxonomy.
///
/// 429 is retryable rate limiting; 401/403 mean the credentials are bad
/// and retrying cannot help; 5xx is a transient server condition; anything
/// else is treated as a rejection of this particular request.
fn map_error(status: reqwest::StatusCode, retry_after_secs: Option<u64>, body: &str) -> StageError {
    match status.as_u16() {
        429 => StageError::BackendUnavailable {
            retry_after_secs,
            detail: format!("rate limit exceeded: {}", extract_error_message(body)),
        },
        401 | 403 => StageError::BackendRejected {
            detail: format!("authentication failed: {}", extract_error_message(body)),
        },
        500..=599 => StageError::BackendUnavailable {
            retry_after_secs: None,
            detail: format!("HTTP {}: {}", status.as_u16(), extract_error_message(body)),
        },
        _ => StageError::BackendRejected {
            detail: format!("HTTP {}: {}", status.as_u16(), extract_error_message(body)),
        },
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, StageError> {
        let body = self.build_request_body(&request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(
            model = %self.model,
            temperature = request.temperature,
            prompt_len = request.prompt.len(),
            "sending generateContent request"
        );

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::BackendUnavailable {
                retry_after_secs: None,
                detail: e.to_string(),
            })?;

        let status = resp.status();
        let retry_after_secs = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let response_body = resp
            .text()
            .await
            .map_err(|e| StageError::BackendUnavailable {
                retry_after_secs: None,
                detail: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(map_error(status, retry_after_secs, &response_body));
        }

        let envelope: serde_json::Value =
            serde_json::from_str(&response_body).map_err(|e| StageError::MalformedOutput {
                detail: format!("response envelope was not JSON: {e}"),
            })?;

        parse_reply(&envelope)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GeminiBackend {
        GeminiBackend::new("test-key")
    }

    #[test]
    fn new_sets_defaults() {
        let b = backend();
        assert_eq!(b.model, DEFAULT_MODEL);
        assert_eq!(b.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert!(b.base_url.contains("generativelanguage.googleapis.com"));
    }

    #[test]
    fn from_env_without_key_returns_error() {
        // Skip silently if another test (or the host) has a key set —
        // removing env vars here would race with parallel tests.
        if std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("GOOGLE_API_KEY").is_ok() {
            return;
        }
        let result = GeminiBackend::from_env();
        assert!(matches!(
            result,
            Err(StageError::BackendRejected { .. })
        ));
    }

    #[test]
    fn request_body_carries_system_instruction_and_policy() {
        let b = backend();
        let body = b.build_request_body(&GenerationRequest {
            prompt: "Analyze this paper.",
            system: "You are an analyzer.",
            temperature: 0.3,
        });

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Analyze this paper.");
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are an analyzer."
        );

        let config = &body["generationConfig"];
        assert_eq!(config["temperature"], 0.3);
        assert_eq!(config["topP"], 0.9);
        assert_eq!(config["topK"], 40);
        assert_eq!(config["maxOutputTokens"], 4096);
    }

    #[test]
    fn parse_reply_joins_text_parts() {
        let envelope = json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": "Hello " }, { "text": "world" }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(parse_reply(&envelope).unwrap(), "Hello world");
    }

    #[test]
    fn parse_reply_without_candidates_is_malformed() {
        let envelope = json!({ "candidates": [] });
        assert!(matches!(
            parse_reply(&envelope),
            Err(StageError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn parse_reply_without_text_parts_is_malformed() {
        let envelope = json!({
            "candidates": [{ "content": { "parts": [], "role": "model" } }]
        });
        assert!(matches!(
            parse_reply(&envelope),
            Err(StageError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn error_mapping_429_is_retryable() {
        let err = map_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            Some(12),
            r#"{"error": {"message": "quota exhausted"}}"#,
        );
        match err {
            StageError::BackendUnavailable {
                retry_after_secs,
                detail,
            } => {
                assert_eq!(retry_after_secs, Some(12));
                assert!(detail.contains("quota exhausted"));
            }
            other => panic!("expected BackendUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn error_mapping_401_is_rejection() {
        let err = map_error(
            reqwest::StatusCode::UNAUTHORIZED,
            None,
            r#"{"error": {"message": "invalid key"}}"#,
        );
        assert!(matches!(err, StageError::BackendRejected { detail } if detail.contains("invalid key")));
    }

    #[test]
    fn error_mapping_503_is_retryable() {
        let err = map_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, None, "overloaded");
        assert!(err.is_retryable());
    }
}
