//! LLM Client: the single point of entry for all Gemini API calls in LinkBrand.
//!
//! ARCHITECTURAL RULE: No other module may call the generation provider directly.
//! Handlers go through `resilience::Orchestrator`, which drives this client via
//! the `ModelInvoker` trait.
//!
//! The client never retries on its own and never returns an error type: every
//! failure is classified into an `InvocationOutcome` from the structured HTTP
//! status and the provider's `error.status` field.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resilience::{InvocationOutcome, ModelInvoker};

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    violations: Vec<QuotaViolation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotaViolation {
    #[serde(default)]
    quota_id: String,
}

/// Gemini `generateContent` client. Cheap to clone; shares one connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Gemini HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }
}

#[async_trait]
impl ModelInvoker for GeminiClient {
    async fn invoke(&self, model: &str, prompt: &str) -> InvocationOutcome {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!("{}/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => return InvocationOutcome::TransientError(format!("HTTP error: {e}")),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return InvocationOutcome::TransientError(format!("Body read error: {e}")),
        };

        if !status.is_success() {
            return classify_failure(status, &body);
        }

        classify_success(&body)
    }
}

/// Maps a non-2xx provider response to an outcome.
///
/// Per-minute quota exhaustion is retry-worthy; a per-day quota will not reset
/// within any retry window, so it rejects the model instead.
fn classify_failure(status: StatusCode, body: &str) -> InvocationOutcome {
    let parsed = serde_json::from_str::<GeminiError>(body).ok().map(|e| e.error);
    let (provider_status, message) = parsed
        .as_ref()
        .map(|e| (e.status.as_str(), e.message.clone()))
        .unwrap_or(("", body.to_string()));

    match (status, provider_status) {
        (StatusCode::TOO_MANY_REQUESTS, _) | (_, "RESOURCE_EXHAUSTED") => {
            let daily_quota = parsed.as_ref().is_some_and(|e| {
                e.details
                    .iter()
                    .flat_map(|d| &d.violations)
                    .any(|v| v.quota_id.contains("PerDay"))
            });
            if daily_quota {
                InvocationOutcome::Rejected(format!("daily quota exhausted: {message}"))
            } else {
                InvocationOutcome::RateLimited
            }
        }
        (StatusCode::BAD_REQUEST, _)
        | (StatusCode::FORBIDDEN, _)
        | (StatusCode::NOT_FOUND, _)
        | (_, "INVALID_ARGUMENT")
        | (_, "FAILED_PRECONDITION")
        | (_, "PERMISSION_DENIED")
        | (_, "NOT_FOUND") => InvocationOutcome::Rejected(format!("{status}: {message}")),
        _ => InvocationOutcome::TransientError(format!("{status}: {message}")),
    }
}

fn classify_success(body: &str) -> InvocationOutcome {
    let response: GenerateContentResponse = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => return InvocationOutcome::TransientError(format!("JSON parse error: {e}")),
    };

    if let Some(usage) = &response.usage_metadata {
        debug!(
            "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
            usage.prompt_token_count, usage.candidates_token_count
        );
    }

    match response.text() {
        Some(text) => InvocationOutcome::Success(text),
        None => match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => InvocationOutcome::Rejected(format!("prompt blocked: {reason}")),
            None => InvocationOutcome::TransientError("LLM returned empty content".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_minute_quota_is_rate_limited() {
        let body = r#"{"error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED",
            "details": [{"@type": "type.googleapis.com/google.rpc.QuotaFailure",
                "violations": [{"quotaMetric": "generativelanguage.googleapis.com/generate_content_free_tier_requests",
                                "quotaId": "GenerateRequestsPerMinutePerProjectPerModel-FreeTier"}]},
                {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "37s"}]}}"#;
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, body),
            InvocationOutcome::RateLimited
        );
    }

    #[test]
    fn test_daily_quota_rejects_model() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED",
            "details": [{"violations": [{"quotaId": "GenerateRequestsPerDayPerProjectPerModel-FreeTier"}]}]}}"#;
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, body),
            InvocationOutcome::Rejected(msg) if msg.starts_with("daily quota exhausted")
        ));
    }

    #[test]
    fn test_bare_429_without_body_is_rate_limited() {
        assert_eq!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"),
            InvocationOutcome::RateLimited
        );
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let body = r#"{"error": {"code": 404, "message": "models/gemini-9 is not found", "status": "NOT_FOUND"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, body),
            InvocationOutcome::Rejected(msg) if msg.contains("gemini-9")
        ));
    }

    #[test]
    fn test_invalid_argument_is_rejected() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, body),
            InvocationOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_server_error_is_transient() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded", "status": "UNAVAILABLE"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, body),
            InvocationOutcome::TransientError(_)
        ));
    }

    #[test]
    fn test_success_concatenates_parts() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"ats_score\""}, {"text": ": 70}"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 5}}"#;
        assert_eq!(
            classify_success(body),
            InvocationOutcome::Success(r#"{"ats_score": 70}"#.to_string())
        );
    }

    #[test]
    fn test_empty_text_is_transient() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#;
        assert!(matches!(
            classify_success(body),
            InvocationOutcome::TransientError(_)
        ));
        assert!(matches!(
            classify_success(r#"{"candidates": []}"#),
            InvocationOutcome::TransientError(_)
        ));
    }

    #[test]
    fn test_blocked_prompt_is_rejected() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(
            classify_success(body),
            InvocationOutcome::Rejected("prompt blocked: SAFETY".to_string())
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }
}
