//! Gemini generateContent client.
//!
//! One outbound POST per generation request. No retry, no streaming; the
//! call is awaited and the full text returned. Failures surface as
//! [`GatewayError`] and are mapped to an upstream error by the caller.

use async_trait::async_trait;
use tracing::debug;

use crate::error::GatewayError;

/// Seam between the conversation service and the external generation API.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate assistant text for an assembled prompt. Invoked exactly
    /// once per request; errors are propagated, not retried.
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// Client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new client with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(
            api_key,
            model,
            "https://generativelanguage.googleapis.com/v1beta",
        )
    }

    /// Creates a new client with a custom base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .http
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_body: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = response_body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error")
                .to_string();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response_body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .ok_or(GatewayError::EmptyResponse)?;

        debug!(chars = text.len(), "Received generated text");

        Ok(text.to_string())
    }
}
