//! Mock generation client for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::LlmClient;
use crate::error::GatewayError;

/// In-process [`LlmClient`] that returns a canned reply (or always fails)
/// and records every prompt it receives.
pub struct MockLlmClient {
    reply: String,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// A client that answers every request with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with an upstream API error.
    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of generate calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(prompt.to_string());
        }
        if self.fail {
            return Err(GatewayError::Api {
                status: 503,
                message: "mock upstream failure".to_string(),
            });
        }
        Ok(self.reply.clone())
    }
}
