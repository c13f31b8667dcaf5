//! Gateway to the external generative-text API.
//!
//! Exposes the [`LlmClient`] trait at the seam, a Gemini implementation,
//! prompt assembly for the HealthMate domain, and a mock client for tests.

pub mod client;
pub mod error;
pub mod mock;
pub mod prompt;

pub use client::{GeminiClient, LlmClient};
pub use error::GatewayError;
pub use mock::MockLlmClient;
pub use prompt::{build_prompt, Domain, PromptOptions, Task};
