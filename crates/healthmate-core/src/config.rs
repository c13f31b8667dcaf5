use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HealthmateError, Result};

/// Top-level configuration for the HealthMate backend.
///
/// Loaded from `~/.healthmate/config.toml` by default. Each section
/// corresponds to a subsystem or cross-cutting concern. Secrets such as the
/// Gemini API key may also come from the environment (see
/// [`GeminiConfig::resolve_api_key`]).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HealthmateConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl HealthmateConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HealthmateConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HealthmateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// HTTP port the API server binds to.
    pub port: u16,
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            data_dir: "~/.healthmate/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Gemini generation API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API key. Left empty here, the `GEMINI_API_KEY` environment variable
    /// is used instead.
    pub api_key: String,
    /// Model identifier passed to the generateContent endpoint.
    pub model: String,
    /// API base URL. Overridable for tests.
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl GeminiConfig {
    /// The effective API key: the config value, or `GEMINI_API_KEY` from the
    /// environment when the config value is empty.
    pub fn resolve_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("GEMINI_API_KEY").unwrap_or_default()
    }
}

/// Conversation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Trailing messages from the stored conversation supplied as context to
    /// the generation call.
    pub context_messages: usize,
    /// Maximum characters of the first user message used for the title.
    pub title_max_chars: usize,
    /// Prefix prepended to every derived conversation title.
    pub title_prefix: String,
    /// Prompt domain: "health" selects the HealthMate persona, anything else
    /// a generic assistant instruction.
    pub domain: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_messages: 10,
            title_max_chars: 45,
            title_prefix: "Health: ".to_string(),
            domain: "health".to_string(),
        }
    }
}

/// PII redaction toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Replace email addresses before storing or forwarding user text.
    pub email_redaction: bool,
    /// Replace phone-like digit runs before storing or forwarding user text.
    pub phone_redaction: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            email_redaction: true,
            phone_redaction: true,
        }
    }
}

/// Request limits applied at the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum requests per rate-limit window.
    pub max_requests: u64,
    /// Rate-limit window length in seconds.
    pub window_secs: u64,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 900,
            max_body_bytes: 1024 * 1024,
        }
    }
}
