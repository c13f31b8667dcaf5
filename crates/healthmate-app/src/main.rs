//! HealthMate application binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite database
//! 3. Build the Gemini client and conversation service
//! 4. Start the axum REST API server

use std::path::PathBuf;
use std::sync::Arc;

use healthmate_api::routes;
use healthmate_api::state::AppState;
use healthmate_core::config::HealthmateConfig;
use healthmate_gateway::GeminiClient;
use healthmate_storage::Database;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Resolve the config file path (HEALTHMATE_CONFIG env, or
/// ~/.healthmate/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("HEALTHMATE_CONFIG") {
        return PathBuf::from(p);
    }
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".healthmate").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".healthmate").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting HealthMate v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let mut config = HealthmateConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if let Some(port) = std::env::var("HEALTHMATE_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
    {
        config.general.port = port;
    }

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    let db_path = data_dir.join("healthmate.db");
    let db = Database::new(&db_path)?;
    tracing::info!(path = %db_path.display(), "SQLite database opened");

    // Generation client.
    let api_key = config.gemini.resolve_api_key();
    if api_key.is_empty() {
        tracing::warn!("No Gemini API key configured; generation requests will fail");
    }
    let llm = Arc::new(GeminiClient::with_base_url(
        api_key,
        config.gemini.model.clone(),
        config.gemini.base_url.clone(),
    ));

    let state = AppState::new(config, db, llm);

    routes::start_server(state).await?;

    Ok(())
}
