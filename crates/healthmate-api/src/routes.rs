//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, a global body limit, and
//! the counter-window rate limiter.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let limits = &state.config.limits;
    let limiter = RateLimiter::new(limits.max_requests, limits.window_secs);
    let max_body = limits.max_body_bytes;

    // The health probe stays reachable when the limiter is exhausted.
    let public_routes = Router::new().route("/health", get(handlers::health));

    let rate_limited_routes = Router::new()
        .route(
            "/conversations/{user_id}",
            get(handlers::list_conversations).post(handlers::start_conversation),
        )
        .route(
            "/conversations/{user_id}/{id}",
            get(handlers::get_conversation).delete(handlers::delete_conversation),
        )
        .route(
            "/conversations/{user_id}/{id}/message",
            post(handlers::continue_conversation),
        )
        .route(
            "/dashboard/{user_id}/summary",
            get(handlers::dashboard_summary),
        )
        .route("/symptom-check", post(handlers::symptom_check))
        .route("/faqs", get(handlers::list_faqs))
        .route("/faqs/search", get(handlers::search_faqs))
        .route(
            "/reminders/{user_id}",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route(
            "/reminders/{user_id}/{id}",
            put(handlers::update_reminder).delete(handlers::delete_reminder),
        )
        .layer(axum::middleware::from_fn(
            crate::rate_limit::rate_limit_middleware,
        ))
        .layer(axum::Extension(limiter));

    public_routes
        .merge(rate_limited_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the configured port.
pub async fn start_server(
    state: AppState,
) -> Result<(), healthmate_core::error::HealthmateError> {
    let port = state.config.general.port;
    let addr = format!("0.0.0.0:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        healthmate_core::error::HealthmateError::Api(format!("Failed to bind: {}", e))
    })?;

    axum::serve(listener, router).await.map_err(|e| {
        healthmate_core::error::HealthmateError::Api(format!("Server error: {}", e))
    })?;

    Ok(())
}
