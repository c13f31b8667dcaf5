//! HealthMate API crate - axum HTTP server and route handlers.
//!
//! Provides the REST surface for the HealthMate backend: conversation CRUD,
//! symptom checks, the FAQ catalogue, reminder management, and a health
//! check endpoint.

pub mod error;
pub mod faqs;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
