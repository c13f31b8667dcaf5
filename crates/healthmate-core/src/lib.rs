//! HealthMate core crate - configuration, errors, domain types, redaction.

pub mod config;
pub mod error;
pub mod redact;
pub mod types;

pub use config::HealthmateConfig;
pub use error::{HealthmateError, Result};
pub use redact::Redactor;
pub use types::*;
