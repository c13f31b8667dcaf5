use thiserror::Error;

/// Errors from the generation gateway.
///
/// The caller cannot distinguish transient from permanent upstream failures;
/// no retry is attempted here.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("empty response from generation API")]
    EmptyResponse,
}
