// --- File: crates/calboard_calendly/src/error.rs ---

use calboard_common::services::StoreError;
use thiserror::Error;

/// Errors produced by the Calendly integration.
#[derive(Error, Debug)]
pub enum CalendlyError {
    /// The token endpoint rejected the authorization code. Fatal to the
    /// request; carries the upstream status and body for display.
    #[error("token exchange rejected (status {status}): {body}")]
    AuthExchange { status: u16, body: String },

    /// The bearer token was rejected (HTTP 401). Recoverable via exactly one
    /// refresh attempt.
    #[error("bearer token rejected by Calendly")]
    Unauthorized,

    /// Any other non-2xx from the provider, passed through verbatim.
    #[error("Calendly error {code}: {message}")]
    Upstream { code: u16, message: String },

    /// The single permitted refresh attempt failed; callers must not retry.
    #[error("unable to renew access token")]
    TokenRenewal,

    /// Transport-level failure, including response decoding.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failure in one of the persistent stores.
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for CalendlyError {
    fn from(err: StoreError) -> Self {
        CalendlyError::Store(err.to_string())
    }
}
