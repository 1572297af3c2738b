// --- File: crates/calboard_calendly/src/oauth.rs ---
//! OAuth token exchange against the Calendly auth server.
//!
//! Covers the two grants the app uses: `authorization_code` for the initial
//! link and `refresh_token` for renewal. Persistence of the resulting pair is
//! the caller's job.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as base64_engine, Engine as _};
use calboard_common::HTTP_CLIENT;
use calboard_config::CalendlyConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::CalendlyError;
use crate::models::{ExchangedToken, TokenPair};

#[derive(Deserialize, Debug)]
struct TokenExchangePayload {
    access_token: String,
    refresh_token: String,
    owner: String,
    organization: String,
}

#[derive(Deserialize, Debug)]
struct RefreshPayload {
    access_token: String,
    refresh_token: String,
}

/// Performs the OAuth grants against the provider token endpoint.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchanges an authorization code for tokens plus owner/organization
    /// identity. Any non-2xx propagates as `AuthExchange`.
    async fn exchange_code(&self, code: &str) -> Result<ExchangedToken, CalendlyError>;

    /// Trades a refresh token for a new pair. Returns `None` on any failure;
    /// callers must treat that as final and not retry.
    async fn refresh(&self, refresh_token: &str) -> Option<TokenPair>;
}

/// HTTP implementation of [`TokenExchanger`].
pub struct HttpTokenExchanger {
    client: Client,
    auth_base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl HttpTokenExchanger {
    pub fn new(config: &CalendlyConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            auth_base_url: config.auth_base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.auth_base_url)
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange_code(&self, code: &str) -> Result<ExchangedToken, CalendlyError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
        ];

        let response = self
            .client
            .post(self.token_url())
            .header(
                AUTHORIZATION,
                basic_auth_value(&self.client_id, &self.client_secret),
            )
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendlyError::AuthExchange {
                status: status.as_u16(),
                body,
            });
        }

        let payload: TokenExchangePayload = response.json().await?;
        let exchanged = ExchangedToken {
            owner: uri_tail(&payload.owner).to_string(),
            organization: uri_tail(&payload.organization).to_string(),
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        };
        info!(owner = %exchanged.owner, organization = %exchanged.organization,
            "exchanged authorization code");
        Ok(exchanged)
    }

    async fn refresh(&self, refresh_token: &str) -> Option<TokenPair> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .client
            .post(self.token_url())
            .header(
                AUTHORIZATION,
                basic_auth_value(&self.client_id, &self.client_secret),
            )
            .form(&params)
            .send()
            .await
            .map_err(|e| warn!("token refresh request failed: {e}"))
            .ok()?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "token refresh rejected");
            return None;
        }

        let payload: RefreshPayload = response
            .json()
            .await
            .map_err(|e| warn!("token refresh response unreadable: {e}"))
            .ok()?;
        Some(TokenPair {
            access_token: payload.access_token,
            refresh_token: payload.refresh_token,
        })
    }
}

/// The URL the admin is redirected to in order to authorize the app.
pub fn authorize_url(config: &CalendlyConfig) -> String {
    format!(
        "{}/oauth/authorize?client_id={}&response_type=code&redirect_uri={}",
        config.auth_base_url, config.client_id, config.redirect_uri
    )
}

/// `Basic base64(client_id:client_secret)` header value.
pub(crate) fn basic_auth_value(client_id: &str, client_secret: &str) -> String {
    let credentials = base64_engine.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {credentials}")
}

/// Trailing path segment of a provider URI, e.g. the organization id out of
/// `https://api.calendly.com/organizations/ABC123`.
pub(crate) fn uri_tail(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}
