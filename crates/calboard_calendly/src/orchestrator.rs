// --- File: crates/calboard_calendly/src/orchestrator.rs ---
//! Refresh-and-retry policy around the event fetcher.
//!
//! On an unauthorized response the orchestrator performs exactly one token
//! refresh, persists the new pair, and retries exactly once. The retry's
//! outcome is final either way; nothing ever loops. Worst case is two event
//! round-trips plus one token round-trip.

use calboard_common::services::{Credential, CredentialStore};
use tracing::{info, warn};

use crate::error::CalendlyError;
use crate::fetcher::{fetch_org_events, CalendlyApi};
use crate::models::{EventFilters, ScheduledEvent};
use crate::oauth::TokenExchanger;

/// Fetches organization events with the stored credential, refreshing the
/// token pair at most once on a 401.
pub async fn fetch_with_refresh(
    api: &dyn CalendlyApi,
    exchanger: &dyn TokenExchanger,
    store: &dyn CredentialStore,
    credential: &Credential,
    filters: &EventFilters,
) -> Result<Vec<ScheduledEvent>, CalendlyError> {
    match fetch_org_events(api, &credential.access_token, filters).await {
        Err(CalendlyError::Unauthorized) => {
            info!(credential_id = credential.id, "access token rejected, attempting refresh");

            let Some(pair) = exchanger.refresh(&credential.refresh_token).await else {
                warn!(credential_id = credential.id, "token refresh failed");
                return Err(CalendlyError::TokenRenewal);
            };

            store
                .update_tokens(credential.id, &pair.access_token, &pair.refresh_token)
                .await?;
            info!(credential_id = credential.id, "credential tokens renewed");

            // Single retry; its result is surfaced as-is.
            fetch_org_events(api, &pair.access_token, filters).await
        }
        other => other,
    }
}
