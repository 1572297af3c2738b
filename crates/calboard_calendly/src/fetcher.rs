// --- File: crates/calboard_calendly/src/fetcher.rs ---
//! Scheduled-event retrieval and upstream status classification.
//!
//! The fetcher classifies every provider response into one of three cases:
//! success, 401 (so the orchestrator can attempt a refresh), or any other
//! non-2xx passed through verbatim for display.

use async_trait::async_trait;
use calboard_common::HTTP_CLIENT;
use calboard_config::CalendlyConfig;
use chrono::SecondsFormat;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::CalendlyError;
use crate::models::{CurrentUser, EventFilters, ScheduledEvent};

/// Default lookback window for organization-level queries.
pub const ORG_LOOKBACK_DAYS: i64 = 90;
/// Default lookback window for per-professional queries. Intentionally
/// narrower than the organization window; do not unify.
pub const PROFESSIONAL_LOOKBACK_DAYS: i64 = 30;

/// Provider page-size ceiling.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Deserialize, Debug)]
struct CurrentUserPayload {
    resource: CurrentUser,
}

#[derive(Deserialize, Debug)]
struct Pagination {
    #[serde(default)]
    next_page: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ScheduledEventsPage {
    #[serde(default)]
    collection: Vec<ScheduledEvent>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// Read-side Calendly API surface used by the fetch/aggregation paths.
#[async_trait]
pub trait CalendlyApi: Send + Sync {
    /// Resolves the account behind a bearer token (whoami).
    async fn current_user(&self, token: &str) -> Result<CurrentUser, CalendlyError>;

    /// Retrieves scheduled events for an organization, following pagination.
    async fn scheduled_events(
        &self,
        token: &str,
        organization: &str,
        filters: &EventFilters,
    ) -> Result<Vec<ScheduledEvent>, CalendlyError>;
}

/// HTTP implementation of [`CalendlyApi`].
pub struct HttpCalendlyApi {
    client: Client,
    api_base_url: String,
}

impl HttpCalendlyApi {
    pub fn new(config: &CalendlyConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            api_base_url: config.api_base_url.clone(),
        }
    }
}

#[async_trait]
impl CalendlyApi for HttpCalendlyApi {
    async fn current_user(&self, token: &str) -> Result<CurrentUser, CalendlyError> {
        let response = self
            .client
            .get(format!("{}/users/me", self.api_base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let payload: CurrentUserPayload = classify(response).await?.json().await?;
        Ok(payload.resource)
    }

    async fn scheduled_events(
        &self,
        token: &str,
        organization: &str,
        filters: &EventFilters,
    ) -> Result<Vec<ScheduledEvent>, CalendlyError> {
        let query = build_query(organization, filters);
        debug!(organization, ?query, "fetching scheduled events");

        let response = self
            .client
            .get(format!("{}/scheduled_events", self.api_base_url))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;
        let mut page: ScheduledEventsPage = classify(response).await?.json().await?;

        let mut events = Vec::new();
        loop {
            events.append(&mut page.collection);
            // next_page is a complete URL carrying its own page token.
            match page.pagination.and_then(|p| p.next_page) {
                Some(next) => {
                    let response = self.client.get(next).bearer_auth(token).send().await?;
                    page = classify(response).await?.json().await?;
                }
                None => break,
            }
        }
        Ok(events)
    }
}

/// Builds the outbound query string pairs; unset filters are omitted.
pub(crate) fn build_query(
    organization: &str,
    filters: &EventFilters,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("organization", organization.to_string()),
        (
            "count",
            filters.count.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE).to_string(),
        ),
    ];
    if let Some(status) = &filters.status {
        query.push(("status", status.clone()));
    }
    if let Some(min) = filters.min_start_time {
        query.push((
            "min_start_time",
            min.to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
    }
    if let Some(max) = filters.max_start_time {
        query.push((
            "max_start_time",
            max.to_rfc3339_opts(SecondsFormat::Secs, true),
        ));
    }
    if let Some(sort) = &filters.sort {
        query.push(("sort", sort.clone()));
    }
    query
}

/// Classifies the upstream HTTP status: 2xx passes the response through,
/// 401 becomes `Unauthorized`, anything else becomes `Upstream` with the
/// code and body verbatim.
pub(crate) async fn classify(response: Response) -> Result<Response, CalendlyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(CalendlyError::Unauthorized);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CalendlyError::Upstream {
        code: status.as_u16(),
        message,
    })
}

/// Fetches organization events for a bearer token whose organization is not
/// yet known: resolves it through the whoami endpoint first. A whoami failure
/// surfaces the classified error without attempting the events call.
pub async fn fetch_org_events(
    api: &dyn CalendlyApi,
    token: &str,
    filters: &EventFilters,
) -> Result<Vec<ScheduledEvent>, CalendlyError> {
    let user = api.current_user(token).await?;
    api.scheduled_events(token, &user.current_organization, filters)
        .await
}
