// --- File: crates/calboard_calendly/src/models.rs ---

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Recognized filters for the scheduled-events endpoint.
///
/// Unset options are omitted from the outbound request entirely, never sent
/// as empty values.
#[derive(Debug, Clone, Default)]
pub struct EventFilters {
    pub status: Option<String>,
    pub min_start_time: Option<DateTime<Utc>>,
    pub max_start_time: Option<DateTime<Utc>>,
    /// Page size; clamped to the provider maximum of 100 at request build.
    pub count: Option<u32>,
    pub sort: Option<String>,
}

impl EventFilters {
    /// Applies the caller-specific default lookback window when no explicit
    /// lower bound was supplied. The two windows (90 days organization-wide,
    /// 30 days per professional) are deliberately distinct.
    pub fn with_default_lookback(mut self, days: i64) -> Self {
        if self.min_start_time.is_none() {
            self.min_start_time = Some(Utc::now() - Duration::days(days));
        }
        self
    }
}

/// A membership entry on a scheduled event; the human display name of the
/// event host is derived from the first entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMembership {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// One scheduled event as returned by the provider. Transient, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub uri: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub event_memberships: Vec<EventMembership>,
    /// Filled in during aggregation; not part of the provider payload.
    #[serde(default)]
    pub professional_name: Option<String>,
}

impl ScheduledEvent {
    /// Human display name derived from the membership list.
    pub fn display_name(&self) -> &str {
        self.event_memberships
            .first()
            .and_then(|m| m.user_name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// The authenticated user behind a bearer token, from the whoami endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub uri: String,
    pub current_organization: String,
}

/// A fresh access/refresh token pair from a refresh grant.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of the authorization-code exchange. `owner` and `organization` are
/// the trailing path segments of the URIs in the token response.
#[derive(Debug, Clone)]
pub struct ExchangedToken {
    pub access_token: String,
    pub refresh_token: String,
    pub owner: String,
    pub organization: String,
}

/// Sentinel message attached to a professional whose credential failed.
pub const INVALID_TOKEN_MESSAGE: &str = "Please validate token!";

/// One entry of the merged aggregate: either a real event or a contained
/// per-source failure. Downstream sorting and rendering pattern-match on the
/// variants instead of sniffing field shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateEntry {
    Event(ScheduledEvent),
    Failed {
        professional_name: String,
        reason: String,
    },
}
