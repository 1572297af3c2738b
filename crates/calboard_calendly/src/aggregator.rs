// --- File: crates/calboard_calendly/src/aggregator.rs ---
//! Multi-source event aggregation.
//!
//! Runs the fetcher once per tokened professional plus once for the stored
//! organization credential, merging everything into one sequence sorted by
//! start time descending. A failing source contributes exactly one `Failed`
//! entry instead of aborting the batch.

use std::cmp::Ordering;

use calboard_common::services::{Credential, CredentialStore, Professional, ProfessionalDirectory};
use tracing::warn;

use crate::error::CalendlyError;
use crate::fetcher::{CalendlyApi, PROFESSIONAL_LOOKBACK_DAYS};
use crate::models::{AggregateEntry, EventFilters, ScheduledEvent, INVALID_TOKEN_MESSAGE};
use crate::oauth::TokenExchanger;
use crate::orchestrator::fetch_with_refresh;

/// Source label used for failures of the organization-level credential.
pub const ORGANIZATION_SOURCE: &str = "Organization";

/// Fetches one professional's events with their own token, resolving and
/// persisting the organization URI first when it is not cached yet. Events
/// come back tagged with the professional's name.
pub async fn professional_events(
    api: &dyn CalendlyApi,
    directory: &dyn ProfessionalDirectory,
    professional: &Professional,
    token: &str,
    filters: &EventFilters,
) -> Result<Vec<ScheduledEvent>, CalendlyError> {
    let organization = match &professional.organization {
        Some(org) => org.clone(),
        None => {
            let user = api.current_user(token).await?;
            if let Err(e) = directory
                .set_organization(professional.id, &user.current_organization)
                .await
            {
                // The resolution still holds for this request.
                warn!(professional = %professional.name, error = %e,
                    "failed to persist resolved organization");
            }
            user.current_organization
        }
    };

    let mut events = api.scheduled_events(token, &organization, filters).await?;
    for event in &mut events {
        event.professional_name = Some(professional.name.clone());
    }
    Ok(events)
}

/// Gathers entries across every professional in the directory.
///
/// Professionals without a token contribute nothing; a professional whose
/// token fails (whoami or events) contributes exactly one `Failed` entry.
pub async fn gather_professional_entries(
    api: &dyn CalendlyApi,
    directory: &dyn ProfessionalDirectory,
    filters: &EventFilters,
) -> Result<Vec<AggregateEntry>, CalendlyError> {
    let filters = filters.clone().with_default_lookback(PROFESSIONAL_LOOKBACK_DAYS);
    let mut entries = Vec::new();

    for professional in directory.list().await? {
        let Some(token) = professional.token.as_deref().filter(|t| !t.is_empty()) else {
            continue;
        };

        match professional_events(api, directory, &professional, token, &filters).await {
            Ok(events) => entries.extend(events.into_iter().map(AggregateEntry::Event)),
            Err(e) => {
                warn!(professional = %professional.name, error = %e,
                    "professional source failed, continuing");
                entries.push(AggregateEntry::Failed {
                    professional_name: professional.name.clone(),
                    reason: INVALID_TOKEN_MESSAGE.to_string(),
                });
            }
        }
    }

    Ok(entries)
}

/// Gathers the full organization aggregate: the stored credential's events
/// (through the refresh-and-retry orchestrator, 90-day default window) plus
/// every professional's events (30-day default window), sorted.
pub async fn gather_organization_entries(
    api: &dyn CalendlyApi,
    exchanger: &dyn TokenExchanger,
    store: &dyn CredentialStore,
    directory: &dyn ProfessionalDirectory,
    credential: &Credential,
    filters: &EventFilters,
) -> Result<Vec<AggregateEntry>, CalendlyError> {
    let org_filters = filters
        .clone()
        .with_default_lookback(crate::fetcher::ORG_LOOKBACK_DAYS);

    let mut entries = Vec::new();
    match fetch_with_refresh(api, exchanger, store, credential, &org_filters).await {
        Ok(events) => {
            entries.extend(events.into_iter().map(|mut event| {
                event.professional_name = Some(event.display_name().to_string());
                AggregateEntry::Event(event)
            }));
        }
        Err(e) => {
            warn!(error = %e, "organization credential source failed, continuing");
            entries.push(AggregateEntry::Failed {
                professional_name: ORGANIZATION_SOURCE.to_string(),
                reason: e.to_string(),
            });
        }
    }

    entries.extend(gather_professional_entries(api, directory, filters).await?);
    Ok(sort_entries(entries))
}

/// Orders real events by `start_time` descending and moves `Failed` entries
/// to the tail, preserving their relative order.
pub fn sort_entries(entries: Vec<AggregateEntry>) -> Vec<AggregateEntry> {
    let (mut events, failed): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|entry| matches!(entry, AggregateEntry::Event(_)));

    events.sort_by(|a, b| match (a, b) {
        (AggregateEntry::Event(x), AggregateEntry::Event(y)) => y.start_time.cmp(&x.start_time),
        _ => Ordering::Equal,
    });

    events.extend(failed);
    events
}
