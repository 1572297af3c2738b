// --- File: crates/calboard_calendly/src/handlers.rs ---

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect},
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use calboard_common::services::{
    CredentialStore, NewProfessional, Professional, ProfessionalDirectory, StoreError,
};
use calboard_config::AppConfig;

use crate::aggregator::{gather_organization_entries, professional_events};
use crate::cache::EventCache;
use crate::error::CalendlyError;
use crate::export::render_csv;
use crate::fetcher::{CalendlyApi, PROFESSIONAL_LOOKBACK_DAYS};
use crate::models::{AggregateEntry, EventFilters, ScheduledEvent, INVALID_TOKEN_MESSAGE};
use crate::oauth::{authorize_url, TokenExchanger};

// Shared state for all Calendly handlers
#[derive(Clone)]
pub struct CalendlyState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<dyn CredentialStore>,
    pub directory: Arc<dyn ProfessionalDirectory>,
    pub api: Arc<dyn CalendlyApi>,
    pub exchanger: Arc<dyn TokenExchanger>,
    pub cache: EventCache,
}

#[derive(Deserialize, Debug)]
pub struct AuthCallbackQuery {
    pub code: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct EventsQuery {
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Bypasses the cache read (the fresh result is still written back).
    pub refresh: Option<bool>,
}

#[derive(Serialize, Debug)]
pub struct AuthCallbackResponse {
    pub owner: String,
    pub organization: String,
}

#[derive(Serialize, Debug)]
pub struct EventsResponse {
    pub total: usize,
    pub events: Vec<AggregateEntry>,
}

#[derive(Serialize, Debug)]
pub struct ProfessionalEventsResponse {
    pub total: usize,
    pub events: Vec<ScheduledEvent>,
}

// --- OAuth handlers ---

/// Redirects the admin to the provider's authorize page.
pub async fn auth_start_handler(State(state): State<CalendlyState>) -> Redirect {
    Redirect::temporary(&authorize_url(&state.config.calendly))
}

/// OAuth callback: exchanges the code and persists the credential.
pub async fn auth_callback_handler(
    State(state): State<CalendlyState>,
    Query(query): Query<AuthCallbackQuery>,
) -> Result<Json<AuthCallbackResponse>, (StatusCode, String)> {
    let exchanged = state
        .exchanger
        .exchange_code(&query.code)
        .await
        .map_err(fetch_http_err)?;

    let credential = state
        .credentials
        .find_or_create(&exchanged.owner, &exchanged.organization)
        .await
        .map_err(store_http_err)?;
    state
        .credentials
        .update_tokens(credential.id, &exchanged.access_token, &exchanged.refresh_token)
        .await
        .map_err(store_http_err)?;

    info!(organization = %exchanged.organization, "Calendly authorization stored");
    Ok(Json(AuthCallbackResponse {
        owner: exchanged.owner,
        organization: exchanged.organization,
    }))
}

// --- Organization aggregate handlers ---

async fn organization_aggregate(
    state: &CalendlyState,
    query: &EventsQuery,
) -> Result<Vec<AggregateEntry>, (StatusCode, String)> {
    let credential = state
        .credentials
        .latest()
        .await
        .map_err(store_http_err)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                "No Calendly authorization on file. Please authenticate first.".to_string(),
            )
        })?;

    let filters = filters_from_query(query)?;
    let key = cache_key(query);

    if !query.refresh.unwrap_or(false) {
        if let Some(cached) = state.cache.get(&key) {
            return Ok(cached);
        }
    }

    let entries = gather_organization_entries(
        state.api.as_ref(),
        state.exchanger.as_ref(),
        state.credentials.as_ref(),
        state.directory.as_ref(),
        &credential,
        &filters,
    )
    .await
    .map_err(fetch_http_err)?;

    state.cache.put(&key, entries.clone());
    Ok(entries)
}

/// Handler for the consolidated organization events view.
pub async fn organization_events_handler(
    State(state): State<CalendlyState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, (StatusCode, String)> {
    let events = organization_aggregate(&state, &query).await?;
    Ok(Json(EventsResponse {
        total: events.len(),
        events,
    }))
}

/// Handler for the organization events CSV export.
pub async fn organization_events_csv_handler(
    State(state): State<CalendlyState>,
    Query(query): Query<EventsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entries = organization_aggregate(&state, &query).await?;
    let body = render_csv(&entries, export_time_zone(&state.config));
    let filename = format!("organization_events_{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok(csv_response(body, &filename))
}

// --- Professional CRUD handlers ---

pub async fn list_professionals_handler(
    State(state): State<CalendlyState>,
) -> Result<Json<Vec<Professional>>, (StatusCode, String)> {
    let professionals = state.directory.list().await.map_err(store_http_err)?;
    Ok(Json(professionals))
}

pub async fn create_professional_handler(
    State(state): State<CalendlyState>,
    Json(payload): Json<NewProfessional>,
) -> Result<(StatusCode, Json<Professional>), (StatusCode, String)> {
    validate_professional(&payload)?;
    let created = state.directory.create(payload).await.map_err(store_http_err)?;
    state.cache.invalidate_all();
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn show_professional_handler(
    State(state): State<CalendlyState>,
    Path(id): Path<i64>,
) -> Result<Json<Professional>, (StatusCode, String)> {
    let professional = state
        .directory
        .find(id)
        .await
        .map_err(store_http_err)?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(professional))
}

pub async fn update_professional_handler(
    State(state): State<CalendlyState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewProfessional>,
) -> Result<Json<Professional>, (StatusCode, String)> {
    validate_professional(&payload)?;
    let updated = state
        .directory
        .update(id, payload)
        .await
        .map_err(store_http_err)?
        .ok_or_else(|| not_found(id))?;
    state.cache.invalidate_all();
    Ok(Json(updated))
}

pub async fn delete_professional_handler(
    State(state): State<CalendlyState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = state.directory.delete(id).await.map_err(store_http_err)?;
    if !deleted {
        return Err(not_found(id));
    }
    state.cache.invalidate_all();
    Ok(StatusCode::NO_CONTENT)
}

// --- Per-professional event handlers ---

async fn professional_fetch(
    state: &CalendlyState,
    id: i64,
    query: &EventsQuery,
) -> Result<Vec<ScheduledEvent>, (StatusCode, String)> {
    let professional = state
        .directory
        .find(id)
        .await
        .map_err(store_http_err)?
        .ok_or_else(|| not_found(id))?;

    let token = professional
        .token
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or((StatusCode::UNPROCESSABLE_ENTITY, INVALID_TOKEN_MESSAGE.to_string()))?;

    let filters =
        filters_from_query(query)?.with_default_lookback(PROFESSIONAL_LOOKBACK_DAYS);

    // Single-source path: failures propagate instead of becoming sentinels.
    professional_events(
        state.api.as_ref(),
        state.directory.as_ref(),
        &professional,
        &token,
        &filters,
    )
    .await
    .map_err(fetch_http_err)
}

pub async fn professional_events_handler(
    State(state): State<CalendlyState>,
    Path(id): Path<i64>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<ProfessionalEventsResponse>, (StatusCode, String)> {
    let events = professional_fetch(&state, id, &query).await?;
    Ok(Json(ProfessionalEventsResponse {
        total: events.len(),
        events,
    }))
}

pub async fn professional_events_csv_handler(
    State(state): State<CalendlyState>,
    Path(id): Path<i64>,
    Query(query): Query<EventsQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let events = professional_fetch(&state, id, &query).await?;
    let entries: Vec<AggregateEntry> = events.into_iter().map(AggregateEntry::Event).collect();
    let body = render_csv(&entries, export_time_zone(&state.config));
    let filename = format!(
        "professional_{}_events_{}.csv",
        id,
        Utc::now().format("%Y-%m-%d")
    );
    Ok(csv_response(body, &filename))
}

// --- Helpers ---

fn validate_professional(payload: &NewProfessional) -> Result<(), (StatusCode, String)> {
    if payload.name.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "name must not be empty".to_string(),
        ));
    }
    if payload.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "token must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn filters_from_query(
    query: &EventsQuery,
) -> Result<EventFilters, (StatusCode, String)> {
    let min_start_time = query
        .start_date
        .as_deref()
        .map(|raw| parse_day(raw, 0, 0, 0))
        .transpose()?;
    let max_start_time = query
        .end_date
        .as_deref()
        .map(|raw| parse_day(raw, 23, 59, 59))
        .transpose()?;

    Ok(EventFilters {
        status: query.status.clone().filter(|s| !s.is_empty()),
        min_start_time,
        max_start_time,
        count: Some(100),
        sort: Some("start_time:desc".to_string()),
    })
}

fn parse_day(raw: &str, h: u32, m: u32, s: u32) -> Result<DateTime<Utc>, (StatusCode, String)> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid date format (YYYY-MM-DD)".to_string(),
        )
    })?;
    let datetime = date.and_hms_opt(h, m, s).unwrap();
    Ok(Utc.from_utc_datetime(&datetime))
}

pub(crate) fn cache_key(query: &EventsQuery) -> String {
    format!(
        "status={}|start={}|end={}",
        query.status.as_deref().unwrap_or(""),
        query.start_date.as_deref().unwrap_or(""),
        query.end_date.as_deref().unwrap_or(""),
    )
}

fn export_time_zone(config: &AppConfig) -> Tz {
    Tz::from_str(&config.export.time_zone).unwrap_or(Tz::UTC)
}

fn csv_response(body: String, filename: &str) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

fn not_found(id: i64) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Professional {id} not found"))
}

fn store_http_err(e: StoreError) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Database error: {e}"),
    )
}

fn fetch_http_err(e: CalendlyError) -> (StatusCode, String) {
    match e {
        CalendlyError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "Calendly rejected the token".to_string(),
        ),
        CalendlyError::Upstream { code, message } => (
            StatusCode::BAD_GATEWAY,
            format!("Calendly error {code}: {message}"),
        ),
        CalendlyError::TokenRenewal => (
            StatusCode::BAD_GATEWAY,
            "unable to renew access token".to_string(),
        ),
        CalendlyError::AuthExchange { status, body } => (
            StatusCode::BAD_GATEWAY,
            format!("token exchange failed ({status}): {body}"),
        ),
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}
