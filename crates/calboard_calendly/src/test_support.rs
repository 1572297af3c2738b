//! Shared fakes and fixture builders for the crate's tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use calboard_common::services::{
    Credential, CredentialStore, NewProfessional, Professional, ProfessionalDirectory, StoreError,
};

use crate::error::CalendlyError;
use crate::fetcher::CalendlyApi;
use crate::models::{
    CurrentUser, EventFilters, EventMembership, ExchangedToken, ScheduledEvent, TokenPair,
};
use crate::oauth::TokenExchanger;

// --- Fixture builders ---

pub(crate) fn event(name: &str, start_offset_hours: i64) -> ScheduledEvent {
    let base = Utc.with_ymd_and_hms(2025, 5, 5, 12, 0, 0).unwrap();
    let start = base + Duration::hours(start_offset_hours);
    ScheduledEvent {
        uri: format!("https://api.calendly.com/scheduled_events/{name}"),
        name: Some(name.to_string()),
        status: "active".to_string(),
        created_at: base - Duration::days(1),
        start_time: start,
        end_time: start + Duration::hours(1),
        event_memberships: vec![EventMembership {
            user_name: Some("Host".to_string()),
            user_email: None,
        }],
        professional_name: None,
    }
}

pub(crate) fn professional(
    id: i64,
    name: &str,
    token: Option<&str>,
    organization: Option<&str>,
) -> Professional {
    Professional {
        id,
        name: name.to_string(),
        phone: None,
        email: None,
        token: token.map(|t| t.to_string()),
        organization: organization.map(|o| o.to_string()),
    }
}

pub(crate) fn credential() -> Credential {
    Credential {
        id: 1,
        owner: "OWNER1".to_string(),
        organization: "ORG1".to_string(),
        access_token: "org-access".to_string(),
        refresh_token: "org-refresh".to_string(),
        created_at: 1_700_000_000,
    }
}

// --- Scripted API: each scheduled_events call pops the next outcome ---

pub(crate) struct ScriptedApi {
    outcomes: Mutex<VecDeque<Result<Vec<ScheduledEvent>, CalendlyError>>>,
    pub events_calls: AtomicUsize,
    pub tokens_seen: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub(crate) fn new(outcomes: Vec<Result<Vec<ScheduledEvent>, CalendlyError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            events_calls: AtomicUsize::new(0),
            tokens_seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CalendlyApi for ScriptedApi {
    async fn current_user(&self, _token: &str) -> Result<CurrentUser, CalendlyError> {
        Ok(CurrentUser {
            uri: "https://api.calendly.com/users/USER1".to_string(),
            current_organization: "https://api.calendly.com/organizations/ORG1".to_string(),
        })
    }

    async fn scheduled_events(
        &self,
        token: &str,
        _organization: &str,
        _filters: &EventFilters,
    ) -> Result<Vec<ScheduledEvent>, CalendlyError> {
        self.events_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens_seen.lock().unwrap().push(token.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected extra scheduled_events call")
    }
}

// --- Table API: behavior keyed by bearer token ---

#[derive(Default)]
pub(crate) struct TableApi {
    orgs: Mutex<HashMap<String, String>>,
    events: Mutex<HashMap<String, Vec<ScheduledEvent>>>,
    bad_tokens: Mutex<HashSet<String>>,
    pub filters_seen: Mutex<Vec<EventFilters>>,
    pub events_calls: AtomicUsize,
}

impl TableApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(self, token: &str, organization_uri: &str) -> Self {
        self.orgs
            .lock()
            .unwrap()
            .insert(token.to_string(), organization_uri.to_string());
        self
    }

    pub(crate) fn with_events(self, token: &str, events: Vec<ScheduledEvent>) -> Self {
        self.events.lock().unwrap().insert(token.to_string(), events);
        self
    }

    pub(crate) fn with_bad_token(self, token: &str) -> Self {
        self.bad_tokens.lock().unwrap().insert(token.to_string());
        self
    }
}

#[async_trait]
impl CalendlyApi for TableApi {
    async fn current_user(&self, token: &str) -> Result<CurrentUser, CalendlyError> {
        if self.bad_tokens.lock().unwrap().contains(token) {
            return Err(CalendlyError::Unauthorized);
        }
        let orgs = self.orgs.lock().unwrap();
        let organization = orgs.get(token).cloned().ok_or(CalendlyError::Upstream {
            code: 404,
            message: "unknown user".to_string(),
        })?;
        Ok(CurrentUser {
            uri: format!("https://api.calendly.com/users/{token}"),
            current_organization: organization,
        })
    }

    async fn scheduled_events(
        &self,
        token: &str,
        _organization: &str,
        filters: &EventFilters,
    ) -> Result<Vec<ScheduledEvent>, CalendlyError> {
        self.events_calls.fetch_add(1, Ordering::SeqCst);
        self.filters_seen.lock().unwrap().push(filters.clone());
        if self.bad_tokens.lock().unwrap().contains(token) {
            return Err(CalendlyError::Unauthorized);
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or_default())
    }
}

// --- Fake token exchanger ---

pub(crate) struct FakeExchanger {
    pub exchange_result: Option<ExchangedToken>,
    pub refresh_pair: Option<TokenPair>,
    pub refresh_calls: AtomicUsize,
}

impl FakeExchanger {
    pub(crate) fn refusing() -> Self {
        Self {
            exchange_result: None,
            refresh_pair: None,
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn refreshing(pair: TokenPair) -> Self {
        Self {
            exchange_result: None,
            refresh_pair: Some(pair),
            refresh_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TokenExchanger for FakeExchanger {
    async fn exchange_code(&self, _code: &str) -> Result<ExchangedToken, CalendlyError> {
        self.exchange_result
            .clone()
            .ok_or(CalendlyError::AuthExchange {
                status: 400,
                body: "invalid code".to_string(),
            })
    }

    async fn refresh(&self, _refresh_token: &str) -> Option<TokenPair> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_pair.clone()
    }
}

// --- Fake credential store ---

#[derive(Default)]
pub(crate) struct FakeCredentialStore {
    pub credential: Mutex<Option<Credential>>,
    pub updates: Mutex<Vec<(i64, String, String)>>,
}

impl FakeCredentialStore {
    pub(crate) fn with_credential(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for FakeCredentialStore {
    async fn find_or_create(
        &self,
        owner: &str,
        organization: &str,
    ) -> Result<Credential, StoreError> {
        let mut guard = self.credential.lock().unwrap();
        if let Some(existing) = guard.as_ref() {
            if existing.owner == owner && existing.organization == organization {
                return Ok(existing.clone());
            }
        }
        let created = Credential {
            id: 1,
            owner: owner.to_string(),
            organization: organization.to_string(),
            access_token: String::new(),
            refresh_token: String::new(),
            created_at: 1_700_000_000,
        };
        *guard = Some(created.clone());
        Ok(created)
    }

    async fn update_tokens(
        &self,
        id: i64,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError> {
        self.updates
            .lock()
            .unwrap()
            .push((id, access_token.to_string(), refresh_token.to_string()));
        if let Some(credential) = self.credential.lock().unwrap().as_mut() {
            if credential.id == id {
                credential.access_token = access_token.to_string();
                credential.refresh_token = refresh_token.to_string();
            }
        }
        Ok(())
    }

    async fn latest(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.lock().unwrap().clone())
    }
}

// --- Fake professional directory ---

pub(crate) struct FakeDirectory {
    pub professionals: Mutex<Vec<Professional>>,
    next_id: AtomicI64,
    pub org_sets: Mutex<Vec<(i64, String)>>,
}

impl FakeDirectory {
    pub(crate) fn with(professionals: Vec<Professional>) -> Self {
        let next_id = professionals.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            professionals: Mutex::new(professionals),
            next_id: AtomicI64::new(next_id),
            org_sets: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProfessionalDirectory for FakeDirectory {
    async fn list(&self) -> Result<Vec<Professional>, StoreError> {
        Ok(self.professionals.lock().unwrap().clone())
    }

    async fn find(&self, id: i64) -> Result<Option<Professional>, StoreError> {
        Ok(self
            .professionals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create(&self, new: NewProfessional) -> Result<Professional, StoreError> {
        let created = Professional {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: new.name,
            phone: new.phone,
            email: new.email,
            token: new.token,
            organization: None,
        };
        self.professionals.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: i64,
        new: NewProfessional,
    ) -> Result<Option<Professional>, StoreError> {
        let mut guard = self.professionals.lock().unwrap();
        let Some(existing) = guard.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if existing.token != new.token {
            existing.organization = None;
        }
        existing.name = new.name;
        existing.phone = new.phone;
        existing.email = new.email;
        existing.token = new.token;
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut guard = self.professionals.lock().unwrap();
        let before = guard.len();
        guard.retain(|p| p.id != id);
        Ok(guard.len() != before)
    }

    async fn set_organization(&self, id: i64, organization: &str) -> Result<(), StoreError> {
        self.org_sets
            .lock()
            .unwrap()
            .push((id, organization.to_string()));
        if let Some(existing) = self
            .professionals
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == id)
        {
            existing.organization = Some(organization.to_string());
        }
        Ok(())
    }
}
