// --- File: crates/calboard_common/src/services.rs ---
//! Service abstractions for the persistent collaborators.
//!
//! These traits decouple the core Calendly logic from the concrete storage
//! backend, which makes the orchestration and aggregation code testable with
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the persistent stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Database query error: {0}")]
    Query(String),
}

/// One OAuth credential row per (owner, organization) pair.
///
/// Tokens are overwritten in place on every refresh; rows are never deleted
/// by the core.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: i64,
    /// Opaque id of the authorizing account (trailing segment of its URI).
    pub owner: String,
    /// Opaque id of the organization (trailing segment of its URI).
    pub organization: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp of row creation; the most recent row is the active one.
    pub created_at: i64,
}

/// One tracked professional.
#[derive(Debug, Clone, Serialize)]
pub struct Professional {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Personal Calendly bearer token. Aggregation skips rows without one.
    pub token: Option<String>,
    /// Organization URI, lazily resolved from `/users/me` and cached here.
    pub organization: Option<String>,
}

/// Payload for creating or replacing a professional record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfessional {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
}

/// Persistent store for organization-level OAuth credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the existing row for (owner, organization) or creates one.
    async fn find_or_create(
        &self,
        owner: &str,
        organization: &str,
    ) -> Result<Credential, StoreError>;

    /// Overwrites the token pair on an existing credential row.
    async fn update_tokens(
        &self,
        id: i64,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError>;

    /// The most recently created credential, if any.
    async fn latest(&self) -> Result<Option<Credential>, StoreError>;
}

/// Persistent directory of tracked professionals.
#[async_trait]
pub trait ProfessionalDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<Professional>, StoreError>;

    async fn find(&self, id: i64) -> Result<Option<Professional>, StoreError>;

    async fn create(&self, new: NewProfessional) -> Result<Professional, StoreError>;

    /// Replaces the editable fields; returns `None` when the row is missing.
    async fn update(
        &self,
        id: i64,
        new: NewProfessional,
    ) -> Result<Option<Professional>, StoreError>;

    /// Returns `true` when a row was actually deleted.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Caches a lazily resolved organization URI onto the record.
    async fn set_organization(&self, id: i64, organization: &str) -> Result<(), StoreError>;
}
