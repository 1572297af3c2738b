//! SQL implementation of the credential store
//!
//! One row per (owner, organization) pair; the token columns are overwritten
//! in place on every refresh.

use crate::DbClient;
use async_trait::async_trait;
use calboard_common::services::{Credential, CredentialStore, StoreError};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, info};

/// SQL implementation of the credential store
#[derive(Debug, Clone)]
pub struct SqlCredentialStore {
    db_client: DbClient,
}

impl SqlCredentialStore {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn row_to_credential(row: &SqliteRow) -> Result<Credential, StoreError> {
    Ok(Credential {
        id: row.try_get("id").map_err(query_err)?,
        owner: row.try_get("owner").map_err(query_err)?,
        organization: row.try_get("organization").map_err(query_err)?,
        access_token: row.try_get("access_token").map_err(query_err)?,
        refresh_token: row.try_get("refresh_token").map_err(query_err)?,
        created_at: row.try_get("created_at").map_err(query_err)?,
    })
}

fn query_err(e: sqlx::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

#[async_trait]
impl CredentialStore for SqlCredentialStore {
    async fn find_or_create(
        &self,
        owner: &str,
        organization: &str,
    ) -> Result<Credential, StoreError> {
        debug!(owner, organization, "looking up credential");

        let existing = sqlx::query(
            "SELECT id, owner, organization, access_token, refresh_token, created_at
             FROM credentials WHERE owner = $1 AND organization = $2",
        )
        .bind(owner)
        .bind(organization)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(query_err)?;

        if let Some(row) = existing {
            return row_to_credential(&row);
        }

        let row = sqlx::query(
            "INSERT INTO credentials (owner, organization)
             VALUES ($1, $2)
             RETURNING id, owner, organization, access_token, refresh_token, created_at",
        )
        .bind(owner)
        .bind(organization)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("failed to insert credential: {}", e);
            query_err(e)
        })?;

        info!(owner, organization, "created credential row");
        row_to_credential(&row)
    }

    async fn update_tokens(
        &self,
        id: i64,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE credentials SET access_token = $1, refresh_token = $2 WHERE id = $3")
            .bind(access_token)
            .bind(refresh_token)
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("failed to update credential tokens: {}", e);
                query_err(e)
            })?;

        debug!(credential_id = id, "credential tokens updated");
        Ok(())
    }

    async fn latest(&self) -> Result<Option<Credential>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner, organization, access_token, refresh_token, created_at
             FROM credentials ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(query_err)?;

        row.as_ref().map(row_to_credential).transpose()
    }
}
