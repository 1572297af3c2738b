//! SQL implementation of the professional directory

use crate::DbClient;
use async_trait::async_trait;
use calboard_common::services::{NewProfessional, Professional, ProfessionalDirectory, StoreError};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

/// SQL implementation of the professional directory
#[derive(Debug, Clone)]
pub struct SqlProfessionalDirectory {
    db_client: DbClient,
}

impl SqlProfessionalDirectory {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

const COLUMNS: &str = "id, name, phone, email, token, organization";

fn row_to_professional(row: &SqliteRow) -> Result<Professional, StoreError> {
    Ok(Professional {
        id: row.try_get("id").map_err(query_err)?,
        name: row.try_get("name").map_err(query_err)?,
        phone: row.try_get("phone").map_err(query_err)?,
        email: row.try_get("email").map_err(query_err)?,
        token: row.try_get("token").map_err(query_err)?,
        organization: row.try_get("organization").map_err(query_err)?,
    })
}

fn query_err(e: sqlx::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

#[async_trait]
impl ProfessionalDirectory for SqlProfessionalDirectory {
    async fn list(&self) -> Result<Vec<Professional>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM professionals ORDER BY id"
        ))
        .fetch_all(self.db_client.pool())
        .await
        .map_err(query_err)?;

        rows.iter().map(row_to_professional).collect()
    }

    async fn find(&self, id: i64) -> Result<Option<Professional>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM professionals WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_err)?;

        row.as_ref().map(row_to_professional).transpose()
    }

    async fn create(&self, new: NewProfessional) -> Result<Professional, StoreError> {
        debug!(name = %new.name, "creating professional");

        let row = sqlx::query(&format!(
            "INSERT INTO professionals (name, phone, email, token)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.token)
        .fetch_one(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("failed to insert professional: {}", e);
            query_err(e)
        })?;

        row_to_professional(&row)
    }

    async fn update(
        &self,
        id: i64,
        new: NewProfessional,
    ) -> Result<Option<Professional>, StoreError> {
        // The cached organization is cleared whenever the token changes so it
        // gets re-resolved against the new token.
        let row = sqlx::query(&format!(
            "UPDATE professionals
             SET name = $1, phone = $2, email = $3,
                 organization = CASE WHEN token IS $4 THEN organization ELSE NULL END,
                 token = $4
             WHERE id = $5
             RETURNING {COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(&new.token)
        .bind(id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(query_err)?;

        row.as_ref().map(row_to_professional).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM professionals WHERE id = $1")
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_organization(&self, id: i64, organization: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE professionals SET organization = $1 WHERE id = $2")
            .bind(organization)
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(query_err)?;

        debug!(professional_id = id, organization, "cached resolved organization");
        Ok(())
    }
}
