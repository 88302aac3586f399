//! Config store module
//!
//! Key -> JSON settings store backing CMS-style configuration screens.
//! Upserts are a single `INSERT ... ON CONFLICT` statement so concurrent
//! writers cannot interleave a select-then-write.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::AppError;

/// One config entry
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store for CMS-style key/value configuration
#[derive(Debug, Clone)]
pub struct ConfigStore {
    pool: PgPool,
}

impl ConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a config entry; `None` when the key has never been written.
    pub async fn get(&self, key: &str) -> Result<Option<ConfigEntry>, AppError> {
        let row: Option<(
            String,
            serde_json::Value,
            String,
            String,
            DateTime<Utc>,
            DateTime<Utc>,
        )> = sqlx::query_as(
            r#"
            SELECT key, value, created_by, updated_by, created_at, updated_at
            FROM configs
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(
            |(key, value, created_by, updated_by, created_at, updated_at)| ConfigEntry {
                key,
                value,
                created_by,
                updated_by,
                created_at,
                updated_at,
            },
        ))
    }

    /// Insert or overwrite a config entry.
    pub async fn upsert(
        &self,
        key: &str,
        value: serde_json::Value,
        user_id: &str,
    ) -> Result<ConfigEntry, AppError> {
        let row: (
            String,
            serde_json::Value,
            String,
            String,
            DateTime<Utc>,
            DateTime<Utc>,
        ) = sqlx::query_as(
            r#"
            INSERT INTO configs (key, value, created_by, updated_by)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING key, value, created_by, updated_by, created_at, updated_at
            "#,
        )
        .bind(key)
        .bind(&value)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let (key, value, created_by, updated_by, created_at, updated_at) = row;
        Ok(ConfigEntry {
            key,
            value,
            created_by,
            updated_by,
            created_at,
            updated_at,
        })
    }
}
