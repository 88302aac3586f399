//! Brand repository
//!
//! CRUD over the brands table with soft-delete filtering and id-cursor
//! pagination on the list path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::DomainError;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub brand_id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBrand {
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBrand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

type BrandRow = (
    i32,
    String,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn into_brand(row: BrandRow) -> Brand {
    let (brand_id, name, logo_url, description, created_at, updated_at) = row;
    Brand {
        brand_id,
        name,
        logo_url,
        description,
        created_at,
        updated_at,
    }
}

/// Repository for brand CRUD
#[derive(Debug, Clone)]
pub struct BrandRepository {
    pool: PgPool,
}

impl BrandRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List brands, excluding soft-deleted rows. `name` filters by substring,
    /// `cursor` is the last brand id of the previous page.
    pub async fn list(
        &self,
        name: Option<&str>,
        cursor: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Brand>, AppError> {
        let rows: Vec<BrandRow> = if let Some(name) = name {
            sqlx::query_as(
                r#"
                SELECT brand_id, name, logo_url, description, created_at, updated_at
                FROM brands
                WHERE deleted_at IS NULL AND brand_id > $1 AND name ILIKE '%' || $2 || '%'
                ORDER BY brand_id
                LIMIT $3
                "#,
            )
            .bind(cursor.unwrap_or(0))
            .bind(name)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                r#"
                SELECT brand_id, name, logo_url, description, created_at, updated_at
                FROM brands
                WHERE deleted_at IS NULL AND brand_id > $1
                ORDER BY brand_id
                LIMIT $2
                "#,
            )
            .bind(cursor.unwrap_or(0))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(into_brand).collect())
    }

    pub async fn get(&self, brand_id: i32) -> Result<Brand, AppError> {
        let row: Option<BrandRow> = sqlx::query_as(
            r#"
            SELECT brand_id, name, logo_url, description, created_at, updated_at
            FROM brands
            WHERE brand_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(brand_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_brand)
            .ok_or_else(|| DomainError::not_found("brand", brand_id).into())
    }

    pub async fn create(&self, input: NewBrand) -> Result<Brand, AppError> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("brand name must not be empty").into());
        }

        let row: BrandRow = sqlx::query_as(
            r#"
            INSERT INTO brands (name, logo_url, description)
            VALUES ($1, $2, $3)
            RETURNING brand_id, name, logo_url, description, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.logo_url)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.constraint() == Some("brands_name_key") => {
                DomainError::conflict(format!("brand name already exists: {}", input.name)).into()
            }
            _ => AppError::Database(e),
        })?;

        Ok(into_brand(row))
    }

    pub async fn update(&self, brand_id: i32, changes: UpdateBrand) -> Result<Brand, AppError> {
        let row: Option<BrandRow> = sqlx::query_as(
            r#"
            UPDATE brands
            SET name = COALESCE($2, name),
                logo_url = COALESCE($3, logo_url),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE brand_id = $1 AND deleted_at IS NULL
            RETURNING brand_id, name, logo_url, description, created_at, updated_at
            "#,
        )
        .bind(brand_id)
        .bind(&changes.name)
        .bind(&changes.logo_url)
        .bind(&changes.description)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_brand)
            .ok_or_else(|| DomainError::not_found("brand", brand_id).into())
    }

    /// Soft delete
    pub async fn delete(&self, brand_id: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE brands
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE brand_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(brand_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("brand", brand_id).into());
        }

        Ok(())
    }
}
