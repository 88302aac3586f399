//! Category repository
//!
//! Categories form a tree via `parent_category_id`. Nothing here prevents a
//! category from being its own ancestor; the admin UI is trusted not to
//! build cycles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::DomainError;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub parent_category_id: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub parent_category_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_category_id: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

type CategoryRow = (
    i32,
    String,
    Option<i32>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn into_category(row: CategoryRow) -> Category {
    let (category_id, name, parent_category_id, description, created_at, updated_at) = row;
    Category {
        category_id,
        name,
        parent_category_id,
        description,
        created_at,
        updated_at,
    }
}

/// Repository for category CRUD
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        name: Option<&str>,
        cursor: Option<i32>,
        limit: i64,
    ) -> Result<Vec<Category>, AppError> {
        let rows: Vec<CategoryRow> = if let Some(name) = name {
            sqlx::query_as(
                r#"
                SELECT category_id, name, parent_category_id, description, created_at, updated_at
                FROM categories
                WHERE deleted_at IS NULL AND category_id > $1 AND name ILIKE '%' || $2 || '%'
                ORDER BY category_id
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
                SELECT category_id, name, parent_category_id, description, created_at, updated_at
                FROM categories
                WHERE deleted_at IS NULL AND category_id > $1
                ORDER BY category_id
                LIMIT $2
                "#,
            )
            .bind(cursor.unwrap_or(0))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(into_category).collect())
    }

    pub async fn get(&self, category_id: i32) -> Result<Category, AppError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            SELECT category_id, name, parent_category_id, description, created_at, updated_at
            FROM categories
            WHERE category_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_category)
            .ok_or_else(|| DomainError::not_found("category", category_id).into())
    }

    pub async fn create(&self, input: NewCategory) -> Result<Category, AppError> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("category name must not be empty").into());
        }

        let row: CategoryRow = sqlx::query_as(
            r#"
            INSERT INTO categories (name, parent_category_id, description)
            VALUES ($1, $2, $3)
            RETURNING category_id, name, parent_category_id, description, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.parent_category_id)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(into_category(row))
    }

    pub async fn update(
        &self,
        category_id: i32,
        changes: UpdateCategory,
    ) -> Result<Category, AppError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                parent_category_id = COALESCE($3, parent_category_id),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE category_id = $1 AND deleted_at IS NULL
            RETURNING category_id, name, parent_category_id, description, created_at, updated_at
            "#,
        )
        .bind(category_id)
        .bind(changes.name)
        .bind(changes.parent_category_id)
        .bind(changes.description)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_category)
            .ok_or_else(|| DomainError::not_found("category", category_id).into())
    }

    /// Soft delete
    pub async fn delete(&self, category_id: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE category_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(category_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("category", category_id).into());
        }

        Ok(())
    }
}
