//! Image repository
//!
//! Mutations for product images after the initial aggregate write. Setting
//! `is_thumbnail` on an image demotes the product's previous thumbnail in
//! the same transaction, so at most one thumbnail exists per product.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::DomainError;
use crate::error::{AppError, AppResult};

use super::writer::NewProductImage;

#[derive(Debug, Clone, Serialize)]
pub struct Image {
    pub image_id: i32,
    pub product_id: i32,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_thumbnail: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateImage {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub is_thumbnail: Option<bool>,
}

type ImageRow = (i32, i32, String, Option<String>, i32, bool);

fn into_image(row: ImageRow) -> Image {
    let (image_id, product_id, image_url, alt_text, display_order, is_thumbnail) = row;
    Image {
        image_id,
        product_id,
        image_url,
        alt_text,
        display_order,
        is_thumbnail,
    }
}

/// Repository for product image mutations
#[derive(Debug, Clone)]
pub struct ImageRepository {
    pool: PgPool,
}

impl ImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add an image to an existing product. A thumbnail flag demotes the
    /// product's current thumbnail.
    pub async fn create(&self, product_id: i32, input: NewProductImage) -> AppResult<Image> {
        if input.image_url.trim().is_empty() {
            return Err(DomainError::validation("image url must not be empty").into());
        }

        let mut tx = self.pool.begin().await?;

        if input.is_thumbnail {
            demote_thumbnail(&mut tx, product_id).await?;
        }

        let row: ImageRow = sqlx::query_as(
            r#"
            INSERT INTO product_images (
                product_id, image_url, alt_text, display_order, is_thumbnail
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING image_id, product_id, image_url, alt_text, display_order, is_thumbnail
            "#,
        )
        .bind(product_id)
        .bind(&input.image_url)
        .bind(&input.alt_text)
        .bind(input.display_order)
        .bind(input.is_thumbnail)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("product_images_product_id_fkey") =>
            {
                DomainError::not_found("product", product_id).into()
            }
            _ => AppError::Database(e),
        })?;

        tx.commit().await?;

        tracing::info!(product_id, image_id = row.0, "Image created");
        Ok(into_image(row))
    }

    pub async fn update(&self, image_id: i32, changes: UpdateImage) -> AppResult<Image> {
        let mut tx = self.pool.begin().await?;

        let product_id: Option<i32> = sqlx::query_scalar(
            "SELECT product_id FROM product_images WHERE image_id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(image_id)
        .fetch_optional(&mut *tx)
        .await?;

        let product_id =
            product_id.ok_or_else(|| DomainError::not_found("image", image_id))?;

        if changes.is_thumbnail == Some(true) {
            demote_thumbnail(&mut tx, product_id).await?;
        }

        let row: Option<ImageRow> = sqlx::query_as(
            r#"
            UPDATE product_images
            SET image_url = COALESCE($2, image_url),
                alt_text = COALESCE($3, alt_text),
                display_order = COALESCE($4, display_order),
                is_thumbnail = COALESCE($5, is_thumbnail),
                updated_at = NOW()
            WHERE image_id = $1 AND deleted_at IS NULL
            RETURNING image_id, product_id, image_url, alt_text, display_order, is_thumbnail
            "#,
        )
        .bind(image_id)
        .bind(&changes.image_url)
        .bind(&changes.alt_text)
        .bind(changes.display_order)
        .bind(changes.is_thumbnail)
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or_else(|| DomainError::not_found("image", image_id))?;

        tx.commit().await?;
        Ok(into_image(row))
    }

    /// Soft delete
    pub async fn delete(&self, image_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_images
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE image_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(image_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("image", image_id).into());
        }

        Ok(())
    }
}

async fn demote_thumbnail(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE product_images
        SET is_thumbnail = FALSE, updated_at = NOW()
        WHERE product_id = $1 AND is_thumbnail AND deleted_at IS NULL
        "#,
    )
    .bind(product_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_image_deserialize_partial() {
        let changes: UpdateImage =
            serde_json::from_str(r#"{"is_thumbnail": true}"#).unwrap();
        assert_eq!(changes.is_thumbnail, Some(true));
        assert!(changes.image_url.is_none());
        assert!(changes.display_order.is_none());
    }
}
