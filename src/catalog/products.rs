//! Product read queries
//!
//! List/detail paths for products and their dependent rows. Lists join the
//! brand name and exclude soft-deleted products; dependent-row queries
//! likewise skip soft-deleted variants and images.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::domain::DomainError;
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_id: i32,
    pub brand_id: i32,
    pub brand_name: String,
    pub name: String,
    pub base_description: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product_id: i32,
    pub brand_id: i32,
    pub brand_name: String,
    pub name: String,
    pub base_description: Option<String>,
    pub date_first_available: Option<NaiveDate>,
    pub manufacturer_website_url: Option<String>,
    pub isura_verified: bool,
    pub non_gmo_documentation: bool,
    pub mass_spec_lab_tested: bool,
    pub detailed_description: Option<String>,
    pub suggested_use: Option<String>,
    pub other_ingredients: Option<String>,
    pub warnings: Option<String>,
    pub disclaimer: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductVariantRow {
    pub variant_id: i32,
    pub package_description: String,
    pub stock_number: String,
    pub price: Decimal,
    pub currency: String,
    pub is_in_stock: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductImageRow {
    pub image_id: i32,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_thumbnail: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NutritionFactRow {
    pub fact_id: i32,
    pub ingredient: String,
    pub amount_per_serving: String,
    pub percent_daily_value: Option<String>,
    pub display_order: i32,
}

/// Read-side queries for the product catalog
#[derive(Debug, Clone)]
pub struct ProductQuery {
    pool: PgPool,
}

impl ProductQuery {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List products joined with their brand name.
    pub async fn list(
        &self,
        name: Option<&str>,
        cursor: Option<i32>,
        limit: i64,
    ) -> Result<Vec<ProductSummary>, AppError> {
        type Row = (
            i32,
            i32,
            String,
            String,
            Option<String>,
            bool,
            DateTime<Utc>,
        );

        let rows: Vec<Row> = if let Some(name) = name {
            sqlx::query_as(
                r#"
                SELECT p.product_id, p.brand_id, b.name, p.name,
                       p.base_description, p.is_featured, p.created_at
                FROM products p
                INNER JOIN brands b ON b.brand_id = p.brand_id
                WHERE p.deleted_at IS NULL AND p.product_id > $1
                  AND p.name ILIKE '%' || $2 || '%'
                ORDER BY p.product_id
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
                SELECT p.product_id, p.brand_id, b.name, p.name,
                       p.base_description, p.is_featured, p.created_at
                FROM products p
                INNER JOIN brands b ON b.brand_id = p.brand_id
                WHERE p.deleted_at IS NULL AND p.product_id > $1
                ORDER BY p.product_id
                LIMIT $2
                "#,
            )
            .bind(cursor.unwrap_or(0))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows
            .into_iter()
            .map(
                |(product_id, brand_id, brand_name, name, base_description, is_featured, created_at)| {
                    ProductSummary {
                        product_id,
                        brand_id,
                        brand_name,
                        name,
                        base_description,
                        is_featured,
                        created_at,
                    }
                },
            )
            .collect())
    }

    pub async fn get(&self, product_id: i32) -> Result<ProductDetail, AppError> {
        use sqlx::Row as _;

        let row = sqlx::query(
            r#"
            SELECT p.brand_id, b.name, p.name, p.base_description,
                   p.date_first_available, p.manufacturer_website_url,
                   p.isura_verified, p.non_gmo_documentation, p.mass_spec_lab_tested,
                   p.detailed_description, p.suggested_use, p.other_ingredients,
                   p.warnings, p.disclaimer, p.is_featured, p.created_at, p.updated_at
            FROM products p
            INNER JOIN brands b ON b.brand_id = p.brand_id
            WHERE p.product_id = $1 AND p.deleted_at IS NULL
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| DomainError::not_found("product", product_id))?;

        let brand_id: i32 = row.try_get(0)?;
        let brand_name: String = row.try_get(1)?;
        let name: String = row.try_get(2)?;
        let base_description: Option<String> = row.try_get(3)?;
        let date_first_available: Option<NaiveDate> = row.try_get(4)?;
        let manufacturer_website_url: Option<String> = row.try_get(5)?;
        let isura_verified: bool = row.try_get(6)?;
        let non_gmo_documentation: bool = row.try_get(7)?;
        let mass_spec_lab_tested: bool = row.try_get(8)?;
        let detailed_description: Option<String> = row.try_get(9)?;
        let suggested_use: Option<String> = row.try_get(10)?;
        let other_ingredients: Option<String> = row.try_get(11)?;
        let warnings: Option<String> = row.try_get(12)?;
        let disclaimer: Option<String> = row.try_get(13)?;
        let is_featured: bool = row.try_get(14)?;
        let created_at: DateTime<Utc> = row.try_get(15)?;
        let updated_at: DateTime<Utc> = row.try_get(16)?;

        Ok(ProductDetail {
            product_id,
            brand_id,
            brand_name,
            name,
            base_description,
            date_first_available,
            manufacturer_website_url,
            isura_verified,
            non_gmo_documentation,
            mass_spec_lab_tested,
            detailed_description,
            suggested_use,
            other_ingredients,
            warnings,
            disclaimer,
            is_featured,
            created_at,
            updated_at,
        })
    }

    pub async fn list_variants(&self, product_id: i32) -> Result<Vec<ProductVariantRow>, AppError> {
        let rows: Vec<(i32, String, String, Decimal, String, bool)> = sqlx::query_as(
            r#"
            SELECT variant_id, package_description, stock_number, price, currency, is_in_stock
            FROM product_variants
            WHERE product_id = $1 AND deleted_at IS NULL
            ORDER BY variant_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(variant_id, package_description, stock_number, price, currency, is_in_stock)| {
                    ProductVariantRow {
                        variant_id,
                        package_description,
                        stock_number,
                        price,
                        currency,
                        is_in_stock,
                    }
                },
            )
            .collect())
    }

    pub async fn list_images(&self, product_id: i32) -> Result<Vec<ProductImageRow>, AppError> {
        let rows: Vec<(i32, String, Option<String>, i32, bool)> = sqlx::query_as(
            r#"
            SELECT image_id, image_url, alt_text, display_order, is_thumbnail
            FROM product_images
            WHERE product_id = $1 AND deleted_at IS NULL
            ORDER BY display_order, image_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(image_id, image_url, alt_text, display_order, is_thumbnail)| ProductImageRow {
                    image_id,
                    image_url,
                    alt_text,
                    display_order,
                    is_thumbnail,
                },
            )
            .collect())
    }

    pub async fn list_nutrition_facts(
        &self,
        product_id: i32,
    ) -> Result<Vec<NutritionFactRow>, AppError> {
        let rows: Vec<(i32, String, String, Option<String>, i32)> = sqlx::query_as(
            r#"
            SELECT fact_id, ingredient, amount_per_serving, percent_daily_value, display_order
            FROM nutrition_facts
            WHERE product_id = $1
            ORDER BY display_order, fact_id
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(fact_id, ingredient, amount_per_serving, percent_daily_value, display_order)| {
                    NutritionFactRow {
                        fact_id,
                        ingredient,
                        amount_per_serving,
                        percent_daily_value,
                        display_order,
                    }
                },
            )
            .collect())
    }
}
