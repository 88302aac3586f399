//! Product Aggregate Writer
//!
//! All-or-nothing creation of a product together with its category links,
//! nutrition facts, images and variants. One transaction wraps every insert;
//! a failure anywhere rolls back the product row too.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{stock, DomainError};
use crate::error::AppError;

// =========================================================================
// Input types
// =========================================================================

/// Scalar product fields plus the dependent collections, validated as a unit
/// before any write happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductAggregate {
    pub brand_id: i32,
    pub name: String,
    #[serde(default)]
    pub base_description: Option<String>,
    #[serde(default)]
    pub date_first_available: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub manufacturer_website_url: Option<String>,
    #[serde(default)]
    pub isura_verified: bool,
    #[serde(default)]
    pub non_gmo_documentation: bool,
    #[serde(default)]
    pub mass_spec_lab_tested: bool,
    #[serde(default)]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub suggested_use: Option<String>,
    #[serde(default)]
    pub other_ingredients: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    pub category_ids: Vec<i32>,
    #[serde(default)]
    pub nutrition_facts: Vec<NewNutritionFact>,
    #[serde(default)]
    pub images: Vec<NewProductImage>,
    #[serde(default)]
    pub variants: Vec<NewProductVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNutritionFact {
    pub ingredient: String,
    pub amount_per_serving: String,
    #[serde(default)]
    pub percent_daily_value: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductImage {
    pub image_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_thumbnail: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductVariant {
    pub package_description: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(default = "default_in_stock")]
    pub is_in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

impl NewProductVariant {
    /// Structural checks shared by the aggregate writer and the standalone
    /// variant create path.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.package_description.trim().is_empty() {
            return Err(DomainError::validation(
                "variant package description must not be empty",
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "variant price must be positive (got {})",
                self.price
            )));
        }
        if self.currency.len() != 3 {
            return Err(DomainError::validation(format!(
                "variant currency must be a 3-letter code (got {:?})",
                self.currency
            )));
        }
        Ok(())
    }
}

impl NewProductAggregate {
    /// Structural validation, run before the transaction is opened.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name must not be empty"));
        }

        if self.category_ids.is_empty() {
            return Err(DomainError::validation(
                "at least one category is required",
            ));
        }

        let thumbnails = self.images.iter().filter(|img| img.is_thumbnail).count();
        if thumbnails > 1 {
            return Err(DomainError::validation(format!(
                "at most one image may be the thumbnail (got {})",
                thumbnails
            )));
        }

        for variant in &self.variants {
            variant.validate()?;
        }

        Ok(())
    }
}

/// Partial update of the product scalars. `None` fields are left untouched;
/// dependent rows (variants, images, facts) have their own mutation paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    #[serde(default)]
    pub brand_id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_description: Option<String>,
    #[serde(default)]
    pub date_first_available: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub manufacturer_website_url: Option<String>,
    #[serde(default)]
    pub isura_verified: Option<bool>,
    #[serde(default)]
    pub non_gmo_documentation: Option<bool>,
    #[serde(default)]
    pub mass_spec_lab_tested: Option<bool>,
    #[serde(default)]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub suggested_use: Option<String>,
    #[serde(default)]
    pub other_ingredients: Option<String>,
    #[serde(default)]
    pub warnings: Option<String>,
    #[serde(default)]
    pub disclaimer: Option<String>,
    #[serde(default)]
    pub is_featured: Option<bool>,
}

/// Result of a successful aggregate creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductResult {
    pub product_id: i32,
    /// Stock numbers generated for the inserted variants, in input order
    pub stock_numbers: Vec<String>,
}

// =========================================================================
// Writer
// =========================================================================

/// Writer for the product aggregate
#[derive(Debug, Clone)]
pub struct ProductAggregateWriter {
    pool: PgPool,
}

impl ProductAggregateWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a product and all dependent rows, or nothing at all.
    pub async fn create(
        &self,
        input: NewProductAggregate,
    ) -> Result<CreateProductResult, AppError> {
        input.validate()?;

        let mut tx = self.pool.begin().await?;

        let product_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO products (
                brand_id, name, base_description, date_first_available,
                manufacturer_website_url, isura_verified, non_gmo_documentation,
                mass_spec_lab_tested, detailed_description, suggested_use,
                other_ingredients, warnings, disclaimer
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING product_id
            "#,
        )
        .bind(input.brand_id)
        .bind(&input.name)
        .bind(&input.base_description)
        .bind(input.date_first_available)
        .bind(&input.manufacturer_website_url)
        .bind(input.isura_verified)
        .bind(input.non_gmo_documentation)
        .bind(input.mass_spec_lab_tested)
        .bind(&input.detailed_description)
        .bind(&input.suggested_use)
        .bind(&input.other_ingredients)
        .bind(&input.warnings)
        .bind(&input.disclaimer)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_error)?;

        for category_id in &input.category_ids {
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)",
            )
            .bind(product_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await
            .map_err(map_constraint_error)?;
        }

        for fact in &input.nutrition_facts {
            sqlx::query(
                r#"
                INSERT INTO nutrition_facts (
                    product_id, ingredient, amount_per_serving,
                    percent_daily_value, display_order
                )
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product_id)
            .bind(&fact.ingredient)
            .bind(&fact.amount_per_serving)
            .bind(&fact.percent_daily_value)
            .bind(fact.display_order)
            .execute(&mut *tx)
            .await?;
        }

        for image in &input.images {
            sqlx::query(
                r#"
                INSERT INTO product_images (
                    product_id, image_url, alt_text, display_order, is_thumbnail
                )
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product_id)
            .bind(&image.image_url)
            .bind(&image.alt_text)
            .bind(image.display_order)
            .bind(image.is_thumbnail)
            .execute(&mut *tx)
            .await?;
        }

        let mut stock_numbers = Vec::with_capacity(input.variants.len());
        for variant in &input.variants {
            let stock_number = stock::generate();
            sqlx::query(
                r#"
                INSERT INTO product_variants (
                    product_id, package_description, stock_number,
                    price, currency, is_in_stock
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(product_id)
            .bind(&variant.package_description)
            .bind(&stock_number)
            .bind(variant.price)
            .bind(&variant.currency)
            .bind(variant.is_in_stock)
            .execute(&mut *tx)
            .await?;
            stock_numbers.push(stock_number);
        }

        tx.commit().await?;

        tracing::info!(
            product_id,
            categories = input.category_ids.len(),
            variants = input.variants.len(),
            images = input.images.len(),
            nutrition_facts = input.nutrition_facts.len(),
            "Product aggregate created"
        );

        Ok(CreateProductResult {
            product_id,
            stock_numbers,
        })
    }

    /// Update the product scalars. `None` fields keep their current value.
    pub async fn update_product(
        &self,
        product_id: i32,
        changes: UpdateProduct,
    ) -> Result<(), AppError> {
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name must not be empty").into());
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET brand_id = COALESCE($2, brand_id),
                name = COALESCE($3, name),
                base_description = COALESCE($4, base_description),
                date_first_available = COALESCE($5, date_first_available),
                manufacturer_website_url = COALESCE($6, manufacturer_website_url),
                isura_verified = COALESCE($7, isura_verified),
                non_gmo_documentation = COALESCE($8, non_gmo_documentation),
                mass_spec_lab_tested = COALESCE($9, mass_spec_lab_tested),
                detailed_description = COALESCE($10, detailed_description),
                suggested_use = COALESCE($11, suggested_use),
                other_ingredients = COALESCE($12, other_ingredients),
                warnings = COALESCE($13, warnings),
                disclaimer = COALESCE($14, disclaimer),
                is_featured = COALESCE($15, is_featured),
                updated_at = NOW()
            WHERE product_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(product_id)
        .bind(changes.brand_id)
        .bind(&changes.name)
        .bind(&changes.base_description)
        .bind(changes.date_first_available)
        .bind(&changes.manufacturer_website_url)
        .bind(changes.isura_verified)
        .bind(changes.non_gmo_documentation)
        .bind(changes.mass_spec_lab_tested)
        .bind(&changes.detailed_description)
        .bind(&changes.suggested_use)
        .bind(&changes.other_ingredients)
        .bind(&changes.warnings)
        .bind(&changes.disclaimer)
        .bind(changes.is_featured)
        .execute(&self.pool)
        .await
        .map_err(map_constraint_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("product", product_id).into());
        }

        tracing::info!(product_id, "Product updated");
        Ok(())
    }

    /// Soft-delete a product. Fails with NotFound when the product does not
    /// exist or was already deleted.
    pub async fn delete_product(&self, product_id: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE product_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("product", product_id).into());
        }

        tracing::info!(product_id, "Product soft-deleted");
        Ok(())
    }
}

/// Map foreign-key violations on the aggregate inserts to NotFound, so an
/// unknown brand/category id surfaces as a 404 rather than a 500.
fn map_constraint_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        match db.constraint() {
            Some("products_brand_id_fkey") => {
                return DomainError::not_found("brand", "referenced by product").into();
            }
            Some("product_categories_category_id_fkey") => {
                return DomainError::not_found("category", "referenced by product").into();
            }
            _ => {}
        }
    }
    AppError::Database(e)
}
