//! Variant repository
//!
//! Mutations for product variants after the initial aggregate write, plus
//! CRUD for the per-variant supplement facts label panel. Nutrition facts
//! belong to the product; supplement facts belong to one variant.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::domain::{stock, DomainError};
use crate::error::{AppError, AppResult};

use super::writer::NewProductVariant;

#[derive(Debug, Clone, Serialize)]
pub struct Variant {
    pub variant_id: i32,
    pub product_id: i32,
    pub package_description: String,
    pub stock_number: String,
    pub price: Decimal,
    pub currency: String,
    pub is_in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVariant {
    #[serde(default)]
    pub package_description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub is_in_stock: Option<bool>,
}

impl UpdateVariant {
    fn validate(&self) -> Result<(), DomainError> {
        if let Some(desc) = &self.package_description {
            if desc.trim().is_empty() {
                return Err(DomainError::validation(
                    "variant package description must not be empty",
                ));
            }
        }
        if let Some(price) = self.price {
            if price <= Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "variant price must be positive (got {})",
                    price
                )));
            }
        }
        if let Some(currency) = &self.currency {
            if currency.len() != 3 {
                return Err(DomainError::validation(format!(
                    "variant currency must be a 3-letter code (got {:?})",
                    currency
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplementFact {
    pub fact_id: i32,
    pub variant_id: i32,
    pub ingredient_name: String,
    pub amount_per_serving: String,
    pub percent_daily_value: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplementFact {
    pub ingredient_name: String,
    pub amount_per_serving: String,
    #[serde(default)]
    pub percent_daily_value: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSupplementFact {
    #[serde(default)]
    pub ingredient_name: Option<String>,
    #[serde(default)]
    pub amount_per_serving: Option<String>,
    #[serde(default)]
    pub percent_daily_value: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

type VariantRow = (
    i32,
    i32,
    String,
    String,
    Decimal,
    String,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn into_variant(row: VariantRow) -> Variant {
    let (
        variant_id,
        product_id,
        package_description,
        stock_number,
        price,
        currency,
        is_in_stock,
        created_at,
        updated_at,
    ) = row;
    Variant {
        variant_id,
        product_id,
        package_description,
        stock_number,
        price,
        currency,
        is_in_stock,
        created_at,
        updated_at,
    }
}

type FactRow = (i32, i32, String, String, Option<String>, i32);

fn into_fact(row: FactRow) -> SupplementFact {
    let (fact_id, variant_id, ingredient_name, amount_per_serving, percent_daily_value, display_order) =
        row;
    SupplementFact {
        fact_id,
        variant_id,
        ingredient_name,
        amount_per_serving,
        percent_daily_value,
        display_order,
    }
}

/// Repository for variant and supplement-fact mutations
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: PgPool,
}

impl VariantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a variant to an existing product. The stock number is generated
    /// server-side, same as in the aggregate write.
    pub async fn create(&self, product_id: i32, input: NewProductVariant) -> AppResult<Variant> {
        input.validate()?;

        let stock_number = stock::generate();
        let row: VariantRow = sqlx::query_as(
            r#"
            INSERT INTO product_variants (
                product_id, package_description, stock_number,
                price, currency, is_in_stock
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING variant_id, product_id, package_description, stock_number,
                      price, currency, is_in_stock, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(&input.package_description)
        .bind(&stock_number)
        .bind(input.price)
        .bind(&input.currency)
        .bind(input.is_in_stock)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("product_variants_product_id_fkey") =>
            {
                DomainError::not_found("product", product_id).into()
            }
            _ => AppError::Database(e),
        })?;

        tracing::info!(product_id, variant_id = row.0, "Variant created");
        Ok(into_variant(row))
    }

    pub async fn update(&self, variant_id: i32, changes: UpdateVariant) -> AppResult<Variant> {
        changes.validate()?;

        let row: Option<VariantRow> = sqlx::query_as(
            r#"
            UPDATE product_variants
            SET package_description = COALESCE($2, package_description),
                price = COALESCE($3, price),
                currency = COALESCE($4, currency),
                is_in_stock = COALESCE($5, is_in_stock),
                updated_at = NOW()
            WHERE variant_id = $1 AND deleted_at IS NULL
            RETURNING variant_id, product_id, package_description, stock_number,
                      price, currency, is_in_stock, created_at, updated_at
            "#,
        )
        .bind(variant_id)
        .bind(&changes.package_description)
        .bind(changes.price)
        .bind(&changes.currency)
        .bind(changes.is_in_stock)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_variant)
            .ok_or_else(|| DomainError::not_found("variant", variant_id).into())
    }

    /// Soft delete
    pub async fn delete(&self, variant_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product_variants
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE variant_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(variant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("variant", variant_id).into());
        }

        Ok(())
    }

    // =========================================================================
    // Supplement facts
    // =========================================================================

    pub async fn list_supplement_facts(&self, variant_id: i32) -> AppResult<Vec<SupplementFact>> {
        let rows: Vec<FactRow> = sqlx::query_as(
            r#"
            SELECT fact_id, variant_id, ingredient_name, amount_per_serving,
                   percent_daily_value, display_order
            FROM supplement_facts
            WHERE variant_id = $1 AND deleted_at IS NULL
            ORDER BY display_order, fact_id
            "#,
        )
        .bind(variant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_fact).collect())
    }

    pub async fn create_supplement_fact(
        &self,
        variant_id: i32,
        input: NewSupplementFact,
    ) -> AppResult<SupplementFact> {
        if input.ingredient_name.trim().is_empty() {
            return Err(DomainError::validation("ingredient name must not be empty").into());
        }

        let row: FactRow = sqlx::query_as(
            r#"
            INSERT INTO supplement_facts (
                variant_id, ingredient_name, amount_per_serving,
                percent_daily_value, display_order
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING fact_id, variant_id, ingredient_name, amount_per_serving,
                      percent_daily_value, display_order
            "#,
        )
        .bind(variant_id)
        .bind(&input.ingredient_name)
        .bind(&input.amount_per_serving)
        .bind(&input.percent_daily_value)
        .bind(input.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("supplement_facts_variant_id_fkey") =>
            {
                DomainError::not_found("variant", variant_id).into()
            }
            _ => AppError::Database(e),
        })?;

        Ok(into_fact(row))
    }

    pub async fn update_supplement_fact(
        &self,
        fact_id: i32,
        changes: UpdateSupplementFact,
    ) -> AppResult<SupplementFact> {
        let row: Option<FactRow> = sqlx::query_as(
            r#"
            UPDATE supplement_facts
            SET ingredient_name = COALESCE($2, ingredient_name),
                amount_per_serving = COALESCE($3, amount_per_serving),
                percent_daily_value = COALESCE($4, percent_daily_value),
                display_order = COALESCE($5, display_order),
                updated_at = NOW()
            WHERE fact_id = $1 AND deleted_at IS NULL
            RETURNING fact_id, variant_id, ingredient_name, amount_per_serving,
                      percent_daily_value, display_order
            "#,
        )
        .bind(fact_id)
        .bind(&changes.ingredient_name)
        .bind(&changes.amount_per_serving)
        .bind(&changes.percent_daily_value)
        .bind(changes.display_order)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_fact)
            .ok_or_else(|| DomainError::not_found("supplement fact", fact_id).into())
    }

    /// Soft delete
    pub async fn delete_supplement_fact(&self, fact_id: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE supplement_facts
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE fact_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(fact_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("supplement fact", fact_id).into());
        }

        Ok(())
    }
}
