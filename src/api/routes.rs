//! API Routes
//!
//! HTTP endpoint definitions. Status values arrive as strings and are parsed
//! into their sum types here; the handlers below can then assume well-typed
//! input.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::catalog::{
    brands::{Brand, NewBrand, UpdateBrand},
    categories::{Category, NewCategory, UpdateCategory},
    images::{Image, UpdateImage},
    products::{NutritionFactRow, ProductDetail, ProductImageRow, ProductSummary, ProductVariantRow},
    variants::{NewSupplementFact, SupplementFact, UpdateSupplementFact, UpdateVariant, Variant},
    BrandRepository, CategoryRepository, CreateProductResult, ImageRepository, NewProductAggregate,
    NewProductImage, NewProductVariant, ProductAggregateWriter, ProductQuery, UpdateProduct,
    VariantRepository,
};
use crate::configstore::{ConfigEntry, ConfigStore};
use crate::domain::{DomainError, OrderStatus, PaymentStatus};
use crate::error::AppError;
use crate::orders::{
    OrderDetail, OrderLifecycleHandler, OrderStatusResult, OrderSummary, PaymentStatusResult,
    UpdateOrderStatusCommand, UpdatePaymentStatusCommand, VerifyPaymentResult,
};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Default/maximum page size for list endpoints
    pub page_size: i64,
}

impl AppState {
    pub fn new(pool: PgPool, page_size: i64) -> Self {
        Self { pool, page_size }
    }
}

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Substring filter on the name column
    #[serde(default)]
    pub name: Option<String>,
    /// Last id of the previous page
    #[serde(default)]
    pub cursor: Option<i32>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListQuery {
    fn limit_or(&self, page_size: i64) -> i64 {
        self.limit.unwrap_or(page_size).clamp(1, page_size)
    }
}

#[derive(Debug, Deserialize)]
pub struct CursorQuery {
    #[serde(default)]
    pub cursor: Option<i32>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertConfigRequest {
    pub value: serde_json::Value,
    #[serde(default = "default_updated_by")]
    pub updated_by: String,
}

fn default_updated_by() -> String {
    "system".to_string()
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        // Brands
        .route("/brands", get(list_brands).post(create_brand))
        .route(
            "/brands/:brand_id",
            get(get_brand).patch(update_brand).delete(delete_brand),
        )
        // Categories
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:category_id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        // Products
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:product_id",
            get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
        .route(
            "/products/:product_id/variants",
            get(list_product_variants).post(create_variant),
        )
        .route(
            "/products/:product_id/images",
            get(list_product_images).post(create_image),
        )
        .route(
            "/products/:product_id/nutrition-facts",
            get(list_nutrition_facts),
        )
        // Variants and their supplement facts
        .route(
            "/variants/:variant_id",
            patch(update_variant).delete(delete_variant),
        )
        .route(
            "/variants/:variant_id/supplement-facts",
            get(list_supplement_facts).post(create_supplement_fact),
        )
        .route(
            "/supplement-facts/:fact_id",
            patch(update_supplement_fact).delete(delete_supplement_fact),
        )
        // Images
        .route(
            "/images/:image_id",
            patch(update_image).delete(delete_image),
        )
        // Orders
        .route("/orders", get(list_orders))
        .route("/orders/:order_id", get(get_order))
        .route("/orders/:order_id/verify-payment", post(verify_payment))
        .route("/orders/:order_id/status", patch(update_order_status))
        .route(
            "/orders/:order_id/payment-status",
            patch(update_payment_status),
        )
        .route("/orders/:order_id/cancel", post(cancel_order))
        // Config store
        .route("/configs/:key", get(get_config).put(upsert_config))
}

// =========================================================================
// Brand endpoints
// =========================================================================

async fn list_brands(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Brand>>, AppError> {
    let repo = BrandRepository::new(state.pool);
    let brands = repo
        .list(query.name.as_deref(), query.cursor, query.limit_or(state.page_size))
        .await?;
    Ok(Json(brands))
}

async fn get_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<i32>,
) -> Result<Json<Brand>, AppError> {
    let repo = BrandRepository::new(state.pool);
    Ok(Json(repo.get(brand_id).await?))
}

async fn create_brand(
    State(state): State<AppState>,
    Json(request): Json<NewBrand>,
) -> Result<(StatusCode, Json<Brand>), AppError> {
    let repo = BrandRepository::new(state.pool);
    let brand = repo.create(request).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

async fn update_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<i32>,
    Json(request): Json<UpdateBrand>,
) -> Result<Json<Brand>, AppError> {
    let repo = BrandRepository::new(state.pool);
    Ok(Json(repo.update(brand_id, request).await?))
}

async fn delete_brand(
    State(state): State<AppState>,
    Path(brand_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = BrandRepository::new(state.pool);
    repo.delete(brand_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Category endpoints
// =========================================================================

async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Category>>, AppError> {
    let repo = CategoryRepository::new(state.pool);
    let categories = repo
        .list(query.name.as_deref(), query.cursor, query.limit_or(state.page_size))
        .await?;
    Ok(Json(categories))
}

async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<Json<Category>, AppError> {
    let repo = CategoryRepository::new(state.pool);
    Ok(Json(repo.get(category_id).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let repo = CategoryRepository::new(state.pool);
    let category = repo.create(request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
    Json(request): Json<UpdateCategory>,
) -> Result<Json<Category>, AppError> {
    let repo = CategoryRepository::new(state.pool);
    Ok(Json(repo.update(category_id, request).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = CategoryRepository::new(state.pool);
    repo.delete(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Product endpoints
// =========================================================================

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductSummary>>, AppError> {
    let products = ProductQuery::new(state.pool);
    let rows = products
        .list(query.name.as_deref(), query.cursor, query.limit_or(state.page_size))
        .await?;
    Ok(Json(rows))
}

async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<ProductDetail>, AppError> {
    let products = ProductQuery::new(state.pool);
    Ok(Json(products.get(product_id).await?))
}

/// Create a product together with its categories, nutrition facts, images
/// and variants in one transaction.
async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<NewProductAggregate>,
) -> Result<(StatusCode, Json<CreateProductResult>), AppError> {
    let writer = ProductAggregateWriter::new(state.pool);
    let result = writer.create(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Partial update of the product scalars; returns the refreshed detail view.
async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Json(request): Json<UpdateProduct>,
) -> Result<Json<ProductDetail>, AppError> {
    let writer = ProductAggregateWriter::new(state.pool.clone());
    writer.update_product(product_id, request).await?;
    let products = ProductQuery::new(state.pool);
    Ok(Json(products.get(product_id).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let writer = ProductAggregateWriter::new(state.pool);
    writer.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_product_variants(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<ProductVariantRow>>, AppError> {
    let products = ProductQuery::new(state.pool);
    Ok(Json(products.list_variants(product_id).await?))
}

async fn list_product_images(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<ProductImageRow>>, AppError> {
    let products = ProductQuery::new(state.pool);
    Ok(Json(products.list_images(product_id).await?))
}

async fn list_nutrition_facts(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Vec<NutritionFactRow>>, AppError> {
    let products = ProductQuery::new(state.pool);
    Ok(Json(products.list_nutrition_facts(product_id).await?))
}

// =========================================================================
// Variant and supplement-fact endpoints
// =========================================================================

async fn create_variant(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Json(request): Json<NewProductVariant>,
) -> Result<(StatusCode, Json<Variant>), AppError> {
    let repo = VariantRepository::new(state.pool);
    let variant = repo.create(product_id, request).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

async fn update_variant(
    State(state): State<AppState>,
    Path(variant_id): Path<i32>,
    Json(request): Json<UpdateVariant>,
) -> Result<Json<Variant>, AppError> {
    let repo = VariantRepository::new(state.pool);
    Ok(Json(repo.update(variant_id, request).await?))
}

async fn delete_variant(
    State(state): State<AppState>,
    Path(variant_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = VariantRepository::new(state.pool);
    repo.delete(variant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_supplement_facts(
    State(state): State<AppState>,
    Path(variant_id): Path<i32>,
) -> Result<Json<Vec<SupplementFact>>, AppError> {
    let repo = VariantRepository::new(state.pool);
    Ok(Json(repo.list_supplement_facts(variant_id).await?))
}

async fn create_supplement_fact(
    State(state): State<AppState>,
    Path(variant_id): Path<i32>,
    Json(request): Json<NewSupplementFact>,
) -> Result<(StatusCode, Json<SupplementFact>), AppError> {
    let repo = VariantRepository::new(state.pool);
    let fact = repo.create_supplement_fact(variant_id, request).await?;
    Ok((StatusCode::CREATED, Json(fact)))
}

async fn update_supplement_fact(
    State(state): State<AppState>,
    Path(fact_id): Path<i32>,
    Json(request): Json<UpdateSupplementFact>,
) -> Result<Json<SupplementFact>, AppError> {
    let repo = VariantRepository::new(state.pool);
    Ok(Json(repo.update_supplement_fact(fact_id, request).await?))
}

async fn delete_supplement_fact(
    State(state): State<AppState>,
    Path(fact_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = VariantRepository::new(state.pool);
    repo.delete_supplement_fact(fact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Image endpoints
// =========================================================================

async fn create_image(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
    Json(request): Json<NewProductImage>,
) -> Result<(StatusCode, Json<Image>), AppError> {
    let repo = ImageRepository::new(state.pool);
    let image = repo.create(product_id, request).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

async fn update_image(
    State(state): State<AppState>,
    Path(image_id): Path<i32>,
    Json(request): Json<UpdateImage>,
) -> Result<Json<Image>, AppError> {
    let repo = ImageRepository::new(state.pool);
    Ok(Json(repo.update(image_id, request).await?))
}

async fn delete_image(
    State(state): State<AppState>,
    Path(image_id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let repo = ImageRepository::new(state.pool);
    repo.delete(image_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// Order endpoints
// =========================================================================

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<CursorQuery>,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    let handler = OrderLifecycleHandler::new(state.pool);
    let limit = query.limit.unwrap_or(state.page_size).clamp(1, state.page_size);
    Ok(Json(handler.list_orders(query.cursor, limit).await?))
}

async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderDetail>, AppError> {
    let handler = OrderLifecycleHandler::new(state.pool);
    Ok(Json(handler.get_order(order_id).await?))
}

/// Settlement action: payment -> successful, order -> processing, atomically.
async fn verify_payment(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<VerifyPaymentResult>, AppError> {
    let handler = OrderLifecycleHandler::new(state.pool);
    Ok(Json(handler.verify_payment(order_id).await?))
}

async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderStatusResult>, AppError> {
    let new_status: OrderStatus = request.status.parse::<OrderStatus>()?;

    let handler = OrderLifecycleHandler::new(state.pool);
    let result = handler
        .update_order_status(UpdateOrderStatusCommand::new(order_id, new_status))
        .await?;
    Ok(Json(result))
}

async fn update_payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<PaymentStatusResult>, AppError> {
    let new_status: PaymentStatus = request.status.parse::<PaymentStatus>()?;

    let handler = OrderLifecycleHandler::new(state.pool);
    let result = handler
        .update_payment_status(UpdatePaymentStatusCommand::new(order_id, new_status))
        .await?;
    Ok(Json(result))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<OrderStatusResult>, AppError> {
    let handler = OrderLifecycleHandler::new(state.pool);
    Ok(Json(handler.cancel_order(order_id).await?))
}

// =========================================================================
// Config endpoints
// =========================================================================

async fn get_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigEntry>, AppError> {
    let store = ConfigStore::new(state.pool);
    let entry = store
        .get(&key)
        .await?
        .ok_or_else(|| DomainError::not_found("config", &key))?;
    Ok(Json(entry))
}

async fn upsert_config(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<UpsertConfigRequest>,
) -> Result<Json<ConfigEntry>, AppError> {
    let store = ConfigStore::new(state.pool);
    let entry = store
        .upsert(&key, request.value, &request.updated_by)
        .await?;
    Ok(Json(entry))
}
