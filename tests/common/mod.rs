//! Common test utilities

use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Ids of the rows seeded by [`setup_test_db`].
pub struct Seed {
    pub brand_id: i32,
    pub category_id: i32,
    pub order_id: i32,
    pub payment_id: i32,
}

/// Setup test database - truncate tables and seed test data
pub async fn setup_test_db() -> (PgPool, Seed) {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    // Clean up DB for fresh state
    sqlx::query(
        "TRUNCATE TABLE payments, order_items, orders, nutrition_facts, product_images, \
         supplement_facts, product_variants, product_categories, products, categories, \
         brands, configs RESTART IDENTITY CASCADE",
    )
    .execute(&mut *tx)
    .await
    .expect("Failed to clean up DB");

    // Seed a brand and a category for product aggregate tests
    let (brand_id,): (i32,) = sqlx::query_as(
        "INSERT INTO brands (name) VALUES ('Test Nutrition Co') RETURNING brand_id",
    )
    .fetch_one(&mut *tx)
    .await
    .expect("Failed to seed brand");

    let (category_id,): (i32,) = sqlx::query_as(
        "INSERT INTO categories (name) VALUES ('Vitamins') RETURNING category_id",
    )
    .fetch_one(&mut *tx)
    .await
    .expect("Failed to seed category");

    // Seed a pending order with a pending payment for lifecycle tests
    let (order_id,): (i32,) = sqlx::query_as(
        "INSERT INTO orders (user_id, status, total_amount, currency) \
         VALUES ('user-1', 'pending', $1, 'USD') RETURNING id",
    )
    .bind(dec!(49.98))
    .fetch_one(&mut *tx)
    .await
    .expect("Failed to seed order");

    let (payment_id,): (i32,) = sqlx::query_as(
        "INSERT INTO payments (order_id, status, method, amount, currency) \
         VALUES ($1, 'pending', 'card', $2, 'USD') RETURNING id",
    )
    .bind(order_id)
    .bind(dec!(49.98))
    .fetch_one(&mut *tx)
    .await
    .expect("Failed to seed payment");

    tx.commit().await.expect("Failed to commit seed data");

    (
        pool,
        Seed {
            brand_id,
            category_id,
            order_id,
            payment_id,
        },
    )
}

/// Fetch the current status of an order as text.
pub async fn order_status(pool: &PgPool, order_id: i32) -> String {
    let (status,): (String,) =
        sqlx::query_as("SELECT status::text FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_one(pool)
            .await
            .expect("Failed to fetch order status");
    status
}

/// Fetch the current status of a payment as text.
pub async fn payment_status(pool: &PgPool, payment_id: i32) -> String {
    let (status,): (String,) =
        sqlx::query_as("SELECT status::text FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_one(pool)
            .await
            .expect("Failed to fetch payment status");
    status
}

/// Count rows in a table.
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows");
    count
}
