//! Order Lifecycle Handler
//!
//! Validates and applies status transitions for orders and their payments.
//! Every write path opens a transaction and locks the order row, so readers
//! never observe a half-applied settlement and concurrent writers serialize
//! on the row lock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::{DomainError, OrderStatus, PaymentStatus};
use crate::error::AppError;

use super::{
    OrderDetail, OrderItemRow, OrderStatusResult, OrderSummary, PaymentRow, PaymentStatusResult,
    UpdateOrderStatusCommand, UpdatePaymentStatusCommand, VerifyPaymentResult,
};

/// Handler for order lifecycle operations
#[derive(Debug, Clone)]
pub struct OrderLifecycleHandler {
    pool: PgPool,
}

impl OrderLifecycleHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // verify_payment (settlement action)
    // =========================================================================

    /// Confirm an order's pending payment.
    ///
    /// Atomically sets the payment to `successful` AND the order to
    /// `processing`. If either write fails, neither is applied.
    pub async fn verify_payment(&self, order_id: i32) -> Result<VerifyPaymentResult, AppError> {
        let mut tx = self.pool.begin().await?;

        let order_status: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

        let order_status =
            order_status.ok_or_else(|| DomainError::not_found("order", order_id))?;

        if order_status != OrderStatus::Pending {
            return Err(DomainError::conflict(format!(
                "order {} is {}, settlement requires pending",
                order_id, order_status
            ))
            .into());
        }

        // Latest payment row for the order is the current one.
        let payment: Option<(i32, PaymentStatus)> = sqlx::query_as(
            "SELECT id, status FROM payments WHERE order_id = $1 ORDER BY id DESC LIMIT 1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (payment_id, payment_status) =
            payment.ok_or_else(|| DomainError::not_found("payment for order", order_id))?;

        match payment_status {
            PaymentStatus::Pending => {}
            PaymentStatus::Successful => {
                return Err(DomainError::conflict(format!(
                    "payment {} is already successful",
                    payment_id
                ))
                .into());
            }
            other => {
                return Err(DomainError::conflict(format!(
                    "payment {} is {}, settlement requires pending",
                    payment_id, other
                ))
                .into());
            }
        }

        sqlx::query("UPDATE payments SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(PaymentStatus::Successful)
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(OrderStatus::Processing)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, payment_id, "Payment verified, order moved to processing");

        Ok(VerifyPaymentResult {
            order_id,
            payment_id,
            order_status: OrderStatus::Processing,
            payment_status: PaymentStatus::Successful,
        })
    }

    // =========================================================================
    // update_order_status
    // =========================================================================

    /// Apply a validated status transition to an order.
    pub async fn update_order_status(
        &self,
        command: UpdateOrderStatusCommand,
    ) -> Result<OrderStatusResult, AppError> {
        let UpdateOrderStatusCommand {
            order_id,
            new_status,
        } = command;

        let mut tx = self.pool.begin().await?;

        let current: Option<OrderStatus> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

        let current = current.ok_or_else(|| DomainError::not_found("order", order_id))?;

        if !current.can_transition_to(new_status) {
            return Err(DomainError::invalid_order_transition(current, new_status).into());
        }

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_status)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            from = %current,
            to = %new_status,
            "Order status updated"
        );

        Ok(OrderStatusResult {
            order_id,
            status: new_status,
        })
    }

    // =========================================================================
    // update_payment_status
    // =========================================================================

    /// Apply a validated status transition to an order's payment, independent
    /// of the order status (supports manual correction flows).
    pub async fn update_payment_status(
        &self,
        command: UpdatePaymentStatusCommand,
    ) -> Result<PaymentStatusResult, AppError> {
        let UpdatePaymentStatusCommand {
            order_id,
            new_status,
        } = command;

        let mut tx = self.pool.begin().await?;

        // Lock the order row first so payment updates serialize with
        // settlement on the same order.
        let order_exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id)
                .fetch_optional(&mut *tx)
                .await?;

        order_exists.ok_or_else(|| DomainError::not_found("order", order_id))?;

        let payment: Option<(i32, PaymentStatus)> = sqlx::query_as(
            "SELECT id, status FROM payments WHERE order_id = $1 ORDER BY id DESC LIMIT 1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (payment_id, current) =
            payment.ok_or_else(|| DomainError::not_found("payment for order", order_id))?;

        if !current.can_transition_to(new_status) {
            return Err(DomainError::invalid_payment_transition(current, new_status).into());
        }

        sqlx::query("UPDATE payments SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_status)
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id,
            payment_id,
            from = %current,
            to = %new_status,
            "Payment status updated"
        );

        Ok(PaymentStatusResult {
            order_id,
            payment_id,
            status: new_status,
        })
    }

    // =========================================================================
    // cancel_order
    // =========================================================================

    /// Cancel an order. The transition table rejects cancellation once the
    /// order has left `pending`/`processing`.
    pub async fn cancel_order(&self, order_id: i32) -> Result<OrderStatusResult, AppError> {
        self.update_order_status(UpdateOrderStatusCommand::new(
            order_id,
            OrderStatus::Cancelled,
        ))
        .await
    }

    // =========================================================================
    // Read paths
    // =========================================================================

    /// List orders for the admin table, newest-id cursor pagination.
    pub async fn list_orders(
        &self,
        cursor: Option<i32>,
        limit: i64,
    ) -> Result<Vec<OrderSummary>, AppError> {
        let rows: Vec<(i32, String, OrderStatus, Decimal, String, DateTime<Utc>)> =
            sqlx::query_as(
                r#"
                SELECT id, user_id, status, total_amount, currency, created_at
                FROM orders
                WHERE id > $1
                ORDER BY id
                LIMIT $2
                "#,
            )
            .bind(cursor.unwrap_or(0))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(order_id, user_id, status, total_amount, currency, created_at)| OrderSummary {
                    order_id,
                    user_id,
                    status,
                    total_amount,
                    currency,
                    created_at,
                },
            )
            .collect())
    }

    /// Fetch one order with its items and current payment.
    pub async fn get_order(&self, order_id: i32) -> Result<OrderDetail, AppError> {
        let order: Option<(
            String,
            OrderStatus,
            Decimal,
            String,
            Option<String>,
            DateTime<Utc>,
        )> = sqlx::query_as(
            r#"
            SELECT user_id, status, total_amount, currency, notes, created_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        let (user_id, status, total_amount, currency, notes, created_at) =
            order.ok_or_else(|| DomainError::not_found("order", order_id))?;

        let items: Vec<(i32, i32, i32, Decimal, String)> = sqlx::query_as(
            r#"
            SELECT id, product_id, quantity, price_at_purchase, currency
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let payment: Option<(i32, PaymentStatus, Option<String>, Decimal, String)> =
            sqlx::query_as(
                r#"
                SELECT id, status, method, amount, currency
                FROM payments
                WHERE order_id = $1
                ORDER BY id DESC
                LIMIT 1
                "#,
            )
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(OrderDetail {
            order_id,
            user_id,
            status,
            total_amount,
            currency,
            notes,
            created_at,
            items: items
                .into_iter()
                .map(
                    |(item_id, product_id, quantity, price_at_purchase, currency)| OrderItemRow {
                        item_id,
                        product_id,
                        quantity,
                        price_at_purchase,
                        currency,
                    },
                )
                .collect(),
            payment: payment.map(|(payment_id, status, method, amount, currency)| PaymentRow {
                payment_id,
                status,
                method,
                amount,
                currency,
            }),
        })
    }
}
