//! Command and result types for order lifecycle operations
//!
//! Commands represent intentions to change an order's state. Statuses are
//! already parsed into their sum types here; string parsing happens at the
//! API boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{OrderStatus, PaymentStatus};

/// Command to move an order to a new status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusCommand {
    pub order_id: i32,
    pub new_status: OrderStatus,
}

impl UpdateOrderStatusCommand {
    pub fn new(order_id: i32, new_status: OrderStatus) -> Self {
        Self {
            order_id,
            new_status,
        }
    }
}

/// Command to move an order's payment to a new status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePaymentStatusCommand {
    pub order_id: i32,
    pub new_status: PaymentStatus,
}

impl UpdatePaymentStatusCommand {
    pub fn new(order_id: i32, new_status: PaymentStatus) -> Self {
        Self {
            order_id,
            new_status,
        }
    }
}

/// Result of a successful payment verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResult {
    pub order_id: i32,
    pub payment_id: i32,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// Result of a successful order status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusResult {
    pub order_id: i32,
    pub status: OrderStatus,
}

/// Result of a successful payment status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusResult {
    pub order_id: i32,
    pub payment_id: i32,
    pub status: PaymentStatus,
}

/// One row in the admin order list
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: i32,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Line item on an order; `price_at_purchase` is a frozen snapshot taken at
/// order time and is never re-read from the product.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemRow {
    pub item_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    pub currency: String,
}

/// Current payment attached to an order
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRow {
    pub payment_id: i32,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub amount: Decimal,
    pub currency: String,
}

/// Full order view for the admin detail screen
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub order_id: i32,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub currency: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemRow>,
    pub payment: Option<PaymentRow>,
}
