//! Integration tests for the order lifecycle handler.
//!
//! These tests need a PostgreSQL database with the migrations applied and
//! DATABASE_URL set; run them with `cargo test -- --ignored`.

mod common;

use common::setup_test_db;
use suppstore_admin::orders::{OrderLifecycleHandler, UpdateOrderStatusCommand, UpdatePaymentStatusCommand};
use suppstore_admin::{AppError, DomainError, OrderStatus, PaymentStatus};

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_verify_payment_settles_order_and_payment() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool.clone());

    let result = handler.verify_payment(seed.order_id).await.unwrap();

    assert_eq!(result.order_id, seed.order_id);
    assert_eq!(result.payment_id, seed.payment_id);
    assert_eq!(result.order_status, OrderStatus::Processing);
    assert_eq!(result.payment_status, PaymentStatus::Successful);

    // Both rows changed together
    assert_eq!(common::order_status(&pool, seed.order_id).await, "processing");
    assert_eq!(
        common::payment_status(&pool, seed.payment_id).await,
        "successful"
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_verify_payment_rolls_back_payment_when_order_write_fails() {
    let (pool, seed) = setup_test_db().await;

    // Install a trigger that rejects the order-side write of the settlement.
    // The payment write happens first, so a committed settlement with this
    // trigger in place would leave a successful payment on a pending order.
    sqlx::query("DROP TRIGGER IF EXISTS block_order_processing ON orders")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION block_order_processing() RETURNS trigger AS $$
        BEGIN
            IF NEW.status = 'processing' THEN
                RAISE EXCEPTION 'order writes disabled';
            END IF;
            RETURN NEW;
        END;
        $$ LANGUAGE plpgsql
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER block_order_processing BEFORE UPDATE ON orders \
         FOR EACH ROW EXECUTE FUNCTION block_order_processing()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let handler = OrderLifecycleHandler::new(pool.clone());
    let err = handler.verify_payment(seed.order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    sqlx::query("DROP TRIGGER block_order_processing ON orders")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("DROP FUNCTION block_order_processing")
        .execute(&pool)
        .await
        .unwrap();

    // The payment update ran first inside the transaction; the failed order
    // update must have rolled it back.
    assert_eq!(common::payment_status(&pool, seed.payment_id).await, "pending");
    assert_eq!(common::order_status(&pool, seed.order_id).await, "pending");

    // With the trigger gone the same settlement succeeds.
    let result = handler.verify_payment(seed.order_id).await.unwrap();
    assert_eq!(result.order_status, OrderStatus::Processing);
    assert_eq!(result.payment_status, PaymentStatus::Successful);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_verify_payment_twice_conflicts() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool);

    handler.verify_payment(seed.order_id).await.unwrap();

    let err = handler.verify_payment(seed.order_id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::Conflict(_))
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_verify_payment_unknown_order() {
    let (pool, _seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool);

    let err = handler.verify_payment(999_999).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_order_walks_happy_path() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool.clone());

    handler.verify_payment(seed.order_id).await.unwrap();

    for status in [
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let result = handler
            .update_order_status(UpdateOrderStatusCommand::new(seed.order_id, status))
            .await
            .unwrap();
        assert_eq!(result.status, status);
    }

    assert_eq!(common::order_status(&pool, seed.order_id).await, "delivered");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_illegal_transition_rejected_and_not_applied() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool.clone());

    // pending -> delivered skips two steps
    let err = handler
        .update_order_status(UpdateOrderStatusCommand::new(
            seed.order_id,
            OrderStatus::Delivered,
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidTransition { .. })
    ));
    assert_eq!(common::order_status(&pool, seed.order_id).await, "pending");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_delivered_order_cannot_go_back() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool.clone());

    handler.verify_payment(seed.order_id).await.unwrap();
    for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
        handler
            .update_order_status(UpdateOrderStatusCommand::new(seed.order_id, status))
            .await
            .unwrap();
    }

    let err = handler
        .update_order_status(UpdateOrderStatusCommand::new(
            seed.order_id,
            OrderStatus::Pending,
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidTransition { .. })
    ));
    assert_eq!(common::order_status(&pool, seed.order_id).await, "delivered");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_cancel_order_before_shipping() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool.clone());

    let result = handler.cancel_order(seed.order_id).await.unwrap();
    assert_eq!(result.status, OrderStatus::Cancelled);
    assert_eq!(common::order_status(&pool, seed.order_id).await, "cancelled");

    // Cancelled is terminal
    let err = handler.verify_payment(seed.order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Domain(DomainError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_cancel_after_shipping_rejected() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool);

    handler.verify_payment(seed.order_id).await.unwrap();
    handler
        .update_order_status(UpdateOrderStatusCommand::new(
            seed.order_id,
            OrderStatus::Shipped,
        ))
        .await
        .unwrap();

    let err = handler.cancel_order(seed.order_id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidTransition { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_payment_manual_correction() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool.clone());

    // pending -> failed -> successful (manual correction), then refunded
    for status in [
        PaymentStatus::Failed,
        PaymentStatus::Successful,
        PaymentStatus::Refunded,
    ] {
        let result = handler
            .update_payment_status(UpdatePaymentStatusCommand::new(seed.order_id, status))
            .await
            .unwrap();
        assert_eq!(result.status, status);
        assert_eq!(result.payment_id, seed.payment_id);
    }

    // refunded is terminal for payments
    let err = handler
        .update_payment_status(UpdatePaymentStatusCommand::new(
            seed.order_id,
            PaymentStatus::Pending,
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Domain(DomainError::InvalidTransition { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_list_and_get_order() {
    let (pool, seed) = setup_test_db().await;
    let handler = OrderLifecycleHandler::new(pool);

    let orders = handler.list_orders(None, 50).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_id, seed.order_id);
    assert_eq!(orders[0].status, OrderStatus::Pending);

    // Cursor past the only row yields an empty page
    let empty = handler.list_orders(Some(seed.order_id), 50).await.unwrap();
    assert!(empty.is_empty());

    let detail = handler.get_order(seed.order_id).await.unwrap();
    assert_eq!(detail.user_id, "user-1");
    let payment = detail.payment.expect("seeded payment present");
    assert_eq!(payment.payment_id, seed.payment_id);
    assert_eq!(payment.status, PaymentStatus::Pending);
}
