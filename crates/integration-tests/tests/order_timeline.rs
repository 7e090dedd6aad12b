//! Order timeline growth across status transitions.
//!
//! The timeline is append-only: placement writes the first entry and every
//! accepted status update appends exactly one more, in order. Rejected
//! transitions must leave it untouched.

use rust_decimal::Decimal;

use kisan_suraksha_core::{OrderStatus, PaymentMethod, ShippingMode};
use kisan_suraksha_server::db::OrderRepository;
use kisan_suraksha_server::db::orders::{OrderLine, StatusUpdateError};

use kisan_suraksha_integration_tests::{
    run_tag, seed_product, seed_user, test_address, test_pool,
};

#[tokio::test]
#[ignore = "requires a PostgreSQL database (KS_DATABASE_URL)"]
async fn each_status_update_appends_one_timeline_entry() {
    let pool = test_pool().await;
    let tag = run_tag();

    let user_id = seed_user(&pool, &tag).await;
    let product_id = seed_product(&pool, &tag, Decimal::new(550, 0), 3).await;

    let repo = OrderRepository::new(&pool);
    let order = repo
        .place(
            user_id,
            &[OrderLine { product_id, qty: 1 }],
            &test_address(),
            None,
            ShippingMode::Standard,
            PaymentMethod::Cod,
        )
        .await
        .expect("Failed to place order");

    assert_eq!(order.status, OrderStatus::Placed);
    assert_eq!(order.timeline.len(), 1);
    assert_eq!(order.timeline[0].label, "Order placed");

    let code = order.order_id.clone();
    let walk = [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    let mut updated = order;
    for (step, status) in walk.into_iter().enumerate() {
        let note = (status == OrderStatus::Shipped).then_some("Handed to courier");
        updated = repo
            .update_status(&code, status, note)
            .await
            .expect("Transition rejected");

        assert_eq!(updated.status, status);
        assert_eq!(updated.timeline.len(), step + 2);
    }

    let labels: Vec<&str> = updated.timeline.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "Order placed",
            "Status updated to Processing",
            "Handed to courier",
            "Status updated to Out for delivery",
            "Status updated to Delivered",
        ]
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (KS_DATABASE_URL)"]
async fn rejected_transition_leaves_timeline_untouched() {
    let pool = test_pool().await;
    let tag = run_tag();

    let user_id = seed_user(&pool, &tag).await;
    let product_id = seed_product(&pool, &tag, Decimal::new(99, 0), 2).await;

    let repo = OrderRepository::new(&pool);
    let order = repo
        .place(
            user_id,
            &[OrderLine { product_id, qty: 1 }],
            &test_address(),
            None,
            ShippingMode::Standard,
            PaymentMethod::Cod,
        )
        .await
        .expect("Failed to place order");
    let code = order.order_id;

    // PLACED cannot skip straight to SHIPPED.
    let rejected = repo
        .update_status(&code, OrderStatus::Shipped, None)
        .await;
    assert!(matches!(
        rejected,
        Err(StatusUpdateError::IllegalTransition {
            from: OrderStatus::Placed,
            to: OrderStatus::Shipped,
        })
    ));

    let cancelled = repo
        .update_status(&code, OrderStatus::Cancelled, None)
        .await
        .expect("Cancellation rejected");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.timeline.len(), 2);

    // Cancelled is absorbing.
    let after_cancel = repo
        .update_status(&code, OrderStatus::Processing, None)
        .await;
    assert!(matches!(
        after_cancel,
        Err(StatusUpdateError::IllegalTransition { .. })
    ));
}
