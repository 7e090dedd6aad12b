//! Concurrent order placement against a shared stock pool.
//!
//! The conditional decrement inside the placement transaction is the only
//! oversell guard; these tests drive it from many tasks at once and check
//! the stock arithmetic afterwards.

use rust_decimal::Decimal;

use kisan_suraksha_core::{PaymentMethod, ShippingMode};
use kisan_suraksha_server::db::orders::{OrderLine, OrderRepository, PlaceOrderError};

use kisan_suraksha_integration_tests::{
    product_stock, run_tag, seed_product, seed_user, test_address, test_pool,
};

#[tokio::test]
#[ignore = "requires a PostgreSQL database (KS_DATABASE_URL)"]
async fn concurrent_one_unit_orders_sell_exactly_the_stock() {
    let pool = test_pool().await;
    let tag = run_tag();

    let stock = 5_i32;
    let attempts = 12_usize;

    let user_id = seed_user(&pool, &tag).await;
    let product_id = seed_product(&pool, &tag, Decimal::new(350, 0), stock).await;

    let mut handles = Vec::with_capacity(attempts);
    for _ in 0..attempts {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            OrderRepository::new(&pool)
                .place(
                    user_id,
                    &[OrderLine { product_id, qty: 1 }],
                    &test_address(),
                    None,
                    ShippingMode::Standard,
                    PaymentMethod::Cod,
                )
                .await
        }));
    }

    let mut placed = 0_usize;
    let mut out_of_stock = 0_usize;
    for handle in handles {
        match handle.await.expect("placement task panicked") {
            Ok(_) => placed += 1,
            Err(PlaceOrderError::InsufficientStock { .. }) => out_of_stock += 1,
            Err(other) => panic!("unexpected placement failure: {other}"),
        }
    }

    assert_eq!(placed, stock as usize);
    assert_eq!(out_of_stock, attempts - stock as usize);
    assert_eq!(product_stock(&pool, product_id).await, 0);

    let order_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM customer_order WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .expect("Failed to count orders");
    assert_eq!(order_count, i64::try_from(stock).expect("small count"));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database (KS_DATABASE_URL)"]
async fn failed_line_rolls_back_earlier_decrements() {
    let pool = test_pool().await;
    let tag = run_tag();

    let user_id = seed_user(&pool, &tag).await;
    let plenty = seed_product(&pool, &tag, Decimal::new(120, 0), 10).await;
    let scarce = seed_product(&pool, &tag, Decimal::new(80, 0), 1).await;

    let result = OrderRepository::new(&pool)
        .place(
            user_id,
            &[
                OrderLine {
                    product_id: plenty,
                    qty: 3,
                },
                OrderLine {
                    product_id: scarce,
                    qty: 2,
                },
            ],
            &test_address(),
            None,
            ShippingMode::Standard,
            PaymentMethod::Cod,
        )
        .await;

    assert!(matches!(
        result,
        Err(PlaceOrderError::InsufficientStock { product_id, .. }) if product_id == scarce
    ));

    // The first line's decrement must not survive the rollback.
    assert_eq!(product_stock(&pool, plenty).await, 10);
    assert_eq!(product_stock(&pool, scarce).await, 1);
}
