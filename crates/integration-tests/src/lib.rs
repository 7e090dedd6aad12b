//! Database-backed integration tests for KisanSuraksha.
//!
//! These tests exercise the repository layer against a real `PostgreSQL`
//! database, covering the behaviors that live in SQL rather than in Rust:
//! the conditional stock decrement under concurrency and the append-only
//! order timeline.
//!
//! # Running
//!
//! Point `KS_DATABASE_URL` (or `DATABASE_URL`) at a disposable database;
//! migrations run automatically on connect. The tests are `#[ignore]`d so
//! a plain `cargo test` stays database-free:
//!
//! ```bash
//! cargo test -p kisan-suraksha-integration-tests -- --ignored
//! ```
//!
//! Each test seeds its own rows tagged with a random suffix, so tests can
//! run concurrently and reruns do not collide.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use kisan_suraksha_core::{ProductId, UserId};
use kisan_suraksha_server::models::ShippingAddress;

/// Connect to the test database and bring the schema up to date.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("KS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("KS_DATABASE_URL or DATABASE_URL must point at a test database");

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Random lowercase tag so seeded rows never collide across runs.
pub fn run_tag() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| char::from(b.to_ascii_lowercase()))
        .collect()
}

/// Insert a customer account, returning its id.
pub async fn seed_user(pool: &PgPool, tag: &str) -> UserId {
    sqlx::query_scalar::<_, UserId>(
        "INSERT INTO app_user (name, email, password_hash) \
         VALUES ($1, $2, 'not-a-real-hash') RETURNING id",
    )
    .bind(format!("Test Farmer {tag}"))
    .bind(format!("farmer-{tag}@test.invalid"))
    .fetch_one(pool)
    .await
    .expect("Failed to seed user")
}

/// Insert an active product with the given stock, returning its id.
pub async fn seed_product(pool: &PgPool, tag: &str, price: Decimal, stock: i32) -> ProductId {
    sqlx::query_scalar::<_, ProductId>(
        "INSERT INTO product (name, price, stock) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(format!("Neem Oil {tag}"))
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Failed to seed product")
}

/// Read a product's current stock directly.
pub async fn product_stock(pool: &PgPool, id: ProductId) -> i32 {
    sqlx::query_scalar("SELECT stock FROM product WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read stock")
}

/// A complete shipping address for order placement.
#[must_use]
pub fn test_address() -> ShippingAddress {
    ShippingAddress {
        label: "Home".to_owned(),
        full_name: "Test Farmer".to_owned(),
        phone: "9876543210".to_owned(),
        line1: "12 Canal Road".to_owned(),
        line2: String::new(),
        city: "Nashik".to_owned(),
        state: "Maharashtra".to_owned(),
        pincode: "422001".to_owned(),
        country: "India".to_owned(),
    }
}
