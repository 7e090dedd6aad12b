//! Database operations for the KisanSuraksha `PostgreSQL` database.
//!
//! # Tables
//!
//! - `product` - Catalog, mutated by admin operations and the order
//!   placement transaction's conditional stock decrement
//! - `app_user` - Accounts, with embedded `address` rows and a 1:1
//!   `shipping_profile`
//! - `customer_order` / `order_item` / `order_event` - Orders with item and
//!   address snapshots and an append-only timeline
//! - `contact_message` - Contact form submissions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p kisan-suraksha-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod contact;
pub mod orders;
pub mod products;
pub mod users;

pub use contact::ContactRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors surfaced by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness or precondition conflict (duplicate email, stock
    /// precondition mismatch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A row exists but holds data the application cannot interpret.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
