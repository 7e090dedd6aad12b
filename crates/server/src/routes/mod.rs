//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Catalog (public)
//! GET  /products               - Active products, newest first
//! GET  /products/{id}          - Single active product
//!
//! # Auth (rate limited)
//! POST /auth/register          - Create account
//! POST /auth/login             - Login, returns a bearer token
//! GET  /auth/me                - Current user (requires token)
//!
//! # Account (requires token)
//! GET  /account/addresses              - Saved addresses
//! POST /account/addresses              - Add address
//! PUT  /account/addresses/{id}         - Update address
//! DELETE /account/addresses/{id}       - Delete address
//! PATCH /account/addresses/{id}/default - Mark as default
//! GET  /account/shipping               - Last-used shipping details
//! PUT  /account/shipping               - Save shipping details
//!
//! # Orders (requires token)
//! POST /orders                 - Place an order (atomic stock claim)
//! GET  /orders                 - Own orders, optional ?status= filter
//! GET  /orders/{orderCode}     - Single order, owner-scoped
//!
//! # Payments (requires token)
//! POST /payments/intent        - Create a gateway payment intent
//! POST /payments/verify        - Verify a payment confirmation signature
//!
//! # Misc (public)
//! POST /contact                - Contact form (rate limited, 1 per 30s)
//! POST /predict                - Crop disease image proxy
//!
//! # Admin (requires admin token)
//! GET  /admin/products                    - All products incl. inactive
//! POST /admin/products                    - Create product
//! PUT  /admin/products/{id}               - Edit product fields
//! PUT  /admin/products/{id}/stock         - Guarded stock correction
//! DELETE /admin/products/{id}             - Deactivate (?hard=true deletes)
//! POST /admin/products/upload-image       - Upload a product image
//! GET  /admin/orders                      - All orders with customer info
//! PUT  /admin/orders/{orderCode}/status   - Move order through the state machine
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod contact;
pub mod health;
pub mod orders;
pub mod payments;
pub mod predict;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::middleware::rate_limit::{auth_rate_limiter, contact_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the public catalog routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{id}", get(products::show))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::list_addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            put(account::update_address).delete(account::delete_address),
        )
        .route(
            "/addresses/{id}/default",
            patch(account::set_default_address),
        )
        .route(
            "/shipping",
            get(account::get_shipping).put(account::put_shipping),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/{code}", get(orders::show))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/intent", post(payments::create_intent))
        .route("/verify", post(payments::verify))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(admin::products::list).post(admin::products::create),
        )
        .route(
            "/products/{id}",
            put(admin::products::update).delete(admin::products::remove),
        )
        .route("/products/{id}/stock", put(admin::products::correct_stock))
        .route("/products/upload-image", post(admin::products::upload_image))
        .route("/orders", get(admin::orders::list))
        .route("/orders/{code}/status", put(admin::orders::update_status))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/products", product_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/orders", order_routes())
        .nest("/payments", payment_routes())
        .route(
            "/contact",
            post(contact::submit).layer(contact_rate_limiter()),
        )
        .route("/predict", post(predict::predict))
        .nest("/admin", admin_routes())
}
