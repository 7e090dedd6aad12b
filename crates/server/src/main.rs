//! KisanSuraksha API server.
//!
//! Serves the storefront and admin REST API on port 5000 (configurable).
//!
//! # Architecture
//!
//! - Axum handlers over a `PostgreSQL` catalog and order store
//! - Stateless bearer-token auth; the pure logic (pricing, order state
//!   machine, validation) lives in `kisan-suraksha-core`
//! - Outbound HTTP to the payment gateway and the ML inference service,
//!   both optional at runtime

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kisan_suraksha_server::config::ServerConfig;
use kisan_suraksha_server::state::AppState;
use kisan_suraksha_server::{db, routes};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Build the CORS layer. Locked to the configured client origin when one
/// is set; permissive otherwise (local development).
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ];
    let headers = [header::AUTHORIZATION, header::CONTENT_TYPE];

    let layer = match config.client_url.as_ref() {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        ),
        None => CorsLayer::new().allow_origin(tower_http::cors::Any),
    };
    layer.allow_methods(methods).allow_headers(headers)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kisan_suraksha_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Initialize database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p kisan-suraksha-cli -- migrate

    let cors = cors_layer(&config);
    let upload_dir = config.upload_dir.clone();
    let addr = config.socket_addr();

    // Build application state
    let state = AppState::new(config, pool);

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    tracing::info!("api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(client_url: Option<&str>) -> ServerConfig {
        ServerConfig {
            database_url: "postgres://localhost/test".into(),
            host: "127.0.0.1".parse().expect("valid IP"),
            port: 5000,
            jwt_secret: "kQ7vR2mX9bL4wN8cJ1fT6hY3sD5gA0pZ".into(),
            client_url: client_url.map(ToOwned::to_owned),
            upload_dir: "uploads".into(),
            ml_service_url: None,
            payments: None,
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_cors_layer_builds_for_both_origin_modes() {
        let _locked = cors_layer(&config(Some("https://shop.example.com")));
        let _open = cors_layer(&config(None));
    }

    #[test]
    fn test_cors_layer_tolerates_unparseable_origin() {
        let _layer = cors_layer(&config(Some("not a header\nvalue")));
    }
}
