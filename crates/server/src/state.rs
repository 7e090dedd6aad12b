//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::{InferenceClient, PaymentsClient, TokenService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenService,
    payments: Option<PaymentsClient>,
    inference: Option<InferenceClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Payments and inference are optional; when their configuration is
    /// absent the respective routes answer with 501.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let http = reqwest::Client::new();
        let tokens = TokenService::new(&config.jwt_secret);
        let payments = config
            .payments
            .clone()
            .map(|gateway| PaymentsClient::new(http.clone(), gateway));
        let inference = config
            .ml_service_url
            .clone()
            .map(|url| InferenceClient::new(http, url));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                payments,
                inference,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the bearer token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get the payment gateway client, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentsClient> {
        self.inner.payments.as_ref()
    }

    /// Get the inference client, if configured.
    #[must_use]
    pub fn inference(&self) -> Option<&InferenceClient> {
        self.inner.inference.as_ref()
    }
}
