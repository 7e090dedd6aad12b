//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `KS_JWT_SECRET` - Token signing secret (min 32 chars, not a placeholder)
//!
//! ## Optional
//! - `KS_HOST` - Bind address (default: 127.0.0.1)
//! - `KS_PORT` - Listen port (default: 5000)
//! - `KS_CLIENT_URL` - Allowed CORS origin for the SPA client
//! - `KS_UPLOAD_DIR` - Directory for uploaded product images (default: uploads)
//! - `KS_ML_SERVICE_URL` - Base URL of the leaf-disease inference service
//! - `KS_PAYMENT_KEY_ID` / `KS_PAYMENT_KEY_SECRET` - Payment gateway credentials
//! - `KS_PAYMENT_GATEWAY_URL` - Gateway API base URL (default: <https://api.razorpay.com>)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "insert",
    "enter-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Allowed CORS origin for the SPA client
    pub client_url: Option<String>,
    /// Directory where uploaded product images are stored
    pub upload_dir: PathBuf,
    /// Base URL of the ML inference service, if configured
    pub ml_service_url: Option<String>,
    /// Payment gateway credentials, if configured
    pub payments: Option<PaymentGatewayConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Payment gateway configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentGatewayConfig {
    /// Public key id sent to the client.
    pub key_id: String,
    /// Shared secret used for API auth and signature verification.
    pub key_secret: SecretString,
    /// Gateway API base URL.
    pub base_url: String,
}

impl std::fmt::Debug for PaymentGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGatewayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (length, placeholder detection).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("KS_DATABASE_URL")?;
        let host = get_env_or_default("KS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("KS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("KS_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("KS_PORT".to_string(), e.to_string()))?;
        let jwt_secret = get_validated_secret("KS_JWT_SECRET")?;

        let client_url = get_optional_env("KS_CLIENT_URL");
        let upload_dir = PathBuf::from(get_env_or_default("KS_UPLOAD_DIR", "uploads"));
        let ml_service_url =
            get_optional_env("KS_ML_SERVICE_URL").map(|u| u.trim_end_matches('/').to_owned());
        let payments = PaymentGatewayConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            client_url,
            upload_dir,
            ml_service_url,
            payments,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PaymentGatewayConfig {
    /// Load gateway credentials, or `None` when the gateway is not configured.
    ///
    /// Both key id and key secret must be present together; a lone variable
    /// is treated as a configuration mistake rather than "not configured".
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let key_id = get_optional_env("KS_PAYMENT_KEY_ID");
        let key_secret = get_optional_env("KS_PAYMENT_KEY_SECRET");

        match (key_id, key_secret) {
            (Some(key_id), Some(key_secret)) => Ok(Some(Self {
                key_id,
                key_secret: SecretString::from(key_secret),
                base_url: get_env_or_default("KS_PAYMENT_GATEWAY_URL", "https://api.razorpay.com")
                    .trim_end_matches('/')
                    .to_owned(),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "KS_PAYMENT_KEY_SECRET".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("KS_PAYMENT_KEY_ID".to_string())),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a secret is long enough and not an obvious placeholder.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_SECRET_LENGTH} characters (got {})",
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_too_short_rejected() {
        let err = validate_secret_strength("short", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(..)));
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err =
            validate_secret_strength("your-jwt-signing-key-goes-here-okay", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(..)));

        let err = validate_secret_strength(
            "CHANGEME-CHANGEME-CHANGEME-CHANGEME-CHANGEME",
            "TEST_VAR",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(..)));
    }

    #[test]
    fn test_strong_secret_accepted() {
        assert!(validate_secret_strength("kQ7vR2mX9bL4wN8cJ1fT6hY3sD5gA0pZ", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingEnvVar("KS_JWT_SECRET".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: KS_JWT_SECRET"
        );
    }
}
