//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the response body is always `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::orders::{PlaceOrderError, StatusUpdateError};
use crate::services::auth::AuthError;
use crate::services::inference::InferenceError;
use crate::services::payments::PaymentError;
use crate::services::tokens::TokenError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Bearer token missing or rejected.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Order placement failed.
    #[error("Order error: {0}")]
    PlaceOrder(#[from] PlaceOrderError),

    /// Order status transition rejected.
    #[error("Status error: {0}")]
    StatusUpdate(#[from] StatusUpdateError),

    /// Payment gateway operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Inference proxy failed.
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// A feature whose backing service is not configured.
    #[error("Not configured: {0}")]
    NotConfigured(&'static str),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Token(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PlaceOrder(err) => match err {
                PlaceOrderError::ProductUnavailable(_) => StatusCode::NOT_FOUND,
                PlaceOrderError::InsufficientStock { .. } => StatusCode::CONFLICT,
                PlaceOrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::StatusUpdate(err) => match err {
                StatusUpdateError::NotFound => StatusCode::NOT_FOUND,
                StatusUpdateError::IllegalTransition { .. } => StatusCode::CONFLICT,
                StatusUpdateError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Payment(err) => match err {
                PaymentError::InvalidAmount
                | PaymentError::MalformedSignature
                | PaymentError::SignatureMismatch => StatusCode::BAD_REQUEST,
                PaymentError::Gateway(_) | PaymentError::GatewayStatus(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Inference(err) => match err {
                InferenceError::Upstream(_) => StatusCode::BAD_GATEWAY,
                InferenceError::UpstreamStatus { status, .. } => *status,
            },
            Self::NotConfigured(_) => StatusCode::NOT_IMPLEMENTED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details never leave the server.
    fn message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_owned()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::MissingField(field) => format!("Missing {field}"),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::Token(_) => "Invalid or expired token".to_owned(),
            Self::PlaceOrder(err) => match err {
                PlaceOrderError::ProductUnavailable(_) => "Product unavailable".to_owned(),
                PlaceOrderError::InsufficientStock { name, .. } => {
                    format!("Insufficient stock for {name}")
                }
                PlaceOrderError::Repository(_) => "Internal server error".to_owned(),
            },
            Self::StatusUpdate(err) => match err {
                StatusUpdateError::NotFound => "Order not found".to_owned(),
                StatusUpdateError::IllegalTransition { from, to } => {
                    format!("Cannot move order from {from} to {to}")
                }
                StatusUpdateError::Repository(_) => "Internal server error".to_owned(),
            },
            Self::Payment(err) => match err {
                PaymentError::InvalidAmount => "Invalid payment amount".to_owned(),
                PaymentError::MalformedSignature | PaymentError::SignatureMismatch => {
                    "Payment verification failed".to_owned()
                }
                PaymentError::Gateway(_) | PaymentError::GatewayStatus(_) => {
                    "Payment gateway error".to_owned()
                }
            },
            Self::Inference(err) => match err {
                InferenceError::Upstream(_) => "Prediction service error".to_owned(),
                InferenceError::UpstreamStatus { body, .. } => upstream_message(body),
            },
            Self::NotConfigured(what) => format!("{what} is not configured"),
            Self::Forbidden => "Admin access required".to_owned(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

/// Extract a client-facing message from an upstream error body.
///
/// The inference service answers failures with `{"error": "..."}`; fall
/// back to the raw body, or a generic message when the body is empty.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(ToOwned::to_owned))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Prediction service error".to_owned()
            } else {
                trimmed.to_owned()
            }
        })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-side failures to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(serde_json::json!({ "error": self.message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use kisan_suraksha_core::{OrderStatus, ProductId};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::BadRequest("x".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::NotConfigured("Prediction")),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_errors_map_to_conflict() {
        assert_eq!(
            get_status(AppError::PlaceOrder(PlaceOrderError::InsufficientStock {
                product_id: ProductId::new(1),
                name: "Neem Oil".to_owned(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::StatusUpdate(
                StatusUpdateError::IllegalTransition {
                    from: OrderStatus::Delivered,
                    to: OrderStatus::Placed,
                }
            )),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Database(RepositoryError::Conflict(
            "constraint address_one_default_idx".to_owned(),
        ));
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_inference_upstream_status_and_body_relayed() {
        let err = AppError::Inference(InferenceError::UpstreamStatus {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: r#"{"error":"No leaf detected in the image"}"#.to_owned(),
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.message(), "No leaf detected in the image");
    }

    #[test]
    fn test_inference_plain_text_body_relayed() {
        let err = AppError::Inference(InferenceError::UpstreamStatus {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "model warming up\n".to_owned(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.message(), "model warming up");
    }

    #[test]
    fn test_inference_empty_body_gets_generic_message() {
        let err = AppError::Inference(InferenceError::UpstreamStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        });
        assert_eq!(err.message(), "Prediction service error");
    }

    #[test]
    fn test_insufficient_stock_names_the_product() {
        let err = AppError::PlaceOrder(PlaceOrderError::InsufficientStock {
            product_id: ProductId::new(3),
            name: "Neem Oil".to_owned(),
        });
        assert_eq!(err.message(), "Insufficient stock for Neem Oil");
    }
}
