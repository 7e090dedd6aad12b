//! Contact form submission.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use serde_json::{Value, json};

use kisan_suraksha_core::Email;

use crate::db::ContactRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Minimum length of the message body after trimming.
const MIN_MESSAGE_LENGTH: usize = 10;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// `POST /contact` - rate limited to one submission per 30 seconds per IP.
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Missing name".to_owned()));
    }
    let email = Email::parse(&body.email)
        .map_err(|_| AppError::BadRequest("Invalid email address".to_owned()))?;
    let message = body.message.trim();
    if message.len() < MIN_MESSAGE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Message must be at least {MIN_MESSAGE_LENGTH} characters"
        )));
    }

    let ip = client_ip(&headers);
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    ContactRepository::new(state.pool())
        .insert(name, email.as_str(), message, ip, user_agent)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

/// Best-effort client IP from proxy headers, for abuse follow-up.
fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn test_client_ip_empty_when_unproxied() {
        assert_eq!(client_ip(&HeaderMap::new()), "");
    }
}
