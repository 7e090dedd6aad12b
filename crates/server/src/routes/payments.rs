//! Payment intent creation and confirmation verification.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::payments::PaymentIntent;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIntentRequest {
    pub amount: Decimal,
    pub currency: Option<String>,
    /// Merchant-side reference; a timestamped one is minted when absent.
    pub receipt: Option<String>,
}

/// `POST /payments/intent`
pub async fn create_intent(
    State(state): State<AppState>,
    RequireUser(_claims): RequireUser,
    Json(body): Json<CreateIntentRequest>,
) -> Result<Json<PaymentIntent>> {
    let payments = state
        .payments()
        .ok_or(AppError::NotConfigured("Payment gateway"))?;
    let intent = payments
        .create_intent(body.amount, body.currency.as_deref(), body.receipt.as_deref())
        .await?;
    Ok(Json(intent))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub intent_id: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub signature: String,
}

/// `POST /payments/verify`
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(_claims): RequireUser,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<Value>> {
    let payments = state
        .payments()
        .ok_or(AppError::NotConfigured("Payment gateway"))?;
    payments.verify_confirmation(&body.intent_id, &body.payment_id, &body.signature)?;
    Ok(Json(json!({ "verified": true })))
}
