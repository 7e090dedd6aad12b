//! Payment gateway client.
//!
//! Creates payment intents against the gateway's REST API and verifies the
//! signature the client hands back after paying. The signature is an
//! HMAC-SHA256 over `"<intent_id>|<payment_id>"` keyed with the gateway
//! secret, hex-encoded; `verify_slice` compares in constant time.

use hmac::{Hmac, Mac};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::PaymentGatewayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Default currency when the client does not name one.
const DEFAULT_CURRENCY: &str = "INR";

/// Errors from payment intent creation or confirmation.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The order amount does not convert to a positive minor-unit count.
    #[error("invalid payment amount")]
    InvalidAmount,

    /// The gateway could not be reached.
    #[error("payment gateway request failed: {0}")]
    Gateway(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("payment gateway returned {0}")]
    GatewayStatus(reqwest::StatusCode),

    /// The confirmation signature is not valid hex.
    #[error("malformed payment signature")]
    MalformedSignature,

    /// The confirmation signature does not match.
    #[error("payment signature mismatch")]
    SignatureMismatch,
}

/// An intent created at the gateway, returned to the client so it can
/// start the payment flow.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub intent_id: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    pub currency: String,
    /// Public key id the client-side SDK needs.
    pub key_id: String,
}

#[derive(Serialize)]
struct CreateIntentRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// Use the caller's receipt reference, or mint a timestamped one.
fn receipt_or_default(receipt: Option<&str>) -> String {
    receipt
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map_or_else(
            || format!("rcpt_{}", chrono::Utc::now().timestamp_millis()),
            ToOwned::to_owned,
        )
}

#[derive(Deserialize)]
struct CreateIntentResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Client for the payment gateway's server-side API.
pub struct PaymentsClient {
    http: reqwest::Client,
    config: PaymentGatewayConfig,
}

impl PaymentsClient {
    /// Create a new gateway client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: PaymentGatewayConfig) -> Self {
        Self { http, config }
    }

    /// Create a payment intent for the given amount.
    ///
    /// The amount is converted to minor units (rupees to paise); the
    /// gateway rejects zero, so anything that rounds below one paisa is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` for a non-positive amount,
    /// `PaymentError::Gateway` if the request fails, and
    /// `PaymentError::GatewayStatus` for a non-success response.
    pub async fn create_intent(
        &self,
        amount: Decimal,
        currency: Option<&str>,
        receipt: Option<&str>,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = (amount * Decimal::from(100))
            .round()
            .to_i64()
            .filter(|&n| n >= 1)
            .ok_or(PaymentError::InvalidAmount)?;
        let currency = currency.unwrap_or(DEFAULT_CURRENCY);
        let receipt = receipt_or_default(receipt);

        let response = self
            .http
            .post(format!("{}/v1/orders", self.config.base_url))
            .basic_auth(
                &self.config.key_id,
                Some(self.config.key_secret.expose_secret()),
            )
            .json(&CreateIntentRequest {
                amount: minor_units,
                currency,
                receipt: &receipt,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PaymentError::GatewayStatus(response.status()));
        }

        let intent: CreateIntentResponse = response.json().await?;
        Ok(PaymentIntent {
            intent_id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
            key_id: self.config.key_id.clone(),
        })
    }

    /// Verify the signature the client received after paying.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MalformedSignature` if the signature is not
    /// hex, and `PaymentError::SignatureMismatch` if it does not match.
    pub fn verify_confirmation(
        &self,
        intent_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), PaymentError> {
        let expected = hex::decode(signature).map_err(|_| PaymentError::MalformedSignature)?;

        let mut mac = HmacSha256::new_from_slice(self.config.key_secret.expose_secret().as_bytes())
            .map_err(|_| PaymentError::SignatureMismatch)?;
        mac.update(intent_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());

        mac.verify_slice(&expected)
            .map_err(|_| PaymentError::SignatureMismatch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(secret: &str) -> PaymentsClient {
        PaymentsClient::new(
            reqwest::Client::new(),
            PaymentGatewayConfig {
                key_id: "key_test".to_owned(),
                key_secret: SecretString::from(secret),
                base_url: "https://gateway.invalid".to_owned(),
            },
        )
    }

    fn sign(secret: &str, intent_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{intent_id}|{payment_id}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_receipt_passed_through() {
        assert_eq!(receipt_or_default(Some("rcpt_custom_42")), "rcpt_custom_42");
    }

    #[test]
    fn test_blank_receipt_gets_generated_reference() {
        for supplied in [None, Some(""), Some("   ")] {
            let receipt = receipt_or_default(supplied);
            assert!(receipt.starts_with("rcpt_"));
            assert!(receipt.len() > "rcpt_".len());
        }
    }

    #[test]
    fn test_valid_signature_accepted() {
        let c = client("shh");
        let sig = sign("shh", "intent_1", "pay_1");
        assert!(c.verify_confirmation("intent_1", "pay_1", &sig).is_ok());
    }

    #[test]
    fn test_tampered_payment_id_rejected() {
        let c = client("shh");
        let sig = sign("shh", "intent_1", "pay_1");
        assert!(matches!(
            c.verify_confirmation("intent_1", "pay_2", &sig),
            Err(PaymentError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let c = client("shh");
        let sig = sign("other", "intent_1", "pay_1");
        assert!(matches!(
            c.verify_confirmation("intent_1", "pay_1", &sig),
            Err(PaymentError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_non_hex_signature_is_malformed() {
        let c = client("shh");
        assert!(matches!(
            c.verify_confirmation("intent_1", "pay_1", "zz-not-hex"),
            Err(PaymentError::MalformedSignature)
        ));
    }
}
