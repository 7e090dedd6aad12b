//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying the user's identity and admin flag.
//! They are stateless; logout is purely client-side (drop the token) and
//! an admin demotion takes effect when the current token expires.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kisan_suraksha_core::{Email, UserId};

use crate::models::User;

/// Token lifetime in seconds (8 hours).
const TOKEN_TTL_SECS: i64 = 8 * 60 * 60;

/// Errors from token issuing or verification.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token is malformed, has a bad signature, or is expired.
    #[error("invalid token")]
    Invalid,

    /// The token could not be signed.
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// The claims embedded in a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// The user's storage id.
    pub sub: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared HS256 secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    /// Build the service from the signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a user, valid for eight hours.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for a bad signature, malformed token,
    /// or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(7),
            name: "Asha".to_owned(),
            email: Email::parse("asha@example.com").unwrap(),
            is_admin: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(
            "a-test-secret-that-is-long-enough-to-use",
        ))
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let svc = service();
        let token = svc.issue(&sample_user()).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId::new(7));
        assert_eq!(claims.email.as_str(), "asha@example.com");
        assert!(claims.is_admin);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(&sample_user()).unwrap();
        let other = TokenService::new(&SecretString::from(
            "a-different-secret-that-is-also-long-enough",
        ));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().verify("not.a.jwt"),
            Err(TokenError::Invalid)
        ));
    }
}
