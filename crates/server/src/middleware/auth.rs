//! Authentication extractors.
//!
//! Routes require a bearer token by taking [`RequireUser`] (any account) or
//! [`RequireAdmin`] (admin flag set) as an argument. Both carry the verified
//! token claims.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::services::tokens::Claims;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(claims): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", claims.name)
/// }
/// ```
pub struct RequireUser(pub Claims);

/// Extractor that requires a valid bearer token with the admin flag set.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_owned()))?;
        let claims = state.tokens().verify(token)?;

        set_sentry_user(&claims.sub, Some(claims.email.as_str()));

        Ok(Self(claims))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(claims) = RequireUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(Self(claims))
    }
}

/// Pull the token out of the `Authorization: Bearer ...` header.
///
/// Browser clients sometimes serialize a missing token literally; quotes
/// and the strings `null`/`undefined` are treated as absent.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let token = value.strip_prefix("Bearer ")?.trim().trim_matches('"');

    if token.is_empty() || token == "null" || token == "undefined" {
        return None;
    }
    Some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_auth(value: &str) -> Parts {
        let (parts, ()) = Request::builder()
            .uri("/")
            .header("authorization", value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_quoted_token_unwrapped() {
        let parts = parts_with_auth("Bearer \"abc.def.ghi\"");
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_null_and_undefined_treated_as_absent() {
        assert_eq!(bearer_token(&parts_with_auth("Bearer null")), None);
        assert_eq!(bearer_token(&parts_with_auth("Bearer undefined")), None);
        assert_eq!(bearer_token(&parts_with_auth("Bearer ")), None);
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        assert_eq!(bearer_token(&parts_with_auth("Basic dXNlcg==")), None);
    }
}
