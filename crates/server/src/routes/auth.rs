//! Registration, login and current-user routes.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::UserSummary;
use crate::services::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token plus user summary, the shape both register and login return.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserSummary,
}

/// `POST /auth/register` - create an account and log straight in.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&body.name, &body.email, &body.password)
        .await?;
    let access_token = state.tokens().issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            user: user.into(),
        }),
    ))
}

/// `POST /auth/login` - verify credentials and issue a token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;
    let access_token = state.tokens().issue(&user)?;

    Ok(Json(AuthResponse {
        access_token,
        user: user.into(),
    }))
}

/// `GET /auth/me` - the current user, fetched fresh so a renamed or
/// demoted account is reflected before the token expires.
pub async fn me(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
) -> Result<Json<UserSummary>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_owned()))?;
    Ok(Json(user.into()))
}
