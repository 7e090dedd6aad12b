//! Health check endpoints.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::Result;
use crate::state::AppState;

/// Liveness check. Always answers once the process is up.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check. Pings the database so a wedged pool shows up here
/// instead of on the first real request.
///
/// # Errors
///
/// Returns a 500 when the database does not answer.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.pool())
        .await
        .map_err(crate::db::RepositoryError::Database)?;

    Ok(Json(json!({ "status": "ready" })))
}
