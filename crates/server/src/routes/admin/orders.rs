//! Admin order management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use kisan_suraksha_core::{OrderCode, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::OrderDetail;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// `GET /admin/orders` - every order, newest first, with the customer's
/// name and email attached.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderDetail>>> {
    let orders = OrderRepository::new(state.pool())
        .admin_list(query.status)
        .await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    /// Optional custom timeline label replacing the default
    /// "Status updated to X".
    pub note: Option<String>,
}

/// `PUT /admin/orders/{code}/status` - move an order one step forward, or
/// cancel it from any non-terminal state. Anything else is a 409.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Path(code): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<OrderDetail>> {
    let code = OrderCode::parse(&code)
        .map_err(|_| AppError::NotFound("Order not found".to_owned()))?;
    let order = OrderRepository::new(state.pool())
        .update_status(&code, body.status, body.note.as_deref())
        .await?;
    Ok(Json(order))
}
