//! Order placement and history.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use kisan_suraksha_core::{OrderCode, OrderStatus, PaymentMethod, ProductId, ShippingMode};

use crate::db::orders::{OrderLine, OrderRepository};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::OrderDetail;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub qty: i32,
}

/// The confirmation triple handed back by the gateway's client SDK.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub intent_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Client's view of the pricing. Only its presence and a numeric total are
/// checked; the authoritative breakdown is recomputed server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPricing {
    pub total: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    pub address: crate::models::AddressInput,
    #[serde(default)]
    pub shipping_mode: ShippingMode,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub promo_code: Option<String>,
    pub pricing: Option<ClientPricing>,
    pub payment: Option<PaymentConfirmation>,
}

/// `POST /orders` - the atomic placement transaction.
///
/// For `ONLINE` payment the confirmation signature is verified before any
/// stock is touched; a bad signature means no decrement ever happens.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderDetail>)> {
    if body.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    }
    if body.items.iter().any(|item| item.qty < 1) {
        return Err(AppError::BadRequest(
            "Item quantity must be at least 1".to_owned(),
        ));
    }
    let address = body
        .address
        .normalized()
        .map_err(|field| AppError::BadRequest(format!("Missing {field}")))?;
    let pricing = body
        .pricing
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing pricing".to_owned()))?;
    if pricing.total <= Decimal::ZERO {
        return Err(AppError::BadRequest("Invalid pricing total".to_owned()));
    }

    if body.payment_method == PaymentMethod::Online {
        let confirmation = body
            .payment
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("Missing payment confirmation".to_owned()))?;
        let payments = state
            .payments()
            .ok_or(AppError::NotConfigured("Payment gateway"))?;
        payments.verify_confirmation(
            &confirmation.intent_id,
            &confirmation.payment_id,
            &confirmation.signature,
        )?;
    }

    let lines: Vec<OrderLine> = body
        .items
        .iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            qty: item.qty,
        })
        .collect();

    let order = OrderRepository::new(state.pool())
        .place(
            claims.sub,
            &lines,
            &address,
            body.promo_code.as_deref(),
            body.shipping_mode,
            body.payment_method,
        )
        .await?;

    // Remember the shipping details for the next checkout. The order is
    // already committed; a failure here should not fail the request.
    if let Err(error) = UserRepository::new(state.pool())
        .upsert_shipping(claims.sub, &address, body.shipping_mode)
        .await
    {
        tracing::warn!(%error, "failed to save shipping profile after order");
    }

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// `GET /orders` - the caller's orders, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderDetail>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(claims.sub, query.status)
        .await?;
    Ok(Json(orders))
}

/// `GET /orders/{code}` - owner-scoped; someone else's code is a plain 404.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Path(code): Path<String>,
) -> Result<Json<OrderDetail>> {
    let code = OrderCode::parse(&code)
        .map_err(|_| AppError::NotFound("Order not found".to_owned()))?;
    let order = OrderRepository::new(state.pool())
        .get_for_user(claims.sub, &code)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;
    Ok(Json(order))
}
