//! Saved addresses and the shipping profile.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use kisan_suraksha_core::{AddressId, ShippingMode};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Address, AddressInput, ShippingProfile};
use crate::state::AppState;

/// `GET /account/addresses`
pub async fn list_addresses(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
) -> Result<Json<Vec<Address>>> {
    let addresses = UserRepository::new(state.pool())
        .list_addresses(claims.sub)
        .await?;
    Ok(Json(addresses))
}

/// `POST /account/addresses` - returns the updated list.
pub async fn create_address(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Json(body): Json<AddressInput>,
) -> Result<(StatusCode, Json<Vec<Address>>)> {
    let address = body
        .normalized()
        .map_err(|field| AppError::BadRequest(format!("Missing {field}")))?;
    let addresses = UserRepository::new(state.pool())
        .add_address(claims.sub, &address, body.is_default)
        .await?;
    Ok((StatusCode::CREATED, Json(addresses)))
}

/// `PUT /account/addresses/{id}`
pub async fn update_address(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressInput>,
) -> Result<Json<Vec<Address>>> {
    let address = body
        .normalized()
        .map_err(|field| AppError::BadRequest(format!("Missing {field}")))?;
    let addresses = UserRepository::new(state.pool())
        .update_address(claims.sub, id, &address, body.is_default)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;
    Ok(Json(addresses))
}

/// `DELETE /account/addresses/{id}`
pub async fn delete_address(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<Address>>> {
    let addresses = UserRepository::new(state.pool())
        .delete_address(claims.sub, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;
    Ok(Json(addresses))
}

/// `PATCH /account/addresses/{id}/default`
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Path(id): Path<AddressId>,
) -> Result<Json<Vec<Address>>> {
    let addresses = UserRepository::new(state.pool())
        .set_default_address(claims.sub, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Address not found".to_owned()))?;
    Ok(Json(addresses))
}

/// `GET /account/shipping` - null body when nothing has been saved yet.
pub async fn get_shipping(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
) -> Result<Json<Option<ShippingProfile>>> {
    let profile = UserRepository::new(state.pool())
        .get_shipping(claims.sub)
        .await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingUpdate {
    #[serde(flatten)]
    pub address: AddressInput,
    #[serde(default)]
    pub shipping_mode: ShippingMode,
}

/// `PUT /account/shipping`
pub async fn put_shipping(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Json(body): Json<ShippingUpdate>,
) -> Result<Json<ShippingProfile>> {
    let address = body
        .address
        .normalized()
        .map_err(|field| AppError::BadRequest(format!("Missing {field}")))?;
    let profile = UserRepository::new(state.pool())
        .upsert_shipping(claims.sub, &address, body.shipping_mode)
        .await?;
    Ok(Json(profile))
}
