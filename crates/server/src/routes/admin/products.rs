//! Admin catalog management.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use rand::{Rng, distr::Alphanumeric};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use kisan_suraksha_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::state::AppState;

/// `GET /admin/products` - the whole catalog, inactive products included.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// `POST /admin/products`
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Missing name".to_owned()));
    }
    if body.price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Price must be greater than zero".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool()).create(&body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /admin/products/{id}` - partial field update. Stock is not
/// accepted here; corrections go through the guarded stock endpoint.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_owned()));
    }
    if let Some(price) = patch.price
        && price <= Decimal::ZERO
    {
        return Err(AppError::BadRequest(
            "Price must be greater than zero".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .update(id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCorrection {
    pub stock: i32,
    /// The stock the admin was looking at when they made the edit. A
    /// mismatch means an order claimed units in the meantime; the edit is
    /// rejected instead of silently undoing the claim.
    pub expected_stock: i32,
}

/// `PUT /admin/products/{id}/stock`
pub async fn correct_stock(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(body): Json<StockCorrection>,
) -> Result<Json<Product>> {
    if body.stock < 0 {
        return Err(AppError::BadRequest(
            "Stock cannot be negative".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .correct_stock(id, body.stock, body.expected_stock)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
pub struct RemoveQuery {
    #[serde(default)]
    pub hard: bool,
}

/// `DELETE /admin/products/{id}` - deactivates by default so historical
/// orders keep their references; `?hard=true` removes the row.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    Path(id): Path<ProductId>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<Value>> {
    let repo = ProductRepository::new(state.pool());

    if query.hard {
        if !repo.delete_hard(id).await? {
            return Err(AppError::NotFound("Product not found".to_owned()));
        }
    } else if repo.deactivate(id).await?.is_none() {
        return Err(AppError::NotFound("Product not found".to_owned()));
    }

    Ok(Json(json!({ "ok": true })))
}

/// `POST /admin/products/upload-image` - multipart field `image`; the file
/// lands under the upload directory and is served back at `/uploads/...`.
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::BadRequest("Malformed multipart body".to_owned()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("image.jpg").to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::BadRequest("Could not read uploaded file".to_owned()))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_owned()));
        }

        let file_name = storage_name(&original_name);
        let dir = state.config().upload_dir.clone();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("could not create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&file_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("could not store upload: {e}")))?;

        return Ok((
            StatusCode::CREATED,
            Json(json!({ "imageUrl": format!("/uploads/{file_name}") })),
        ));
    }

    Err(AppError::BadRequest("No image file provided".to_owned()))
}

/// Unique on-disk name: timestamp plus random tag, original extension
/// kept, everything else discarded (uploads cannot pick their own path).
fn storage_name(original: &str) -> String {
    let extension = std::path::Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(char::is_alphanumeric))
        .unwrap_or("jpg");
    let tag: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{tag}.{extension}", chrono::Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_name_keeps_safe_extension() {
        let name = storage_name("leaf photo.PNG");
        assert!(name.ends_with(".PNG"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn test_storage_name_discards_path_tricks() {
        let name = storage_name("../../etc/passwd");
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_storage_names_are_unique() {
        assert_ne!(storage_name("a.jpg"), storage_name("a.jpg"));
    }
}
