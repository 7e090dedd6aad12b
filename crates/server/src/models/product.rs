//! Catalog product model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kisan_suraksha_core::ProductId;

/// A catalog product as stored.
///
/// `stock` never goes negative: the only decrement path is the conditional
/// update inside the order placement transaction, and the column carries a
/// CHECK constraint as a backstop.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub rating: Decimal,
    pub image_url: String,
    pub description: String,
    pub category: String,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a product (admin).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub rating: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Partial update payload for a product (admin).
///
/// Stock is deliberately not part of this payload: stock corrections go
/// through the guarded `PUT /admin/products/{id}/stock` path so they cannot
/// silently race the order transaction's decrement.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductPatch {
    /// Whether the patch carries any change at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.rating.is_none()
            && self.image_url.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_defaults() {
        let p: NewProduct =
            serde_json::from_str(r#"{"name": "Neem Oil", "price": "249.00"}"#).unwrap();
        assert_eq!(p.name, "Neem Oil");
        assert_eq!(p.stock, 0);
        assert!(p.is_active);
        assert!(p.category.is_none());
    }

    #[test]
    fn test_patch_rejects_stock_field_silently() {
        // Unknown fields are ignored by serde; stock never lands in a patch.
        let patch: ProductPatch = serde_json::from_str(r#"{"stock": 99}"#).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn test_patch_empty_detection() {
        let patch = ProductPatch::default();
        assert!(patch.is_empty());

        let patch: ProductPatch = serde_json::from_str(r#"{"price": "10"}"#).unwrap();
        assert!(!patch.is_empty());
    }
}
