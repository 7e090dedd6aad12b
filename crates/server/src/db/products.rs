//! Product repository.
//!
//! All stock mutations flow through exactly two paths, both conditional
//! updates: the order transaction's decrement (in `db::orders`) and the
//! admin correction in [`ProductRepository::correct_stock`]. Neither path
//! can silently overwrite the other's write.

use sqlx::PgPool;

use kisan_suraksha_core::ProductId;

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductPatch};

const LIST_LIMIT: i64 = 200;

const PRODUCT_COLUMNS: &str = "id, name, price, rating, image_url, description, category, \
                               stock, is_active, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products for the public catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product \
             WHERE is_active \
             ORDER BY created_at DESC \
             LIMIT $1"
        ))
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Get one active product (public detail view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1 AND is_active"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// List all products including inactive ones (admin view), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO product (name, price, rating, image_url, description, category, stock, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(new.name.trim())
        .bind(new.price)
        .bind(new.rating)
        .bind(&new.image_url)
        .bind(&new.description)
        .bind(new.category.as_deref().unwrap_or("General"))
        .bind(new.stock)
        .bind(new.is_active)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Apply a partial update. Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE product SET \
                 name = COALESCE($2, name), \
                 price = COALESCE($3, price), \
                 rating = COALESCE($4, rating), \
                 image_url = COALESCE($5, image_url), \
                 description = COALESCE($6, description), \
                 category = COALESCE($7, category), \
                 is_active = COALESCE($8, is_active), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.price)
        .bind(patch.rating)
        .bind(patch.image_url.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.is_active)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Soft-delete: mark a product inactive so it disappears from the
    /// public catalog and can no longer be ordered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE product SET is_active = FALSE, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Hard-delete a product row. Returns whether a row was removed.
    ///
    /// Historical orders are unaffected: order items carry their own
    /// snapshot of name/price/image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_hard(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Correct a product's stock, conditioned on the expected current value.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the stock changed underneath
    /// the caller (e.g. an order was placed between their read and this
    /// write); the admin must re-read and retry.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn correct_stock(
        &self,
        id: ProductId,
        new_stock: i32,
        expected_stock: i32,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE product SET stock = $2, updated_at = now() \
             WHERE id = $1 AND stock = $3 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(new_stock)
        .bind(expected_stock)
        .fetch_optional(self.pool)
        .await?;

        if let Some(product) = product {
            return Ok(Some(product));
        }

        // Distinguish "gone" from "precondition failed".
        let current: Option<i32> = sqlx::query_scalar("SELECT stock FROM product WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match current {
            Some(stock) => Err(RepositoryError::Conflict(format!(
                "stock changed underneath you (now {stock}); re-read and retry"
            ))),
            None => Ok(None),
        }
    }
}
