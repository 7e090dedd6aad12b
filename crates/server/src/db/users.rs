//! User repository: accounts, saved addresses, shipping profile.
//!
//! Address invariant: at most one address per user has `is_default = true`.
//! Every mutation that touches the flag clears it across the user's
//! addresses in the same transaction, and a partial unique index backs the
//! invariant at the storage layer.

use sqlx::PgPool;

use kisan_suraksha_core::{AddressId, Email, ShippingMode, UserId};

use super::RepositoryError;
use crate::models::{Address, ShippingAddress, ShippingProfile, User};

const USER_COLUMNS: &str = "id, name, email, is_admin, created_at, updated_at";

const ADDRESS_COLUMNS: &str = "id, user_id, label, full_name, phone, line1, line2, city, \
                               state, pincode, country, is_default, created_at";

const SHIPPING_COLUMNS: &str = "user_id, full_name, phone, line1, line2, city, state, \
                                pincode, country, shipping_mode, updated_at";

/// A user row joined with its password hash, for login.
#[derive(sqlx::FromRow)]
struct AuthRow {
    id: UserId,
    name: String,
    email: Email,
    is_admin: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    password_hash: String,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO app_user (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name.trim())
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;
        Ok(user)
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, AuthRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    name: r.name,
                    email: r.email,
                    is_admin: r.is_admin,
                    created_at: r.created_at,
                    updated_at: r.updated_at,
                },
                r.password_hash,
            )
        }))
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List a user's saved addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address \
             WHERE user_id = $1 \
             ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// Add an address. The first address a user saves becomes their
    /// default; an explicit `is_default` clears the flag elsewhere.
    ///
    /// Returns the updated address list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn add_address(
        &self,
        user_id: UserId,
        address: &ShippingAddress,
        is_default: bool,
    ) -> Result<Vec<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM address WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let make_default = is_default || existing == 0;
        if make_default {
            sqlx::query("UPDATE address SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO address \
                 (user_id, label, full_name, phone, line1, line2, city, state, pincode, country, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user_id)
        .bind(&address.label)
        .bind(&address.full_name)
        .bind(&address.phone)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.pincode)
        .bind(&address.country)
        .bind(make_default)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.list_addresses(user_id).await
    }

    /// Update an address owned by the user. Returns `None` if it does not
    /// exist (or belongs to someone else).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn update_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
        address: &ShippingAddress,
        set_default: bool,
    ) -> Result<Option<Vec<Address>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if set_default {
            sqlx::query("UPDATE address SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query(
            "UPDATE address SET \
                 label = $3, full_name = $4, phone = $5, line1 = $6, line2 = $7, \
                 city = $8, state = $9, pincode = $10, country = $11, \
                 is_default = is_default OR $12 \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(address_id)
        .bind(user_id)
        .bind(&address.label)
        .bind(&address.full_name)
        .bind(&address.phone)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.pincode)
        .bind(&address.country)
        .bind(set_default)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Nothing owned by this user matched; drop the transaction.
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(self.list_addresses(user_id).await?))
    }

    /// Delete an address owned by the user. Returns `None` if it does not
    /// exist. If the deleted address was the default, the earliest
    /// remaining address is promoted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Vec<Address>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default: Option<bool> = sqlx::query_scalar(
            "DELETE FROM address WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            return Ok(None);
        };

        if was_default {
            sqlx::query(
                "UPDATE address SET is_default = TRUE \
                 WHERE id = (SELECT id FROM address WHERE user_id = $1 ORDER BY created_at, id LIMIT 1)",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(self.list_addresses(user_id).await?))
    }

    /// Mark one address as the user's default, clearing the flag elsewhere.
    /// Returns `None` if the address does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn set_default_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<Option<Vec<Address>>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE address SET is_default = FALSE WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE address SET is_default = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(address_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(self.list_addresses(user_id).await?))
    }

    // =========================================================================
    // Shipping profile
    // =========================================================================

    /// Get the user's last-used shipping details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_shipping(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShippingProfile>, RepositoryError> {
        let profile = sqlx::query_as::<_, ShippingProfile>(&format!(
            "SELECT {SHIPPING_COLUMNS} FROM shipping_profile WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(profile)
    }

    /// Save the user's last-used shipping details (insert or replace).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_shipping(
        &self,
        user_id: UserId,
        address: &ShippingAddress,
        mode: ShippingMode,
    ) -> Result<ShippingProfile, RepositoryError> {
        let profile = sqlx::query_as::<_, ShippingProfile>(&format!(
            "INSERT INTO shipping_profile \
                 (user_id, full_name, phone, line1, line2, city, state, pincode, country, shipping_mode, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now()) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 full_name = EXCLUDED.full_name, phone = EXCLUDED.phone, \
                 line1 = EXCLUDED.line1, line2 = EXCLUDED.line2, \
                 city = EXCLUDED.city, state = EXCLUDED.state, \
                 pincode = EXCLUDED.pincode, country = EXCLUDED.country, \
                 shipping_mode = EXCLUDED.shipping_mode, updated_at = now() \
             RETURNING {SHIPPING_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&address.full_name)
        .bind(&address.phone)
        .bind(&address.line1)
        .bind(&address.line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.pincode)
        .bind(&address.country)
        .bind(mode)
        .fetch_one(self.pool)
        .await?;
        Ok(profile)
    }
}
