//! Contact form repository.

use sqlx::PgPool;

use kisan_suraksha_core::ContactMessageId;

use super::RepositoryError;

/// Repository for contact form submissions.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a contact form submission along with client metadata.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        message: &str,
        ip: &str,
        user_agent: &str,
    ) -> Result<ContactMessageId, RepositoryError> {
        let id: ContactMessageId = sqlx::query_scalar(
            "INSERT INTO contact_message (name, email, message, ip, user_agent) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(message)
        .bind(ip)
        .bind(user_agent)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }
}
