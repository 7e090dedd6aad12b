//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ks-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! If an account with the email already exists it is promoted to admin
//! (and its password reset); otherwise a fresh admin account is created.

use kisan_suraksha_core::Email;
use kisan_suraksha_server::services::auth::hash_password;

use super::CliError;

/// Create a new admin user, or promote an existing account.
///
/// # Errors
///
/// Returns `CliError::InvalidEmail` for a malformed email and
/// `CliError::Database` for database failures.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
    let password_hash = hash_password(password).map_err(|_| CliError::PasswordHash)?;

    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {}", email.as_str());

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO app_user (name, email, password_hash, is_admin) \
         VALUES ($1, $2, $3, TRUE) \
         ON CONFLICT (email) DO UPDATE SET \
             name = EXCLUDED.name, \
             password_hash = EXCLUDED.password_hash, \
             is_admin = TRUE, \
             updated_at = now() \
         RETURNING id",
    )
    .bind(name)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user ready. ID: {}, Email: {}",
        user_id,
        email.as_str()
    );

    Ok(user_id)
}
