//! Business logic services.

pub mod auth;
pub mod inference;
pub mod payments;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use inference::InferenceClient;
pub use payments::PaymentsClient;
pub use tokens::{Claims, TokenError, TokenService};
