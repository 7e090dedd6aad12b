//! Request middleware and extractors.

pub mod auth;
pub mod rate_limit;

pub use auth::{RequireAdmin, RequireUser};
