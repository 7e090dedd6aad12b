//! Admin routes. Every handler takes [`crate::middleware::RequireAdmin`].

pub mod orders;
pub mod products;
