//! Core types for KisanSuraksha.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order_code;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use order_code::{OrderCode, OrderCodeError};
pub use status::*;
