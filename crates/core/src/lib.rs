//! KisanSuraksha Core - Shared types library.
//!
//! This crate provides common types used across all KisanSuraksha components:
//! - `server` - REST API backing the storefront and the admin back-office
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, order codes, and statuses
//! - [`pricing`] - The single authoritative cart/order pricing evaluator

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use types::*;
