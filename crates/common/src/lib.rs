//! Shared types for the storefront system.
//!
//! Identifier newtypes and the `Money` amount type used across the
//! storage, domain, checkout, and API crates.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{OrderId, ProductId, UserId};
