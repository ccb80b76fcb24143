//! Persistence layer for the storefront.
//!
//! Defines the record types and the three store traits the transactional
//! core runs over:
//!
//! - [`ProductStore`] — product catalog rows plus the stock ledger
//!   operations (atomic clamped decrement, unbounded increment).
//! - [`OrderStore`] — order headers and their immutable line items.
//! - [`CartStore`] — the persisted per-account cart mirror.
//!
//! Two implementations are provided: [`InMemoryStorage`] for tests and
//! local development, and [`PostgresStorage`] backed by sqlx.

pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use common::{Money, OrderId, ProductId, UserId};
pub use error::{Result, StorageError};
pub use memory::InMemoryStorage;
pub use model::{CartLine, Order, OrderItem, OrderStatus, ParseOrderStatusError, Product};
pub use postgres::PostgresStorage;
pub use store::{CartStore, OrderStore, ProductStore, Storage};
