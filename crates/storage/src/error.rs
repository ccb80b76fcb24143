use thiserror::Error;

use crate::ProductId;
use crate::model::ParseOrderStatusError;

/// Errors that can occur when interacting with the stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The product does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A stock adjustment was requested with a zero amount.
    #[error("stock adjustment amount must be greater than zero")]
    InvalidAmount,

    /// A persisted status string is not a member of the closed status set.
    #[error("invalid order status: {0}")]
    InvalidStatus(#[from] ParseOrderStatusError),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;
