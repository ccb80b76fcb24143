use thiserror::Error;

use common::ProductId;
use storage::StorageError;

/// Errors raised by cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist in the catalog.
    #[error("product not found: {0}")]
    ProductMissing(ProductId),

    /// The product has no stock at all.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The cart already holds all available stock for the product.
    #[error("no further stock available for product {0}")]
    InsufficientStock(ProductId),

    /// The cart has no line for the product.
    #[error("product {0} is not in the cart")]
    LineNotFound(ProductId),

    /// An underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
