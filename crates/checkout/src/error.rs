use thiserror::Error;

use common::{OrderId, ProductId};
use storage::StorageError;

/// Why a checkout was aborted during validation.
///
/// Every reason maps to a user-facing message with a retry path back to
/// the cart; none of them mutate any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    /// No resolved account identity was supplied.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line references a product that no longer exists.
    #[error("product not found: {0}")]
    ProductMissing(ProductId),

    /// A cart line asks for more than is available (or a zero quantity).
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
}

impl AbortReason {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AbortReason::NotAuthenticated => "not_authenticated",
            AbortReason::EmptyCart => "empty_cart",
            AbortReason::ProductMissing(_) => "product_missing",
            AbortReason::InsufficientStock { .. } => "insufficient_stock",
        }
    }
}

/// Errors raised by order placement.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Validation failed; cart and stock are untouched.
    #[error("checkout aborted: {0}")]
    Aborted(#[from] AbortReason),

    /// A storage failure before any mutation happened.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised by order lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The caller is not allowed to perform this operation.
    #[error("access denied")]
    AccessDenied,

    /// An underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
