//! Checkout orchestration and order lifecycle management.
//!
//! The orchestrator drives order placement through a fixed sequence of
//! states: validate the cart against live stock (fail-fast), create the
//! order and its line items at live prices, decrement stock
//! (best-effort), and clear the cart. The lifecycle manager handles
//! status updates and deletion-with-restoration, reversing the stock
//! decrements before removing the order records.

pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod state;

pub use error::{AbortReason, CheckoutError, OrderError};
pub use lifecycle::OrderLifecycle;
pub use orchestrator::{CheckoutOrchestrator, CheckoutReceipt};
pub use state::CheckoutState;
