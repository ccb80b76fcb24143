//! Route handlers and shared application state.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod products;

use checkout::{CheckoutOrchestrator, OrderLifecycle};
use domain::CartService;
use storage::Storage;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Storage> {
    pub store: S,
    pub carts: CartService<S>,
    pub checkout: CheckoutOrchestrator<S>,
    pub orders: OrderLifecycle<S>,
}

impl<S: Storage + Clone> AppState<S> {
    /// Wires the services around a single storage backend.
    pub fn new(store: S) -> Self {
        Self {
            carts: CartService::new(store.clone()),
            checkout: CheckoutOrchestrator::new(store.clone()),
            orders: OrderLifecycle::new(store.clone()),
            store,
        }
    }
}
