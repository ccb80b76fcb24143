//! The checkout orchestrator: validated order placement.

use serde::Serialize;

use common::{Money, OrderId};
use domain::{Cart, CurrentUser};
use storage::{Order, OrderItem, Product, Storage};

use crate::error::{AbortReason, CheckoutError};
use crate::state::CheckoutState;

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    /// The newly created order.
    pub order_id: OrderId,
    /// The order total, computed from live prices at validation time.
    pub total: Money,
}

/// A cart line that passed validation, carrying the re-fetched product.
///
/// The product's price at this moment becomes the purchase-time price,
/// regardless of the snapshot stored in the cart line.
struct ValidatedLine {
    product: Product,
    quantity: u32,
}

/// Drives order placement through the checkout state machine.
///
/// Validation is fail-fast and mutation-free; once the order header and
/// items exist, the remaining steps are best-effort so a placed order is
/// never rolled back by a late storage failure.
pub struct CheckoutOrchestrator<S> {
    store: S,
}

impl<S: Storage> CheckoutOrchestrator<S> {
    /// Creates a new orchestrator over the given storage backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order from the given cart.
    ///
    /// On success the cart is cleared (session value and persisted
    /// mirror) and the receipt carries the new order id. On abort the
    /// cart and all stock counters are left exactly as they were.
    #[tracing::instrument(skip(self, user, cart))]
    pub async fn place(
        &self,
        user: Option<&CurrentUser>,
        cart: &mut Cart,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let mut state = CheckoutState::Validating;
        tracing::info!(%state, "checkout started");

        let user = match user {
            Some(user) => user,
            None => return Err(self.abort(AbortReason::NotAuthenticated)),
        };
        if cart.is_empty() {
            return Err(self.abort(AbortReason::EmptyCart));
        }
        let validated = self.validate_lines(cart).await?;

        state = CheckoutState::Creating;
        tracing::info!(%state, lines = validated.len(), "cart validated");

        let total: Money = validated
            .iter()
            .map(|line| line.product.price.multiply(line.quantity))
            .sum();
        let order = Order::new(user.id, total);
        self.store.insert_order(&order).await?;

        let items: Vec<OrderItem> = validated
            .iter()
            .map(|line| {
                OrderItem::new(order.id, line.product.id, line.quantity, line.product.price)
            })
            .collect();
        self.store.insert_order_items(&items).await?;

        state = CheckoutState::ReservingStock;
        tracing::info!(%state, order_id = %order.id, total = %total, "order created");
        self.reserve_stock(&validated).await;

        state = CheckoutState::Finalizing;
        tracing::info!(%state, "stock reserved");
        cart.clear();
        if let Err(e) = self.store.clear_cart(user.id).await {
            // The order is already durable; a stale persisted cart is
            // the lesser failure.
            tracing::warn!(user_id = %user.id, error = %e, "failed to clear persisted cart after checkout");
        }

        state = CheckoutState::Done;
        let duration = start.elapsed().as_secs_f64();
        metrics::counter!("checkout_placed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(duration);
        tracing::info!(%state, order_id = %order.id, duration, "checkout completed");

        Ok(CheckoutReceipt {
            order_id: order.id,
            total,
        })
    }

    /// Fail-fast validation pass over the cart lines.
    ///
    /// Re-fetches every product sequentially; the first missing product
    /// or unsatisfiable quantity aborts the whole checkout with nothing
    /// mutated. A zero quantity can only come from an upstream invariant
    /// violation and is treated as insufficient stock.
    async fn validate_lines(&self, cart: &Cart) -> Result<Vec<ValidatedLine>, CheckoutError> {
        let mut validated = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let product = self
                .store
                .get_product(line.product_id)
                .await?
                .ok_or_else(|| self.abort(AbortReason::ProductMissing(line.product_id)))?;

            if line.quantity == 0 || line.quantity > product.quantity {
                return Err(self.abort(AbortReason::InsufficientStock {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.quantity,
                }));
            }

            validated.push(ValidatedLine {
                product,
                quantity: line.quantity,
            });
        }
        Ok(validated)
    }

    /// Continue-on-error decrement pass.
    ///
    /// The order and its items already exist, so a failed decrement is
    /// logged and counted but never fails the checkout.
    async fn reserve_stock(&self, lines: &[ValidatedLine]) {
        for line in lines {
            if let Err(e) = self
                .store
                .decrement_stock(line.product.id, line.quantity)
                .await
            {
                metrics::counter!("checkout_stock_decrement_failures_total").increment(1);
                tracing::error!(
                    product_id = %line.product.id,
                    quantity = line.quantity,
                    error = %e,
                    "stock decrement failed, continuing with remaining lines"
                );
            }
        }
    }

    fn abort(&self, reason: AbortReason) -> CheckoutError {
        metrics::counter!("checkout_aborted_total", "reason" => reason.label()).increment(1);
        tracing::warn!(state = %CheckoutState::Aborted, %reason, "checkout aborted");
        CheckoutError::Aborted(reason)
    }
}
