//! Stock-checked cart mutations and the persisted-cart mirror.

use common::{ProductId, UserId};
use storage::{CartLine, CartStore, Product, ProductStore};

use crate::cart::{Cart, Fulfillment};
use crate::error::CartError;

/// Service for cart operations that need the catalog or the persisted
/// cart mirror.
///
/// Every mutation re-fetches the product so the user gets immediate
/// feedback on availability; the result may still go stale before
/// checkout, which re-validates on its own.
pub struct CartService<S> {
    store: S,
}

impl<S: ProductStore + CartStore> CartService<S> {
    /// Creates a new cart service over the given storage backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<Product, CartError> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductMissing(product_id))
    }

    /// Adds a product to the cart.
    ///
    /// The requested quantity is normalized to at least 1. If fewer
    /// units are available than requested, only the available amount is
    /// added and `Fulfillment::Partial` reports the adjustment. Fails
    /// without mutating when the product is gone, has no stock, or the
    /// cart already holds everything available.
    #[tracing::instrument(skip(self, cart))]
    pub async fn add(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        requested: u32,
    ) -> Result<Fulfillment, CartError> {
        let requested = requested.max(1);
        let product = self.fetch_product(product_id).await?;

        if product.is_out_of_stock() {
            return Err(CartError::OutOfStock(product_id));
        }

        let in_cart = cart.quantity_of(product_id);
        let max_addable = product.quantity.saturating_sub(in_cart);
        if max_addable == 0 {
            return Err(CartError::InsufficientStock(product_id));
        }

        let added = requested.min(max_addable);
        cart.upsert_add(CartLine::for_product(&product, added));

        if added < requested {
            tracing::debug!(%product_id, requested, added, "cart add clamped to available stock");
            Ok(Fulfillment::Partial {
                requested,
                fulfilled: added,
            })
        } else {
            Ok(Fulfillment::Full)
        }
    }

    /// Sets the quantity of an existing cart line.
    ///
    /// A requested quantity of 0 removes the line. A request above the
    /// available stock clamps to it (removing the line when nothing is
    /// available) and reports partial fulfillment.
    #[tracing::instrument(skip(self, cart))]
    pub async fn update_quantity(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        requested: u32,
    ) -> Result<Fulfillment, CartError> {
        if cart.line(product_id).is_none() {
            return Err(CartError::LineNotFound(product_id));
        }

        if requested == 0 {
            cart.set_quantity(product_id, 0);
            return Ok(Fulfillment::Full);
        }

        let product = self.fetch_product(product_id).await?;
        let applied = requested.min(product.quantity);
        cart.set_quantity(product_id, applied);

        if applied < requested {
            tracing::debug!(%product_id, requested, applied, "cart update clamped to available stock");
            Ok(Fulfillment::Partial {
                requested,
                fulfilled: applied,
            })
        } else {
            Ok(Fulfillment::Full)
        }
    }

    /// Loads the persisted cart for a user (login boundary).
    #[tracing::instrument(skip(self))]
    pub async fn load_for_user(&self, user_id: UserId) -> Result<Cart, CartError> {
        let lines = self.store.load_cart(user_id).await?;
        Ok(Cart::from_lines(lines))
    }

    /// Replaces the persisted cart for a user (logout boundary).
    #[tracing::instrument(skip(self, cart))]
    pub async fn persist_for_user(&self, user_id: UserId, cart: &Cart) -> Result<(), CartError> {
        let lines: Vec<CartLine> = cart.lines().cloned().collect();
        self.store.save_cart(user_id, &lines).await?;
        Ok(())
    }
}
