use async_trait::async_trait;

use crate::{
    CartLine, Order, OrderId, OrderItem, OrderStatus, Product, ProductId, Result, UserId,
};

/// Product catalog rows plus the stock ledger operations.
///
/// The stock operations are the authoritative per-product availability
/// counter. Both must be atomic at the single-row level; no intermediate
/// quantity is ever visible to a concurrent reader.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Fetches a product by id. Returns `None` if it does not exist.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists all products.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Inserts a new product row.
    async fn insert_product(&self, product: &Product) -> Result<()>;

    /// Replaces a product row. Returns the number of rows affected.
    async fn update_product(&self, product: &Product) -> Result<u64>;

    /// Deletes a product row. Returns the number of rows affected.
    async fn delete_product(&self, id: ProductId) -> Result<u64>;

    /// Returns the available quantity for a product.
    ///
    /// Fails with `ProductNotFound` if the product does not exist.
    async fn available_quantity(&self, id: ProductId) -> Result<u32>;

    /// Decrements available stock by `amount`, flooring at zero.
    ///
    /// `amount` must be greater than zero (`InvalidAmount` otherwise).
    /// Clamping at zero is deliberate policy, not an error: an
    /// over-decrement silently leaves the counter at zero. Returns the
    /// number of rows affected; `ProductNotFound` if the row is missing.
    async fn decrement_stock(&self, id: ProductId, amount: u32) -> Result<u64>;

    /// Increments available stock by `amount`, with no upper bound.
    ///
    /// Used to restore stock when an order is deleted. Same amount and
    /// not-found rules as [`decrement_stock`](ProductStore::decrement_stock).
    async fn increment_stock(&self, id: ProductId, amount: u32) -> Result<u64>;
}

/// Order headers and their line items.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order header.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Bulk-inserts line items for an order. A no-op for an empty slice.
    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<()>;

    /// Fetches an order header by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists all orders, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Lists one user's orders, newest first.
    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Fetches the line items of an order.
    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Sets an order's status. Returns the number of rows affected.
    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<u64>;

    /// Deletes all line items of an order. Returns the number of rows affected.
    async fn delete_order_items(&self, order_id: OrderId) -> Result<u64>;

    /// Deletes an order header. Returns the number of rows affected.
    ///
    /// Callers must delete the line items first; restoration needs the
    /// quantities they carry.
    async fn delete_order(&self, id: OrderId) -> Result<u64>;
}

/// The persisted per-account cart mirror.
///
/// The session cart itself is an in-memory value owned by the caller;
/// these rows only exist so a cart survives across sessions. Loaded at
/// login, replaced on save, cleared at checkout.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads the saved cart lines for a user. Empty if none were saved.
    async fn load_cart(&self, user_id: UserId) -> Result<Vec<CartLine>>;

    /// Replaces the saved cart for a user with the given lines.
    async fn save_cart(&self, user_id: UserId, lines: &[CartLine]) -> Result<()>;

    /// Removes all saved cart lines for a user. Returns rows affected.
    async fn clear_cart(&self, user_id: UserId) -> Result<u64>;
}

/// Marker trait for a complete storage backend.
pub trait Storage: ProductStore + OrderStore + CartStore {}

impl<T: ProductStore + OrderStore + CartStore> Storage for T {}
