use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    CartLine, CartStore, Order, OrderId, OrderItem, OrderStatus, OrderStore, Product, ProductId,
    ProductStore, Result, StorageError, UserId,
};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    order_items: Vec<OrderItem>,
    carts: HashMap<UserId, Vec<CartLine>>,
    fail_on_decrement: bool,
    fail_on_increment: bool,
    fail_on_clear_cart: bool,
}

/// In-memory storage backend for tests and local development.
///
/// Provides the same interface as the PostgreSQL implementation. The
/// `set_fail_on_*` hooks inject storage failures into the best-effort
/// phases of checkout and order deletion so their continue-on-error
/// policies can be exercised.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<RwLock<Inner>>,
}

fn injected_failure(what: &str) -> StorageError {
    StorageError::Database(sqlx::Error::Protocol(format!("injected {what} failure")))
}

impl InMemoryStorage {
    /// Creates a new empty storage backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures stock decrements to fail.
    pub async fn set_fail_on_decrement(&self, fail: bool) {
        self.inner.write().await.fail_on_decrement = fail;
    }

    /// Configures stock increments to fail.
    pub async fn set_fail_on_increment(&self, fail: bool) {
        self.inner.write().await.fail_on_increment = fail;
    }

    /// Configures persisted-cart clears to fail.
    pub async fn set_fail_on_clear_cart(&self, fail: bool) {
        self.inner.write().await.fail_on_clear_cart = fail;
    }

    /// Returns the number of order headers stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Returns the number of order item rows stored.
    pub async fn order_item_count(&self) -> usize {
        self.inner.read().await.order_items.len()
    }
}

#[async_trait]
impl ProductStore for InMemoryStorage {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        let mut products: Vec<_> = inner.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        self.inner
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<u64> {
        let mut inner = self.inner.write().await;
        match inner.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_product(&self, id: ProductId) -> Result<u64> {
        let removed = self.inner.write().await.products.remove(&id);
        Ok(u64::from(removed.is_some()))
    }

    async fn available_quantity(&self, id: ProductId) -> Result<u32> {
        let inner = self.inner.read().await;
        inner
            .products
            .get(&id)
            .map(|p| p.quantity)
            .ok_or(StorageError::ProductNotFound(id))
    }

    async fn decrement_stock(&self, id: ProductId, amount: u32) -> Result<u64> {
        if amount == 0 {
            return Err(StorageError::InvalidAmount);
        }
        let mut inner = self.inner.write().await;
        if inner.fail_on_decrement {
            return Err(injected_failure("decrement"));
        }
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(StorageError::ProductNotFound(id))?;
        product.quantity = product.quantity.saturating_sub(amount);
        Ok(1)
    }

    async fn increment_stock(&self, id: ProductId, amount: u32) -> Result<u64> {
        if amount == 0 {
            return Err(StorageError::InvalidAmount);
        }
        let mut inner = self.inner.write().await;
        if inner.fail_on_increment {
            return Err(injected_failure("increment"));
        }
        let product = inner
            .products
            .get_mut(&id)
            .ok_or(StorageError::ProductNotFound(id))?;
        product.quantity += amount;
        Ok(1)
    }
}

#[async_trait]
impl OrderStore for InMemoryStorage {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        self.inner
            .write()
            .await
            .orders
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        self.inner
            .write()
            .await
            .order_items
            .extend(items.iter().cloned());
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<_> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<_> = inner
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .order_items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<u64> {
        let mut inner = self.inner.write().await;
        match inner.orders.get_mut(&id) {
            Some(order) => {
                order.status = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_order_items(&self, order_id: OrderId) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.order_items.len();
        inner.order_items.retain(|i| i.order_id != order_id);
        Ok((before - inner.order_items.len()) as u64)
    }

    async fn delete_order(&self, id: OrderId) -> Result<u64> {
        let removed = self.inner.write().await.orders.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}

#[async_trait]
impl CartStore for InMemoryStorage {
    async fn load_cart(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        Ok(self
            .inner
            .read()
            .await
            .carts
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_cart(&self, user_id: UserId, lines: &[CartLine]) -> Result<()> {
        let mut inner = self.inner.write().await;
        if lines.is_empty() {
            inner.carts.remove(&user_id);
        } else {
            inner.carts.insert(user_id, lines.to_vec());
        }
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64> {
        let mut inner = self.inner.write().await;
        if inner.fail_on_clear_cart {
            return Err(injected_failure("cart clear"));
        }
        let removed = inner.carts.remove(&user_id);
        Ok(removed.map(|lines| lines.len() as u64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Money;

    async fn store_with_product(quantity: u32) -> (InMemoryStorage, Product) {
        let store = InMemoryStorage::new();
        let product = Product::new("Widget", Money::from_cents(1000), quantity);
        store.insert_product(&product).await.unwrap();
        (store, product)
    }

    #[tokio::test]
    async fn decrement_reduces_stock() {
        let (store, product) = store_with_product(5).await;

        let affected = store.decrement_stock(product.id, 3).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(store.available_quantity(product.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn decrement_clamps_at_zero() {
        let (store, product) = store_with_product(2).await;

        // Over-decrement is clamped, not rejected.
        store.decrement_stock(product.id, 10).await.unwrap();
        assert_eq!(store.available_quantity(product.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn decrement_rejects_zero_amount() {
        let (store, product) = store_with_product(5).await;

        let result = store.decrement_stock(product.id, 0).await;
        assert!(matches!(result, Err(StorageError::InvalidAmount)));
        assert_eq!(store.available_quantity(product.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn decrement_missing_product_fails() {
        let store = InMemoryStorage::new();
        let result = store.decrement_stock(ProductId::new(), 1).await;
        assert!(matches!(result, Err(StorageError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn increment_has_no_upper_bound() {
        let (store, product) = store_with_product(1).await;

        store.increment_stock(product.id, 1_000_000).await.unwrap();
        assert_eq!(
            store.available_quantity(product.id).await.unwrap(),
            1_000_001
        );
    }

    #[tokio::test]
    async fn injected_decrement_failure() {
        let (store, product) = store_with_product(5).await;
        store.set_fail_on_decrement(true).await;

        let result = store.decrement_stock(product.id, 1).await;
        assert!(matches!(result, Err(StorageError::Database(_))));
        // Stock untouched by the failed call.
        assert_eq!(store.available_quantity(product.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn order_roundtrip_and_listing_order() {
        let store = InMemoryStorage::new();
        let user = UserId::new();

        let first = Order::new(user, Money::from_cents(100));
        let mut second = Order::new(user, Money::from_cents(200));
        second.created_at = first.created_at + chrono::Duration::seconds(1);

        store.insert_order(&first).await.unwrap();
        store.insert_order(&second).await.unwrap();

        let orders = store.list_orders_for_user(user).await.unwrap();
        assert_eq!(orders.len(), 2);
        // Newest first.
        assert_eq!(orders[0].id, second.id);

        let other = store.list_orders_for_user(UserId::new()).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn order_items_scoped_to_their_order() {
        let store = InMemoryStorage::new();
        let order_a = OrderId::new();
        let order_b = OrderId::new();

        let items = vec![
            OrderItem::new(order_a, ProductId::new(), 2, Money::from_cents(100)),
            OrderItem::new(order_a, ProductId::new(), 1, Money::from_cents(300)),
            OrderItem::new(order_b, ProductId::new(), 4, Money::from_cents(50)),
        ];
        store.insert_order_items(&items).await.unwrap();

        assert_eq!(store.get_order_items(order_a).await.unwrap().len(), 2);

        let deleted = store.delete_order_items(order_a).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.get_order_items(order_b).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_status_on_missing_order_affects_no_rows() {
        let store = InMemoryStorage::new();
        let affected = store
            .update_order_status(OrderId::new(), OrderStatus::Paid)
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }

    #[tokio::test]
    async fn saved_cart_is_replaced_not_merged() {
        let store = InMemoryStorage::new();
        let user = UserId::new();
        let product = Product::new("Widget", Money::from_cents(500), 10);

        store
            .save_cart(user, &[CartLine::for_product(&product, 2)])
            .await
            .unwrap();
        store
            .save_cart(user, &[CartLine::for_product(&product, 7)])
            .await
            .unwrap();

        let lines = store.load_cart(user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 7);

        let removed = store.clear_cart(user).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.load_cart(user).await.unwrap().is_empty());
    }
}
