//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p storage --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use common::{Money, OrderId, UserId};
use sqlx::PgPool;
use storage::{
    CartLine, CartStore, Order, OrderItem, OrderStatus, OrderStore, PostgresStorage, Product,
    ProductStore, StorageError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_storefront_tables.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStorage {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE order_items, orders, cart_items, products")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStorage::new(pool)
}

fn widget(quantity: u32) -> Product {
    Product::new("Widget", Money::from_cents(1000), quantity)
}

#[tokio::test]
async fn insert_and_fetch_product() {
    let store = get_test_store().await;
    let mut product = widget(7);
    product.image = Some("/img/widget.png".to_string());

    store.insert_product(&product).await.unwrap();

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched, product);

    let listed = store.list_products().await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn missing_product_is_none() {
    let store = get_test_store().await;
    let product = widget(1);

    let fetched = store.get_product(product.id).await.unwrap();
    assert!(fetched.is_none());
}

#[tokio::test]
async fn decrement_clamps_at_zero() {
    let store = get_test_store().await;
    let product = widget(3);
    store.insert_product(&product).await.unwrap();

    store.decrement_stock(product.id, 10).await.unwrap();

    assert_eq!(store.available_quantity(product.id).await.unwrap(), 0);
}

#[tokio::test]
async fn decrement_and_increment_round_trip() {
    let store = get_test_store().await;
    let product = widget(5);
    store.insert_product(&product).await.unwrap();

    store.decrement_stock(product.id, 2).await.unwrap();
    assert_eq!(store.available_quantity(product.id).await.unwrap(), 3);

    store.increment_stock(product.id, 4).await.unwrap();
    assert_eq!(store.available_quantity(product.id).await.unwrap(), 7);
}

#[tokio::test]
async fn decrement_zero_is_rejected() {
    let store = get_test_store().await;
    let product = widget(5);
    store.insert_product(&product).await.unwrap();

    let result = store.decrement_stock(product.id, 0).await;
    assert!(matches!(result, Err(StorageError::InvalidAmount)));
    assert_eq!(store.available_quantity(product.id).await.unwrap(), 5);
}

#[tokio::test]
async fn decrement_missing_product_is_not_found() {
    let store = get_test_store().await;
    let product = widget(5);

    let result = store.decrement_stock(product.id, 1).await;
    assert!(matches!(result, Err(StorageError::ProductNotFound(_))));
}

#[tokio::test]
async fn order_with_items_round_trip() {
    let store = get_test_store().await;
    let product_a = widget(10);
    let product_b = Product::new("Gadget", Money::from_cents(2500), 10);
    store.insert_product(&product_a).await.unwrap();
    store.insert_product(&product_b).await.unwrap();

    let user_id = UserId::new();
    let order = Order::new(user_id, Money::from_cents(4500));
    store.insert_order(&order).await.unwrap();

    let items = vec![
        OrderItem::new(order.id, product_a.id, 2, product_a.price),
        OrderItem::new(order.id, product_b.id, 1, product_b.price),
    ];
    store.insert_order_items(&items).await.unwrap();

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, order.id);
    assert_eq!(fetched.user_id, user_id);
    assert_eq!(fetched.total, Money::from_cents(4500));
    assert_eq!(fetched.status, OrderStatus::Pending);

    let fetched_items = store.get_order_items(order.id).await.unwrap();
    assert_eq!(fetched_items.len(), 2);
    let total: Money = fetched_items.iter().map(|i| i.subtotal()).sum();
    assert_eq!(total, Money::from_cents(4500));
}

#[tokio::test]
async fn listing_scopes_orders_by_user() {
    let store = get_test_store().await;
    let alice = UserId::new();
    let bob = UserId::new();

    for user in [alice, alice, bob] {
        let order = Order::new(user, Money::from_cents(100));
        store.insert_order(&order).await.unwrap();
    }

    assert_eq!(store.list_orders().await.unwrap().len(), 3);
    assert_eq!(store.list_orders_for_user(alice).await.unwrap().len(), 2);
    assert_eq!(store.list_orders_for_user(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_status_reports_affected_rows() {
    let store = get_test_store().await;
    let order = Order::new(UserId::new(), Money::from_cents(100));
    store.insert_order(&order).await.unwrap();

    let affected = store
        .update_order_status(order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let fetched = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, OrderStatus::Shipped);

    let missing = store
        .update_order_status(OrderId::new(), OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(missing, 0);
}

#[tokio::test]
async fn delete_order_removes_items_first() {
    let store = get_test_store().await;
    let product = widget(10);
    store.insert_product(&product).await.unwrap();

    let order = Order::new(UserId::new(), Money::from_cents(2000));
    store.insert_order(&order).await.unwrap();
    store
        .insert_order_items(&[OrderItem::new(order.id, product.id, 2, product.price)])
        .await
        .unwrap();

    // Items reference the order row, so they go first.
    assert_eq!(store.delete_order_items(order.id).await.unwrap(), 1);
    assert_eq!(store.delete_order(order.id).await.unwrap(), 1);
    assert!(store.get_order(order.id).await.unwrap().is_none());
}

#[tokio::test]
async fn cart_save_replaces_previous_contents() {
    let store = get_test_store().await;
    let user_id = UserId::new();
    let product_a = widget(10);
    let product_b = Product::new("Gadget", Money::from_cents(2500), 10);

    store
        .save_cart(user_id, &[CartLine::for_product(&product_a, 2)])
        .await
        .unwrap();
    store
        .save_cart(user_id, &[CartLine::for_product(&product_b, 1)])
        .await
        .unwrap();

    let lines = store.load_cart(user_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, product_b.id);
    assert_eq!(lines[0].quantity, 1);
}

#[tokio::test]
async fn cart_clear_and_empty_load() {
    let store = get_test_store().await;
    let user_id = UserId::new();
    let product = widget(10);

    assert!(store.load_cart(user_id).await.unwrap().is_empty());

    store
        .save_cart(user_id, &[CartLine::for_product(&product, 3)])
        .await
        .unwrap();
    assert_eq!(store.clear_cart(user_id).await.unwrap(), 1);
    assert!(store.load_cart(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn cart_line_preserves_snapshot_fields() {
    let store = get_test_store().await;
    let user_id = UserId::new();
    let mut product = widget(10);
    product.image = Some("/img/widget.png".to_string());

    store
        .save_cart(user_id, &[CartLine::for_product(&product, 2)])
        .await
        .unwrap();

    // Snapshot fields survive even though the product row never existed.
    let lines = store.load_cart(user_id).await.unwrap();
    assert_eq!(lines[0].product_name, "Widget");
    assert_eq!(lines[0].unit_price, Money::from_cents(1000));
    assert_eq!(lines[0].image.as_deref(), Some("/img/widget.png"));
}

#[tokio::test]
async fn update_and_delete_product() {
    let store = get_test_store().await;
    let mut product = widget(5);
    store.insert_product(&product).await.unwrap();

    product.name = "Widget Pro".to_string();
    product.price = Money::from_cents(1500);
    assert_eq!(store.update_product(&product).await.unwrap(), 1);

    let fetched = store.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Widget Pro");
    assert_eq!(fetched.price, Money::from_cents(1500));

    assert_eq!(store.delete_product(product.id).await.unwrap(), 1);
    assert!(store.get_product(product.id).await.unwrap().is_none());
}
