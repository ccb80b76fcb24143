use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CartLine, CartStore, Money, Order, OrderId, OrderItem, OrderStatus, OrderStore, Product,
    ProductId, ProductStore, Result, StorageError, UserId,
};

/// PostgreSQL-backed storage implementation.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            image: row.try_get("image")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            total: Money::from_cents(row.try_get("total")?),
            status: status.parse::<OrderStatus>()?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_order_item(row: PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("price")?),
        })
    }

    fn row_to_cart_line(row: PgRow) -> Result<CartLine> {
        Ok(CartLine {
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            product_name: row.try_get("name")?,
            unit_price: Money::from_cents(row.try_get("price")?),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            image: row.try_get("image")?,
        })
    }
}

#[async_trait]
impl ProductStore for PostgresStorage {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, name, price, quantity, image FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows =
            sqlx::query("SELECT id, name, price, quantity, image FROM products ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn insert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            "INSERT INTO products (id, name, price, quantity, image) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.quantity as i32)
        .bind(&product.image)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE products SET name = $2, price = $3, quantity = $4, image = $5 WHERE id = $1",
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.quantity as i32)
        .bind(&product.image)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_product(&self, id: ProductId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn available_quantity(&self, id: ProductId) -> Result<u32> {
        let quantity: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        quantity
            .map(|q| q as u32)
            .ok_or(StorageError::ProductNotFound(id))
    }

    async fn decrement_stock(&self, id: ProductId, amount: u32) -> Result<u64> {
        if amount == 0 {
            return Err(StorageError::InvalidAmount);
        }

        // Single-statement update keeps the clamp atomic at the row level.
        let result =
            sqlx::query("UPDATE products SET quantity = GREATEST(quantity - $2, 0) WHERE id = $1")
                .bind(id.as_uuid())
                .bind(amount as i32)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ProductNotFound(id));
        }
        Ok(result.rows_affected())
    }

    async fn increment_stock(&self, id: ProductId, amount: u32) -> Result<u64> {
        if amount == 0 {
            return Err(StorageError::InvalidAmount);
        }

        let result = sqlx::query("UPDATE products SET quantity = quantity + $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(amount as i32)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::ProductNotFound(id));
        }
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OrderStore for PostgresStorage {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, total, status, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.total.cents())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_order_items(&self, items: &[OrderItem]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(item.order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row =
            sqlx::query("SELECT id, user_id, total, status, created_at FROM orders WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, user_id, total, status, created_at FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, user_id, total, status, created_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            "SELECT order_id, product_id, quantity, price FROM order_items WHERE order_id = $1",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order_item).collect()
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<u64> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_order_items(&self, order_id: OrderId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_order(&self, id: OrderId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CartStore for PostgresStorage {
    async fn load_cart(&self, user_id: UserId) -> Result<Vec<CartLine>> {
        let rows = sqlx::query(
            "SELECT product_id, name, price, quantity, image FROM cart_items WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_cart_line).collect()
    }

    async fn save_cart(&self, user_id: UserId, lines: &[CartLine]) -> Result<()> {
        // Replace-all: remove the previous mirror, then write the new lines.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO cart_items (user_id, product_id, name, price, quantity, image) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(user_id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(&line.product_name)
            .bind(line.unit_price.cents())
            .bind(line.quantity as i32)
            .bind(&line.image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
