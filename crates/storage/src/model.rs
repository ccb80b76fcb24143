//! Record types persisted by the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Money, OrderId, ProductId, UserId};

/// A product in the catalog.
///
/// `quantity` is the available stock counter owned by the stock ledger
/// operations; being unsigned, the never-negative invariant is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
    pub image: Option<String>,
}

impl Product {
    /// Creates a new product with a fresh id.
    pub fn new(name: impl Into<String>, price: Money, quantity: u32) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            price,
            quantity,
            image: None,
        }
    }

    /// Returns true if no stock is available.
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}

/// Status of an order.
///
/// A closed set: unknown strings are rejected at the parsing edge rather
/// than stored verbatim. `Pending` is the initial status of every order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting payment.
    #[default]
    Pending,

    /// Payment received.
    Paid,

    /// Order handed to the carrier.
    Shipped,

    /// Order cancelled by an administrator.
    Cancelled,
}

impl OrderStatus {
    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing a status string that is not in the closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0:?}")]
pub struct ParseOrderStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(ParseOrderStatusError(s.to_string())),
        }
    }
}

/// An order header.
///
/// `total` is computed once at checkout from the live prices captured
/// during validation and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order for a user.
    pub fn new(user_id: UserId, total: Money) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// A line item belonging to an order.
///
/// Quantity and unit price are purchase-time facts, decoupled from any
/// later change to the product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(order_id: OrderId, product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            order_id,
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns `unit_price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// One product entry in a cart.
///
/// Name, price, and image are snapshots taken when the line was first
/// added; `Cart::total` works over the snapshot price on purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub image: Option<String>,
}

impl CartLine {
    /// Creates a cart line snapshotting the product's name, price, and image.
    pub fn for_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
        }
    }

    /// Returns `unit_price × quantity` at the snapshot price.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
