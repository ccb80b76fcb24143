//! Domain layer for the storefront.
//!
//! The cart is an explicit value owned by its caller; there is no
//! ambient session-scoped mutable cart. Stock checks run at every cart
//! mutation for immediate feedback, and checkout re-validates
//! independently because cart state can go stale between an add and the
//! eventual purchase.

pub mod cart;
pub mod error;
pub mod identity;

pub use cart::{Cart, CartService, Fulfillment};
pub use common::{Money, OrderId, ProductId, UserId};
pub use error::CartError;
pub use identity::{CurrentUser, Role};
pub use storage::{CartLine, Order, OrderItem, OrderStatus, ParseOrderStatusError, Product};
