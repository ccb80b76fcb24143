//! The shopping cart value and its stock-checked mutation service.

mod service;

pub use service::CartService;

use serde::{Deserialize, Serialize};

use common::{Money, ProductId};
use storage::CartLine;

use crate::error::CartError;

/// Outcome of a cart mutation that may be quantity-adjusted.
///
/// Partial fulfillment is a non-fatal condition: the mutation happened,
/// but with a smaller quantity than requested, and the caller should
/// tell the user about the adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fulfillment {
    /// The requested quantity was applied in full.
    Full,

    /// The requested quantity was reduced to the maximum available.
    Partial { requested: u32, fulfilled: u32 },
}

impl Fulfillment {
    /// Returns true if the quantity was adjusted down.
    pub fn is_partial(&self) -> bool {
        matches!(self, Fulfillment::Partial { .. })
    }
}

/// A shopping cart: a set of lines unique per product.
///
/// An explicit value passed into and out of operations; callers own the
/// lifecycle of whose cart this is. A line's quantity is always greater
/// than zero; a mutation that would leave it at zero removes the line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a cart from persisted lines.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Iterates over the lines.
    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Returns the quantity currently carried for a product (0 if absent).
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map(|l| l.quantity).unwrap_or(0)
    }

    /// Sum of `unit_price × quantity` over all lines.
    ///
    /// Uses the snapshot price stored in each line, not the live product
    /// price; checkout computes its own total from live prices.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Removes the line for a product.
    ///
    /// Fails with `LineNotFound` if the product is not in the cart;
    /// callers that want idempotent removal can ignore that error.
    pub fn remove(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound(product_id));
        }
        Ok(())
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub(crate) fn upsert_add(&mut self, line: CartLine) {
        match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            Some(existing) => existing.quantity += line.quantity,
            None => self.lines.push(line),
        }
    }

    pub(crate) fn set_quantity(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.lines.retain(|l| l.product_id != product_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }
}
