//! # Cart Module
//!
//! The in-memory cart and the invoice totals fold.
//!
//! ## Totals Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      How Totals Are Computed                            │
//! │                                                                         │
//! │  CartLine { unit_price, cost_price, tax_rate_percent, quantity }        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal        = Σ(price × qty)                                       │
//! │  tax             = Σ(price × qty × rate / 100)   ← pre-discount amount  │
//! │  discount_amount = subtotal × percent / 100                             │
//! │  total           = subtotal − discount_amount + tax                     │
//! │  profit          = subtotal − discount_amount − Σ(cost × qty)           │
//! │                                                                         │
//! │  Tax is charged on the PRE-discount subtotal: the discount reduces      │
//! │  what the customer owes, not the taxable base. Profit excludes tax.     │
//! │  Nothing rounds here - formatting to two decimals is display-only.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storebill_core::{Cart, CartLine, Discount};
//!
//! let mut cart = Cart::new();
//! cart.add_line(CartLine::new(1, "Shirt", 100.0, 60.0, 18.0, 2)).unwrap();
//!
//! let totals = cart.totals(&Discount::percent("Summer", 10.0).unwrap());
//! assert!((totals.total - 216.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Product;
use crate::validation::{validate_discount_percent, validate_quantity};
use crate::MAX_LINE_QUANTITY;

// =============================================================================
// Cart Line
// =============================================================================

/// One prospective sale line: a product plus a quantity.
///
/// ## Design Notes
/// Price, cost and tax rate are frozen when the line is added. The cart
/// keeps displaying consistent numbers even if the catalog row is edited
/// while the sale is open, and checkout copies exactly these values into
/// the invoice items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Catalog product this line refers to.
    pub product_id: i64,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub unit_price: f64,

    /// Unit cost at time of adding (frozen).
    pub cost_price: f64,

    /// Tax rate in percent at time of adding (frozen).
    pub tax_rate_percent: f64,

    /// Units to sell.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a cart line from raw fields.
    pub fn new(
        product_id: i64,
        name: impl Into<String>,
        unit_price: f64,
        cost_price: f64,
        tax_rate_percent: f64,
        quantity: i64,
    ) -> Self {
        CartLine {
            product_id,
            name: name.into(),
            unit_price,
            cost_price,
            tax_rate_percent,
            quantity,
        }
    }

    /// Creates a cart line by freezing a catalog product's current values.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            cost_price: product.cost_price,
            tax_rate_percent: product.tax_rate,
            quantity,
        }
    }

    /// Line total before tax (price × quantity).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    /// Tax for this line, charged on the pre-discount line total.
    #[inline]
    pub fn line_tax(&self) -> f64 {
        self.line_total() * self.tax_rate_percent / 100.0
    }

    /// Cost of goods for this line (cost × quantity).
    #[inline]
    pub fn line_cost(&self) -> f64 {
        self.cost_price * self.quantity as f64
    }
}

// =============================================================================
// Discount
// =============================================================================

/// A named percentage discount applied to the whole cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Discount {
    /// Display label ("Summer Sale"); printed on the invoice when the
    /// percentage is non-zero.
    pub name: String,

    /// Percentage in [0, 100].
    pub percent: f64,
}

impl Discount {
    /// No discount.
    pub fn none() -> Self {
        Discount::default()
    }

    /// Creates a validated percentage discount.
    pub fn percent(name: impl Into<String>, percent: f64) -> CoreResult<Self> {
        validate_discount_percent(percent)?;
        Ok(Discount {
            name: name.into(),
            percent,
        })
    }

    /// The discount amount for a given subtotal.
    #[inline]
    pub fn amount_on(&self, subtotal: f64) -> f64 {
        subtotal * self.percent / 100.0
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The transient in-memory cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`; adding the same product again
///   increases the quantity of the existing line.
/// - Quantities are positive; setting a quantity to zero removes the line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Read access to the lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Adds a line, merging quantities if the product is already present.
    pub fn add_line(&mut self, line: CartLine) -> CoreResult<()> {
        validate_quantity(line.quantity)?;

        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == line.product_id)
        {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        self.lines.push(line);
        Ok(())
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id);
        }
        validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CoreError::LineNotFound(product_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by product id.
    pub fn remove_line(&mut self, product_id: i64) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CoreError::LineNotFound(product_id));
        }
        Ok(())
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Subtotal before discount and tax.
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Computes the full totals breakdown for a discount.
    pub fn totals(&self, discount: &Discount) -> CartTotals {
        let subtotal = self.subtotal();
        let tax: f64 = self.lines.iter().map(CartLine::line_tax).sum();
        let cost: f64 = self.lines.iter().map(CartLine::line_cost).sum();
        let discount_amount = discount.amount_on(subtotal);

        CartTotals {
            subtotal,
            discount_amount,
            tax,
            total: subtotal - discount_amount + tax,
            profit: subtotal - discount_amount - cost,
        }
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// The totals breakdown of a cart under a given discount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: f64,
    pub discount_amount: f64,
    pub tax: f64,
    pub total: f64,
    /// Margin after discount and cost of goods; tax excluded.
    pub profit: f64,
}

// =============================================================================
// Unit Tests
// =============================================================================
