//! # Domain Types
//!
//! Core domain types used throughout Storebill.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐          │
//! │  │    Product     │   │    Invoice     │   │     Ledger     │          │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │          │
//! │  │  id (i64)      │   │  id (i64)      │   │  id (i64)      │          │
//! │  │  barcode (biz) │   │  invoice_number│   │  name (unique) │          │
//! │  │  price/cost    │   │  totals        │   │                │          │
//! │  │  stock         │   │  discount      │   │  LedgerEntry ×N│          │
//! │  └────────────────┘   └───────┬────────┘   └────────────────┘          │
//! │                               │                                         │
//! │                        InvoiceItem ×N  (sale-time snapshot)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Row-backed entities carry a database id (i64, autoincrement) plus a
//! business identifier where one exists: `barcode` for products, `phone`
//! for customers, `invoice_number` for invoices, `name` for ledgers.
//!
//! ## Money Representation
//! Amounts are `f64` to match the REAL columns they are stored in. Nothing
//! rounds until display; equality in tests uses a 1e-6 tolerance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Product
// =============================================================================

/// A catalog product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Database id (autoincrement).
    pub id: i64,

    /// Display name shown in the catalog and on invoices.
    pub name: String,

    /// Free-text category.
    pub category: Option<String>,

    /// Selling price per unit.
    pub price: f64,

    /// Purchase cost per unit (for profit calculations).
    pub cost_price: f64,

    /// Units on hand. Decremented by checkout, never auto-replenished.
    pub stock: i64,

    /// Tax rate in percent (18 by default).
    pub tax_rate: f64,

    /// Barcode - unique business identifier when present.
    pub barcode: Option<String>,

    /// Optional description.
    pub description: Option<String>,
}

impl Product {
    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// True when stock has fallen below the low-stock reporting threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock < crate::LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer.
///
/// Customers are created explicitly from the registry, or implicitly by
/// checkout when an invoice references a phone number not yet on file.
/// The phone number is the identity key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Unique identity key; customers without a phone are never created
    /// implicitly.
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Lifetime purchase aggregate, maintained by checkout.
    pub total_purchases: f64,
    /// Date of the most recent invoice, maintained by checkout.
    pub last_visit: Option<NaiveDate>,
}

// =============================================================================
// Invoice
// =============================================================================

/// A persisted invoice. Immutable once created except by explicit delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: i64,
    /// Unique 8-character uppercase hex token.
    pub invoice_number: String,
    pub date: NaiveDate,
    /// Null for anonymous sales (no phone number given).
    pub customer_id: Option<i64>,
    pub subtotal: f64,
    pub discount_name: String,
    pub discount_percent: f64,
    pub tax: f64,
    pub total: f64,
}

impl Invoice {
    /// The discount amount implied by the persisted subtotal and percent.
    #[inline]
    pub fn discount_amount(&self) -> f64 {
        self.subtotal * self.discount_percent / 100.0
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line item of a saved invoice.
///
/// Uses the snapshot pattern: price, cost and tax rate are copied from the
/// product at sale time, so historical invoices are decoupled from later
/// catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub price: f64,
    /// Unit cost at time of sale (frozen).
    pub cost_price: f64,
    /// Tax rate in percent at time of sale (frozen).
    pub tax_rate: f64,
}

impl InvoiceItem {
    /// Line total before tax (price × quantity).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// A named freeform account, independent of the invoice system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Ledger {
    pub id: i64,
    pub name: String,
}

/// A dated line item within a ledger.
///
/// ## Invariant
/// `remaining == bill_amount - paid`, recomputed on every edit. The
/// balance is per-entry; there is no running balance across entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub id: i64,
    pub ledger_id: i64,
    pub entry_date: NaiveDate,
    pub particulars: String,
    pub bill_amount: f64,
    pub paid: f64,
    pub remaining: f64,
}

/// Computes the per-entry balance: bill minus paid.
#[inline]
pub fn ledger_balance(bill_amount: f64, paid: f64) -> f64 {
    bill_amount - paid
}

/// The editable fields of a ledger entry.
///
/// Entries are addressed by their primary key, never by row position in a
/// sorted view - two entries sharing a date must stay distinguishable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryPatch {
    pub entry_date: NaiveDate,
    pub particulars: String,
    pub bill_amount: f64,
    pub paid: f64,
}

// =============================================================================
// Store Profile
// =============================================================================

/// Store identity assembled from the settings table.
///
/// Rendered on invoice headers and footers; edited from the settings tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreProfile {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
