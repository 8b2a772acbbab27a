//! # storebill-core: Pure Business Logic for Storebill
//!
//! The heart of the billing system: every monetary rule lives here as a
//! pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storebill Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Desktop Shell (out of scope)                 │   │
//! │  │      Billing tab ──► Cart UI ──► History ──► Ledger             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ storebill-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐                 │   │
//! │  │   │   types   │  │   cart    │  │ validation │                 │   │
//! │  │   │  Product  │  │ CartLine  │  │   rules    │                 │   │
//! │  │   │  Invoice  │  │ CartTotals│  │   checks   │                 │   │
//! │  │   │  Ledger   │  │ Discount  │  │            │                 │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO PROCESS SPAWNS • PURE FUNCTIONS    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           storebill-db / storebill-pdf (I/O layers)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Invoice, Ledger, ...)
//! - [`cart`] - Cart lines and the invoice totals fold
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, filesystem, and subprocess access are FORBIDDEN
//! 3. **Explicit Errors**: all errors are typed, never strings or panics
//! 4. **f64 money**: amounts mirror the REAL columns they persist to; no
//!    intermediate rounding, display formatting is the caller's concern

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals, Discount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate (percent) applied to new products.
///
/// ## Why a constant?
/// The catalog schema defaults `tax_rate` to 18; the same default backs
/// product forms so a blank field and a fresh row agree.
pub const DEFAULT_TAX_RATE: f64 = 18.0;

/// Stock level below which a product counts as "low stock" in reports.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Customer name recorded when a phone number is given without a name.
pub const WALK_IN_NAME: &str = "Walk-in";

/// Length of the generated invoice-number token (uppercase hex chars).
pub const INVOICE_NUMBER_LEN: usize = 8;

/// Maximum quantity of a single line in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9999;
