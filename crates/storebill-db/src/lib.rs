//! # storebill-db: Database Layer for Storebill
//!
//! This crate provides database access for the Storebill billing system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storebill Data Flow                               │
//! │                                                                         │
//! │  UI action (save invoice, edit ledger entry, ...)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   storebill-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Checkout    │  │   │
//! │  │   │   (pool.rs)   │    │ settings      │    │ (checkout.rs)│  │   │
//! │  │   │               │    │ product       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ customer      │◄───│ cart ──►     │  │   │
//! │  │   │ Migrations    │    │ invoice       │    │   invoice    │  │   │
//! │  │   │ Seed defaults │    │ ledger/report │    │ transaction  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (store_pos.db, WAL mode)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (settings, product, ...)
//! - [`checkout`] - The cart-to-invoice transaction
//! - [`theme`] - OS dark-mode detection and resolution
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storebill_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("store_pos.db")).await?;
//!
//! let products = db.products().search("shirt").await?;
//! let invoice = db.checkout(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod theme;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{CheckoutError, CheckoutRequest};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::settings::SettingsRepository;
