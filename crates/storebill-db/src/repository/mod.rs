//! # Repository Module
//!
//! One repository per table group, all backed by the shared pool.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Repository Layout                                  │
//! │                                                                         │
//! │  Database (pool.rs)                                                     │
//! │     ├── settings()  ──► SettingsRepository   (settings)                 │
//! │     ├── products()  ──► ProductRepository    (products)                 │
//! │     ├── customers() ──► CustomerRepository   (customers)                │
//! │     ├── invoices()  ──► InvoiceRepository    (invoices, invoice_items)  │
//! │     ├── ledgers()   ──► LedgerRepository     (ledgers, ledger_entries)  │
//! │     └── reports()   ──► ReportRepository     (read-only aggregates)     │
//! │                                                                         │
//! │  Repositories are cheap to construct (pool clone is an Arc bump) and    │
//! │  hold no state of their own.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod invoice;
pub mod ledger;
pub mod product;
pub mod report;
pub mod settings;
