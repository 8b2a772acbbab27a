//! # Report Repository
//!
//! Read-only aggregate queries backing the dashboard.
//!
//! ## Dashboard Tiles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dashboard Aggregates                                │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐                     │
//! │  │ Today Sales  │ │ Month Sales  │ │ Today Disc.  │                     │
//! │  │ Σ total      │ │ Σ total      │ │ Σ subtotal × │                     │
//! │  │ date = today │ │ date LIKE    │ │   percent/100│                     │
//! │  │              │ │ 'YYYY-MM%'   │ │ date = today │                     │
//! │  └──────────────┘ └──────────────┘ └──────────────┘                     │
//! │  ┌──────────────┐ ┌──────────────┐                                      │
//! │  │  Customers   │ │  Low Stock   │                                      │
//! │  │  COUNT(*)    │ │  stock < 10  │                                      │
//! │  └──────────────┘ └──────────────┘                                      │
//! │                                                                         │
//! │  All queries run against the same snapshot the history view sees; no    │
//! │  caching, SQLite is fast enough at this scale.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::DbResult;
use storebill_core::LOW_STOCK_THRESHOLD;

/// The aggregate numbers shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SalesSummary {
    pub today_sales: f64,
    pub month_sales: f64,
    pub today_discount: f64,
    pub customer_count: i64,
    pub low_stock_count: i64,
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Total invoiced amount for one date.
    pub async fn sales_for_date(&self, date: NaiveDate) -> DbResult<f64> {
        let total: f64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total), 0.0) FROM invoices WHERE date = ?1")
                .bind(date.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    /// Total invoiced amount for the calendar month containing `date`.
    ///
    /// Dates are stored as ISO-8601 TEXT, so a `YYYY-MM%` prefix match
    /// selects the month.
    pub async fn sales_for_month(&self, date: NaiveDate) -> DbResult<f64> {
        let prefix = format!("{}%", date.format("%Y-%m"));
        let total: f64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(total), 0.0) FROM invoices WHERE date LIKE ?1")
                .bind(prefix)
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    /// Total discount granted on one date.
    ///
    /// Derived from the persisted subtotal and percent rather than stored,
    /// so it always agrees with the invoices themselves.
    pub async fn discount_for_date(&self, date: NaiveDate) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(subtotal * discount_percent / 100.0), 0.0)
             FROM invoices WHERE date = ?1",
        )
        .bind(date.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Number of registered customers.
    pub async fn customer_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of products below the low-stock threshold.
    pub async fn low_stock_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock < ?1")
            .bind(LOW_STOCK_THRESHOLD)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Assembles the full dashboard for a reference date (normally today).
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<SalesSummary> {
        Ok(SalesSummary {
            today_sales: self.sales_for_date(today).await?,
            month_sales: self.sales_for_month(today).await?,
            today_discount: self.discount_for_date(today).await?,
            customer_count: self.customer_count().await?,
            low_stock_count: self.low_stock_count().await?,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
