//! # Invoice Repository
//!
//! Read and delete operations for saved invoices.
//!
//! ## Write Path
//! Invoices are only ever CREATED by the checkout transaction
//! (`checkout.rs`); this repository covers the history view: listing,
//! filtering, loading an invoice with its items, and deletion.
//!
//! ## History Filtering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    History Query Shapes                                 │
//! │                                                                         │
//! │  HistoryFilter { from, to, customer_id }                                │
//! │       │                                                                 │
//! │       ├── all None        → full history, newest first                  │
//! │       ├── from/to set     → date range (inclusive both ends)            │
//! │       └── customer_id set → one customer's invoices                     │
//! │                                                                         │
//! │  Ordering: date DESC, then id DESC so same-day invoices show in         │
//! │  reverse creation order.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use storebill_core::{Invoice, InvoiceItem};

const INVOICE_COLUMNS: &str =
    "id, invoice_number, date, customer_id, subtotal, discount_name, discount_percent, tax, total";

const ITEM_COLUMNS: &str = "id, invoice_id, product_id, quantity, price, cost_price, tax_rate";

/// Optional filters for the invoice history view.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Earliest date to include (inclusive).
    pub from: Option<NaiveDate>,
    /// Latest date to include (inclusive).
    pub to: Option<NaiveDate>,
    /// Restrict to a single customer.
    pub customer_id: Option<i64>,
}

/// An invoice header together with its line items.
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// One row of the history table: the invoice joined with its customer.
///
/// Anonymous sales show the invoice number in the customer column, which
/// keeps the history grid free of blanks.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub customer_name: String,
    pub total: f64,
}

const HISTORY_SELECT: &str = "SELECT i.id, i.invoice_number, i.date,
        COALESCE(c.name, i.invoice_number) AS customer_name, i.total
     FROM invoices i
     LEFT JOIN customers c ON c.id = i.customer_id";

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice header by id.
    pub async fn get(&self, id: i64) -> DbResult<Invoice> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");
        sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))
    }

    /// Finds an invoice by its printed number.
    pub async fn find_by_number(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    /// Loads the line items of an invoice, in insertion order.
    pub async fn items(&self, invoice_id: i64) -> DbResult<Vec<InvoiceItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ?1 ORDER BY id"
        );
        let items = sqlx::query_as::<_, InvoiceItem>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Loads an invoice with its items.
    pub async fn get_with_items(&self, id: i64) -> DbResult<InvoiceWithItems> {
        let invoice = self.get(id).await?;
        let items = self.items(id).await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoices for the history view, newest first.
    pub async fn list(&self, filter: &HistoryFilter) -> DbResult<Vec<Invoice>> {
        debug!(?filter, "Listing invoice history");

        // NULL-guarded predicates keep the statement shape fixed, so every
        // filter combination binds the same three parameters.
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices
             WHERE (?1 IS NULL OR date >= ?1)
               AND (?2 IS NULL OR date <= ?2)
               AND (?3 IS NULL OR customer_id = ?3)
             ORDER BY date DESC, id DESC"
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(filter.from.map(|d| d.to_string()))
            .bind(filter.to.map(|d| d.to_string()))
            .bind(filter.customer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(invoices)
    }

    /// Lists history rows with the customer name joined in, newest first.
    pub async fn history(&self) -> DbResult<Vec<HistoryRow>> {
        let sql = format!("{HISTORY_SELECT} ORDER BY i.date DESC, i.id DESC");
        let rows = sqlx::query_as::<_, HistoryRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Searches history by customer name or invoice number substring.
    pub async fn search_history(&self, query: &str) -> DbResult<Vec<HistoryRow>> {
        let query = query.trim();
        if query.is_empty() {
            return self.history().await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "{HISTORY_SELECT}
             WHERE c.name LIKE ?1 OR i.invoice_number LIKE ?1
             ORDER BY i.date DESC, i.id DESC"
        );
        let rows = sqlx::query_as::<_, HistoryRow>(&sql)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Deletes an invoice and its line items atomically.
    ///
    /// Stock is NOT restored: a deleted invoice is an erasure of the
    /// record, not a return of goods. Returns go through the catalog's
    /// restock path.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM invoice_items WHERE invoice_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // Dropping tx rolls back the item delete.
            return Err(DbError::not_found("Invoice", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutRequest;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductInput;
    use storebill_core::{Cart, CartLine, Discount};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn saved_invoice(db: &Database, date: NaiveDate, phone: Option<&str>) -> Invoice {
        let product = db
            .products()
            .create(ProductInput {
                name: "Wool Scarf".to_string(),
                price: 25.0,
                cost_price: 10.0,
                stock: 100,
                tax_rate: 18.0,
                ..Default::default()
            })
            .await
            .unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 2)).unwrap();

        db.checkout(&CheckoutRequest {
            cart,
            discount: Discount::none(),
            customer_name: None,
            customer_phone: phone.map(|p| p.to_string()),
            date,
        })
        .await
        .unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_with_items() {
        let db = test_db().await;
        let invoice = saved_invoice(&db, d("2026-08-25"), None).await;

        let loaded = db.invoices().get_with_items(invoice.id).await.unwrap();
        assert_eq!(loaded.invoice.invoice_number, invoice.invoice_number);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].quantity, 2);
        assert!((loaded.items[0].line_total() - 50.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_history_date_filter() {
        let db = test_db().await;
        saved_invoice(&db, d("2026-08-01"), None).await;
        saved_invoice(&db, d("2026-08-15"), None).await;
        saved_invoice(&db, d("2026-08-25"), None).await;

        let repo = db.invoices();

        let all = repo.list(&HistoryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].date, d("2026-08-25"));

        let mid = repo
            .list(&HistoryFilter {
                from: Some(d("2026-08-10")),
                to: Some(d("2026-08-20")),
                customer_id: None,
            })
            .await
            .unwrap();
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].date, d("2026-08-15"));
    }

    #[tokio::test]
    async fn test_history_customer_filter() {
        let db = test_db().await;
        saved_invoice(&db, d("2026-08-25"), Some("111")).await;
        saved_invoice(&db, d("2026-08-25"), None).await;

        let customer = db.customers().find_by_phone("111").await.unwrap().unwrap();
        let theirs = db
            .invoices()
            .list(&HistoryFilter {
                customer_id: Some(customer.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].customer_id, Some(customer.id));
    }

    #[tokio::test]
    async fn test_history_joins_customer_name() {
        let db = test_db().await;
        let named = saved_invoice(&db, d("2026-08-25"), Some("222")).await;
        let anonymous = saved_invoice(&db, d("2026-08-24"), None).await;

        let rows = db.invoices().history().await.unwrap();
        assert_eq!(rows.len(), 2);
        // Implicit checkout customers are created as walk-ins
        assert_eq!(rows[0].customer_name, "Walk-in");
        assert_eq!(rows[0].invoice_number, named.invoice_number);
        // Anonymous rows fall back to the invoice number
        assert_eq!(rows[1].customer_name, anonymous.invoice_number);
    }

    #[tokio::test]
    async fn test_history_search() {
        let db = test_db().await;
        let invoice = saved_invoice(&db, d("2026-08-25"), Some("333")).await;

        let repo = db.invoices();
        let by_number = repo
            .search_history(&invoice.invoice_number[..4])
            .await
            .unwrap();
        assert_eq!(by_number.len(), 1);

        let by_name = repo.search_history("walk").await.unwrap();
        assert_eq!(by_name.len(), 1);

        assert!(repo.search_history("zzz999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_items_too() {
        let db = test_db().await;
        let invoice = saved_invoice(&db, d("2026-08-25"), None).await;
        let repo = db.invoices();

        repo.delete(invoice.id).await.unwrap();

        assert!(matches!(
            repo.get(invoice.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(repo.items(invoice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_invoice() {
        let db = test_db().await;
        assert!(matches!(
            db.invoices().delete(12345).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
