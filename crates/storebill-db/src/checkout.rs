//! # Checkout
//!
//! The transaction that turns a cart into a persisted invoice.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Transaction                               │
//! │                                                                         │
//! │  checkout(request)                                                      │
//! │       │                                                                 │
//! │       ├── cart empty? ──► Err(EmptyCart), nothing written               │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  1. Resolve customer by phone (create "Walk-in" row if new)             │
//! │  2. Generate invoice number, re-roll on collision                       │
//! │  3. INSERT invoice header (totals from the cart fold)                   │
//! │  4. For each line:                                                      │
//! │       UPDATE products SET stock = stock - qty                           │
//! │         WHERE id = ? AND stock >= qty   ← the guard                     │
//! │       0 rows? ──► Err(InsufficientStock), ROLLBACK                      │
//! │       INSERT invoice_items snapshot (price, cost, tax frozen)           │
//! │  5. UPDATE customer aggregates (total_purchases, last_visit)            │
//! │       ▼  COMMIT                                                         │
//! │                                                                         │
//! │  All-or-nothing: a failure at any step leaves stock, customers and      │
//! │  invoices exactly as they were.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Guard
//! The decrement is guarded in SQL (`AND stock >= qty`) rather than by a
//! read-then-write in Rust, so concurrent checkouts can never drive stock
//! negative: whichever transaction runs second sees the reduced stock.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use storebill_core::{Cart, CoreError, Discount, Invoice, INVOICE_NUMBER_LEN, WALK_IN_NAME};

/// Attempts before giving up on invoice-number generation. With 16^8
/// values a second collision in a row has never been observed; the bound
/// exists so a corrupted table can't loop forever.
const MAX_NUMBER_ATTEMPTS: u32 = 5;

// =============================================================================
// Request and Error Types
// =============================================================================

/// Everything checkout needs to persist one sale.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub cart: Cart,
    pub discount: Discount,
    /// Customer name for a newly created customer; ignored when the phone
    /// is already on file. Defaults to "Walk-in".
    pub customer_name: Option<String>,
    /// Customer phone; None makes the sale anonymous.
    pub customer_phone: Option<String>,
    /// Invoice date (normally today).
    pub date: NaiveDate,
}

/// Checkout failures: business rule violations or database errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// Ran out of invoice-number attempts.
    #[error("Could not generate a unique invoice number")]
    NumberExhausted,
}

// =============================================================================
// Checkout Implementation
// =============================================================================

impl Database {
    /// Persists a cart as an invoice, atomically.
    ///
    /// ## Returns
    /// The stored invoice header, including its generated number.
    ///
    /// ## Errors
    /// - `CoreError::EmptyCart` - cart has no lines, nothing is written
    /// - `CoreError::InsufficientStock` - a line exceeds stock; rolled back
    /// - `CheckoutError::Db` - any storage failure; rolled back
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<Invoice, CheckoutError> {
        if request.cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let totals = request.cart.totals(&request.discount);

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // ---------------------------------------------------------------------
        // 1. Resolve or create the customer
        // ---------------------------------------------------------------------
        let phone = request
            .customer_phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let customer_id: Option<i64> = match phone {
            None => None,
            Some(phone) => {
                let existing: Option<i64> =
                    sqlx::query_scalar("SELECT id FROM customers WHERE phone = ?1")
                        .bind(phone)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(DbError::from)?;

                match existing {
                    Some(id) => Some(id),
                    None => {
                        let name = request
                            .customer_name
                            .as_deref()
                            .map(str::trim)
                            .filter(|n| !n.is_empty())
                            .unwrap_or(WALK_IN_NAME);

                        let id: i64 = sqlx::query_scalar(
                            "INSERT INTO customers (name, phone) VALUES (?1, ?2) RETURNING id",
                        )
                        .bind(name)
                        .bind(phone)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(DbError::from)?;

                        info!(customer_id = id, "Created customer during checkout");
                        Some(id)
                    }
                }
            }
        };

        // ---------------------------------------------------------------------
        // 2. Generate a collision-checked invoice number
        // ---------------------------------------------------------------------
        let invoice_number = {
            let mut number = None;
            for attempt in 0..MAX_NUMBER_ATTEMPTS {
                let candidate = generate_invoice_number();
                let taken: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM invoices WHERE invoice_number = ?1",
                )
                .bind(&candidate)
                .fetch_one(&mut *tx)
                .await
                .map_err(DbError::from)?;

                if taken == 0 {
                    number = Some(candidate);
                    break;
                }
                warn!(attempt, candidate = %candidate, "Invoice number collision");
            }
            number.ok_or(CheckoutError::NumberExhausted)?
        };

        // ---------------------------------------------------------------------
        // 3. Insert the invoice header
        // ---------------------------------------------------------------------
        let invoice_id: i64 = sqlx::query_scalar(
            "INSERT INTO invoices
                (invoice_number, date, customer_id, subtotal, discount_name, discount_percent, tax, total)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id",
        )
        .bind(&invoice_number)
        .bind(request.date.to_string())
        .bind(customer_id)
        .bind(totals.subtotal)
        .bind(&request.discount.name)
        .bind(request.discount.percent)
        .bind(totals.tax)
        .bind(totals.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(DbError::from)?;

        // ---------------------------------------------------------------------
        // 4. Decrement stock (guarded) and snapshot the lines
        // ---------------------------------------------------------------------
        for line in request.cart.lines() {
            let updated = sqlx::query(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(line.quantity)
            .bind(line.product_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if updated.rows_affected() == 0 {
                // Fetch the live stock for the error message; dropping the
                // transaction rolls back everything written above.
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                        .bind(line.product_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(DbError::from)?;

                let err = match available {
                    Some(stock) => CoreError::InsufficientStock {
                        name: line.name.clone(),
                        available: stock,
                        requested: line.quantity,
                    }
                    .into(),
                    None => DbError::not_found("Product", line.product_id).into(),
                };
                return Err(err);
            }

            sqlx::query(
                "INSERT INTO invoice_items
                    (invoice_id, product_id, quantity, price, cost_price, tax_rate)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(invoice_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.cost_price)
            .bind(line.tax_rate_percent)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        // ---------------------------------------------------------------------
        // 5. Update customer aggregates
        // ---------------------------------------------------------------------
        if let Some(customer_id) = customer_id {
            sqlx::query(
                "UPDATE customers
                 SET total_purchases = total_purchases + ?1, last_visit = ?2
                 WHERE id = ?3",
            )
            .bind(totals.total)
            .bind(request.date.to_string())
            .bind(customer_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            invoice_number = %invoice_number,
            total = totals.total,
            lines = request.cart.line_count(),
            "Invoice saved"
        );

        Ok(self.invoices().get(invoice_id).await?)
    }
}

/// Generates an 8-character uppercase hex invoice number.
fn generate_invoice_number() -> String {
    Uuid::new_v4().simple().to_string()[..INVOICE_NUMBER_LEN].to_uppercase()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::repository::product::ProductInput;
    use storebill_core::CartLine;

    const EPS: f64 = 1e-6;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn catalog_product(db: &Database, price: f64, cost: f64, stock: i64) -> i64 {
        db.products()
            .create(ProductInput {
                name: "Denim Jacket".to_string(),
                price,
                cost_price: cost,
                stock,
                tax_rate: 18.0,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    fn request(cart: Cart, discount: Discount, phone: Option<&str>) -> CheckoutRequest {
        CheckoutRequest {
            cart,
            discount,
            customer_name: None,
            customer_phone: phone.map(|p| p.to_string()),
            date: d("2026-08-25"),
        }
    }

    #[tokio::test]
    async fn test_checkout_persists_totals() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 100.0, 60.0, 10).await;
        let product = db.products().get(product_id).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 2)).unwrap();

        let invoice = db
            .checkout(&request(
                cart,
                Discount::percent("Festival", 10.0).unwrap(),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(invoice.invoice_number.len(), INVOICE_NUMBER_LEN);
        assert!((invoice.subtotal - 200.0).abs() < EPS);
        assert!((invoice.tax - 36.0).abs() < EPS);
        assert!((invoice.total - 216.0).abs() < EPS);
        assert!((invoice.discount_amount() - 20.0).abs() < EPS);

        // Stock decremented, snapshot written
        assert_eq!(db.products().get(product_id).await.unwrap().stock, 8);
        let items = db.invoices().items(invoice.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert!((items[0].cost_price - 60.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let db = test_db().await;

        let err = db
            .checkout(&request(Cart::new(), Discount::none(), Some("555")))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Core(CoreError::EmptyCart)));

        // No implicit customer, no invoices
        assert!(db.customers().find_by_phone("555").await.unwrap().is_none());
        assert_eq!(db.reports().customer_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 50.0, 20.0, 3).await;
        let product = db.products().get(product_id).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 5)).unwrap();

        let err = db
            .checkout(&request(cart, Discount::none(), Some("777")))
            .await
            .unwrap_err();

        match err {
            CheckoutError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Everything rolled back, including the implicitly created customer
        assert_eq!(db.products().get(product_id).await.unwrap().stock, 3);
        assert!(db.customers().find_by_phone("777").await.unwrap().is_none());
        assert!(db
            .invoices()
            .list(&Default::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_selling_exact_stock_reaches_zero() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 10.0, 5.0, 4).await;
        let product = db.products().get(product_id).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 4)).unwrap();

        db.checkout(&request(cart, Discount::none(), None))
            .await
            .unwrap();
        assert_eq!(db.products().get(product_id).await.unwrap().stock, 0);
    }

    #[tokio::test]
    async fn test_multi_line_cart_decrements_each_product() {
        let db = test_db().await;
        let products = db.products();

        let jacket = products
            .create(ProductInput {
                name: "Denim Jacket".to_string(),
                price: 120.0,
                cost_price: 70.0,
                stock: 10,
                tax_rate: 18.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let tee = products
            .create(ProductInput {
                name: "Plain Tee".to_string(),
                price: 15.0,
                cost_price: 6.0,
                stock: 8,
                tax_rate: 18.0,
                ..Default::default()
            })
            .await
            .unwrap();
        let scarf = products
            .create(ProductInput {
                name: "Wool Scarf".to_string(),
                price: 25.0,
                cost_price: 12.0,
                stock: 5,
                tax_rate: 18.0,
                ..Default::default()
            })
            .await
            .unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&jacket, 2)).unwrap();
        cart.add_line(CartLine::from_product(&tee, 3)).unwrap();

        let invoice = db
            .checkout(&request(cart, Discount::none(), None))
            .await
            .unwrap();

        // Each sold product drops by exactly its line quantity.
        assert_eq!(products.get(jacket.id).await.unwrap().stock, 8);
        assert_eq!(products.get(tee.id).await.unwrap().stock, 5);
        // A product outside the cart keeps its stock.
        assert_eq!(products.get(scarf.id).await.unwrap().stock, 5);

        let items = db.invoices().items(invoice.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!((invoice.subtotal - 285.0).abs() < EPS);
    }

    #[tokio::test]
    async fn test_new_phone_creates_walk_in_customer() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 30.0, 15.0, 10).await;
        let product = db.products().get(product_id).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 1)).unwrap();

        let invoice = db
            .checkout(&request(cart, Discount::none(), Some("9876500000")))
            .await
            .unwrap();

        let customer = db
            .customers()
            .find_by_phone("9876500000")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.name, WALK_IN_NAME);
        assert_eq!(invoice.customer_id, Some(customer.id));
        assert!((customer.total_purchases - invoice.total).abs() < EPS);
        assert_eq!(customer.last_visit, Some(d("2026-08-25")));
    }

    #[tokio::test]
    async fn test_repeat_customer_aggregates_accumulate() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 100.0, 50.0, 10).await;

        for _ in 0..2 {
            let product = db.products().get(product_id).await.unwrap();
            let mut cart = Cart::new();
            cart.add_line(CartLine::from_product(&product, 1)).unwrap();
            db.checkout(&request(cart, Discount::none(), Some("424242")))
                .await
                .unwrap();
        }

        let customer = db
            .customers()
            .find_by_phone("424242")
            .await
            .unwrap()
            .unwrap();
        // Two sales of 100 + 18% tax each
        assert!((customer.total_purchases - 236.0).abs() < EPS);
        assert_eq!(db.reports().customer_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_anonymous_sale_has_no_customer() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 20.0, 10.0, 10).await;
        let product = db.products().get(product_id).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 1)).unwrap();

        // Whitespace-only phone counts as absent
        let mut req = request(cart, Discount::none(), Some("   "));
        req.customer_name = Some("Ignored".to_string());
        let invoice = db.checkout(&req).await.unwrap();

        assert_eq!(invoice.customer_id, None);
        assert_eq!(db.reports().customer_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_survives_catalog_edits() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 100.0, 60.0, 10).await;
        let product = db.products().get(product_id).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(CartLine::from_product(&product, 2)).unwrap();
        let saved = db
            .checkout(&request(cart, Discount::percent("Festival", 10.0).unwrap(), None))
            .await
            .unwrap();

        // Reprice the product after the sale
        let mut edit = crate::repository::product::ProductInput {
            name: product.name.clone(),
            price: 250.0,
            cost_price: 1.0,
            stock: 8,
            tax_rate: 5.0,
            ..Default::default()
        };
        edit.category = product.category.clone();
        db.products().update(product_id, edit).await.unwrap();

        // The stored invoice and its snapshots are untouched
        let reloaded = db
            .invoices()
            .find_by_number(&saved.invoice_number)
            .await
            .unwrap()
            .unwrap();
        assert!((reloaded.subtotal - 200.0).abs() < EPS);
        assert!((reloaded.total - 216.0).abs() < EPS);

        let items = db.invoices().items(reloaded.id).await.unwrap();
        assert!((items[0].price - 100.0).abs() < EPS);
        assert!((items[0].tax_rate - 18.0).abs() < EPS);

        let item_sum: f64 = items.iter().map(|i| i.line_total()).sum();
        assert!((item_sum - reloaded.subtotal).abs() < EPS);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_distinct() {
        let db = test_db().await;
        let product_id = catalog_product(&db, 5.0, 2.0, 100).await;

        let mut numbers = std::collections::HashSet::new();
        for _ in 0..10 {
            let product = db.products().get(product_id).await.unwrap();
            let mut cart = Cart::new();
            cart.add_line(CartLine::from_product(&product, 1)).unwrap();
            let invoice = db
                .checkout(&request(cart, Discount::none(), None))
                .await
                .unwrap();

            assert_eq!(invoice.invoice_number.len(), INVOICE_NUMBER_LEN);
            assert!(invoice
                .invoice_number
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(numbers.insert(invoice.invoice_number));
        }
    }

    #[test]
    fn test_generated_number_shape() {
        let number = generate_invoice_number();
        assert_eq!(number.len(), INVOICE_NUMBER_LEN);
        assert!(number.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(number, number.to_uppercase());
    }
}
