//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with validation at the door
//! - Barcode lookup (the scan path on the billing tab)
//! - Substring search across name, category and barcode
//! - Low-stock listing for the dashboard
//!
//! ## Stock Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Who Touches Stock                                   │
//! │                                                                         │
//! │  update()        → absolute value, from the catalog edit form           │
//! │  restock()       → positive delta, from goods-received                  │
//! │  checkout        → guarded decrement (stock >= qty), never here         │
//! │                                                                         │
//! │  The checkout decrement lives in checkout.rs because it must run        │
//! │  inside the invoice transaction.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storebill_core::validation::validate_product;
use storebill_core::Product;

const PRODUCT_COLUMNS: &str =
    "id, name, category, price, cost_price, stock, tax_rate, barcode, description";

/// The editable fields of a product, used for create and update.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub cost_price: f64,
    pub stock: i64,
    pub tax_rate: f64,
    pub barcode: Option<String>,
    pub description: Option<String>,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search("shirt").await?;
/// let product = repo.get(42).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product and returns the stored row.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the barcode is already taken
    /// - `Validation` when input validation fails
    pub async fn create(&self, input: ProductInput) -> DbResult<Product> {
        validate_product(
            &input.name,
            input.price,
            input.cost_price,
            input.stock,
            input.tax_rate,
        )?;

        debug!(name = %input.name, "Creating product");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, category, price, cost_price, stock, tax_rate, barcode, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id",
        )
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.stock)
        .bind(input.tax_rate)
        .bind(&input.barcode)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Finds a product by barcode; None when no product carries it.
    pub async fn find_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// Searches products by substring across name, category and barcode.
    ///
    /// An empty query returns the full catalog.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE name LIKE ?1 OR category LIKE ?1 OR barcode LIKE ?1
             ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Updates every editable field of a product.
    pub async fn update(&self, id: i64, input: ProductInput) -> DbResult<Product> {
        validate_product(
            &input.name,
            input.price,
            input.cost_price,
            input.stock,
            input.tax_rate,
        )?;

        let result = sqlx::query(
            "UPDATE products
             SET name = ?1, category = ?2, price = ?3, cost_price = ?4,
                 stock = ?5, tax_rate = ?6, barcode = ?7, description = ?8
             WHERE id = ?9",
        )
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.price)
        .bind(input.cost_price)
        .bind(input.stock)
        .bind(input.tax_rate)
        .bind(&input.barcode)
        .bind(&input.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        self.get(id).await
    }

    /// Adds received stock to a product.
    pub async fn restock(&self, id: i64, quantity: i64) -> DbResult<Product> {
        if quantity <= 0 {
            return Err(DbError::QueryFailed(
                "restock quantity must be positive".to_string(),
            ));
        }

        let result = sqlx::query("UPDATE products SET stock = stock + ?1 WHERE id = ?2")
            .bind(quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        self.get(id).await
    }

    /// Deletes a product.
    ///
    /// Historical invoice items keep their snapshot of the product, so
    /// deleting a catalog row never alters past invoices.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Lists products whose stock is below the low-stock threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < ?1 ORDER BY stock, name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(storebill_core::LOW_STOCK_THRESHOLD)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn shirt() -> ProductInput {
        ProductInput {
            name: "Linen Shirt".to_string(),
            category: Some("Tops".to_string()),
            price: 49.0,
            cost_price: 22.0,
            stock: 15,
            tax_rate: 18.0,
            barcode: Some("8901234567890".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo.create(shirt()).await.unwrap();
        assert!(product.id > 0);
        assert_eq!(product.name, "Linen Shirt");
        assert_eq!(product.stock, 15);

        let fetched = repo.get(product.id).await.unwrap();
        assert_eq!(fetched.barcode.as_deref(), Some("8901234567890"));
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.create(shirt()).await.unwrap();

        let mut dup = shirt();
        dup.name = "Other Shirt".to_string();
        let err = repo.create(dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_two_products_without_barcode_allowed() {
        // UNIQUE in SQLite ignores NULLs, so barcode-less products coexist.
        let db = test_db().await;
        let repo = db.products();

        let mut a = shirt();
        a.barcode = None;
        let mut b = shirt();
        b.name = "Plain Tee".to_string();
        b.barcode = None;

        repo.create(a).await.unwrap();
        repo.create(b).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_matches_name_and_barcode() {
        let db = test_db().await;
        let repo = db.products();
        repo.create(shirt()).await.unwrap();

        assert_eq!(repo.search("linen").await.unwrap().len(), 1);
        assert_eq!(repo.search("890123").await.unwrap().len(), 1);
        assert_eq!(repo.search("trousers").await.unwrap().len(), 0);
        // Empty query lists everything
        assert_eq!(repo.search("  ").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.products();
        let product = repo.create(shirt()).await.unwrap();

        let mut edit = shirt();
        edit.price = 39.0;
        edit.stock = 8;
        let updated = repo.update(product.id, edit).await.unwrap();
        assert!((updated.price - 39.0).abs() < 1e-6);
        assert!(updated.is_low_stock());

        repo.delete(product.id).await.unwrap();
        assert!(matches!(
            repo.get(product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let db = test_db().await;
        let err = db.products().update(999, shirt()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation_rejected_at_create() {
        let db = test_db().await;
        let mut bad = shirt();
        bad.price = -5.0;

        // Surfaces as a typed validation error, not a storage failure.
        let err = db.products().create(bad).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert!(err.to_string().contains("price"));
    }

    #[tokio::test]
    async fn test_restock_and_low_stock() {
        let db = test_db().await;
        let repo = db.products();
        let mut input = shirt();
        input.stock = 3;
        let product = repo.create(input).await.unwrap();

        assert_eq!(repo.low_stock().await.unwrap().len(), 1);

        let restocked = repo.restock(product.id, 20).await.unwrap();
        assert_eq!(restocked.stock, 23);
        assert!(repo.low_stock().await.unwrap().is_empty());

        assert!(repo.restock(product.id, 0).await.is_err());
    }
}
