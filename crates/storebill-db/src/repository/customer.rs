//! # Customer Repository
//!
//! Database operations for the customer registry.
//!
//! ## Identity
//! Phone number is the business key: checkout resolves customers by phone
//! and creates a "Walk-in" row when the phone is new. The registry here is
//! the explicit CRUD surface; the implicit creation path lives inside the
//! checkout transaction.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use storebill_core::validation::validate_name;
use storebill_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, total_purchases, last_visit";

/// The editable fields of a customer.
///
/// `total_purchases` and `last_visit` are maintained by checkout and are
/// deliberately not editable here.
#[derive(Debug, Clone, Default)]
pub struct CustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a customer and returns the stored row.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the phone number is already registered
    pub async fn create(&self, input: CustomerInput) -> DbResult<Customer> {
        validate_name("customer name", &input.name)?;

        debug!(name = %input.name, "Creating customer");

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customers (name, phone, email, address)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Gets a customer by id.
    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Finds a customer by phone number.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    /// Searches customers by substring across name and phone.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list().await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers
             WHERE name LIKE ?1 OR phone LIKE ?1
             ORDER BY name"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    /// Updates the editable fields of a customer.
    pub async fn update(&self, id: i64, input: CustomerInput) -> DbResult<Customer> {
        validate_name("customer name", &input.name)?;

        let result = sqlx::query(
            "UPDATE customers SET name = ?1, phone = ?2, email = ?3, address = ?4 WHERE id = ?5",
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        self.get(id).await
    }

    /// Deletes a customer.
    ///
    /// Invoices keep their `customer_id`; history lookups for a deleted
    /// customer simply render the sale as anonymous.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        Ok(())
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

    fn priya() -> CustomerInput {
        CustomerInput {
            name: "Priya Sharma".to_string(),
            phone: Some("9876543210".to_string()),
            email: Some("priya@example.com".to_string()),
            address: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_phone() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = repo.create(priya()).await.unwrap();
        assert_eq!(customer.total_purchases, 0.0);
        assert!(customer.last_visit.is_none());

        let found = repo.find_by_phone("9876543210").await.unwrap();
        assert_eq!(found.unwrap().id, customer.id);

        assert!(repo.find_by_phone("0000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create(priya()).await.unwrap();

        let mut dup = priya();
        dup.name = "Someone Else".to_string();
        assert!(matches!(
            repo.create(dup).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.customers();
        let customer = repo.create(priya()).await.unwrap();

        let mut edit = priya();
        edit.address = Some("42 Lake Road".to_string());
        let updated = repo.update(customer.id, edit).await.unwrap();
        assert_eq!(updated.address.as_deref(), Some("42 Lake Road"));

        repo.delete(customer.id).await.unwrap();
        assert!(matches!(
            repo.get(customer.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search() {
        let db = test_db().await;
        let repo = db.customers();
        repo.create(priya()).await.unwrap();

        assert_eq!(repo.search("priya").await.unwrap().len(), 1);
        assert_eq!(repo.search("98765").await.unwrap().len(), 1);
        assert_eq!(repo.search("nobody").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = test_db().await;
        let mut bad = priya();
        bad.name = "  ".to_string();
        assert!(matches!(
            db.customers().create(bad).await,
            Err(DbError::Validation(_))
        ));
    }
}
