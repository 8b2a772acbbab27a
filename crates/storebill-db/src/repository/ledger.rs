//! # Ledger Repository
//!
//! Database operations for freeform ledgers and their entries.
//!
//! ## Entry Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Entry Addressing                                    │
//! │                                                                         │
//! │  Entries are edited and deleted BY PRIMARY KEY, never by position in    │
//! │  a sorted view. Two entries on the same date stay distinguishable no    │
//! │  matter how the list is ordered.                                        │
//! │                                                                         │
//! │  Display order: entry_date ASC, then id ASC (creation order breaks      │
//! │  same-day ties).                                                        │
//! │                                                                         │
//! │  remaining = bill_amount − paid, recomputed on every write. The         │
//! │  stored column exists so exports and reports never re-derive it.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use storebill_core::types::ledger_balance;
use storebill_core::validation::{validate_ledger_entry, validate_name};
use storebill_core::{Ledger, LedgerEntry, LedgerEntryPatch};

const ENTRY_COLUMNS: &str = "id, ledger_id, entry_date, particulars, bill_amount, paid, remaining";

/// Summed columns of one ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LedgerTotals {
    pub bill_amount: f64,
    pub paid: f64,
    pub remaining: f64,
}

/// Repository for ledger database operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Ledgers
    // =========================================================================

    /// Creates a named ledger.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the name is already taken
    pub async fn create(&self, name: &str) -> DbResult<Ledger> {
        validate_name("ledger name", name)?;

        debug!(name = %name, "Creating ledger");

        let id: i64 = sqlx::query_scalar("INSERT INTO ledgers (name) VALUES (?1) RETURNING id")
            .bind(name.trim())
            .fetch_one(&self.pool)
            .await?;

        self.get(id).await
    }

    /// Gets a ledger by id.
    pub async fn get(&self, id: i64) -> DbResult<Ledger> {
        sqlx::query_as::<_, Ledger>("SELECT id, name FROM ledgers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Ledger", id))
    }

    /// Finds a ledger by its unique name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Ledger>> {
        let ledger = sqlx::query_as::<_, Ledger>("SELECT id, name FROM ledgers WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ledger)
    }

    /// Lists all ledgers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Ledger>> {
        let ledgers = sqlx::query_as::<_, Ledger>("SELECT id, name FROM ledgers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(ledgers)
    }

    /// Renames a ledger.
    pub async fn rename(&self, id: i64, name: &str) -> DbResult<Ledger> {
        validate_name("ledger name", name)?;

        let result = sqlx::query("UPDATE ledgers SET name = ?1 WHERE id = ?2")
            .bind(name.trim())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ledger", id));
        }
        self.get(id).await
    }

    /// Deletes a ledger and all its entries atomically.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM ledger_entries WHERE ledger_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM ledgers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ledger", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(ledger_id = id, "Ledger deleted");
        Ok(())
    }

    // =========================================================================
    // Entries
    // =========================================================================

    /// Adds an entry to a ledger; `remaining` is computed here, never
    /// accepted from the caller.
    pub async fn add_entry(
        &self,
        ledger_id: i64,
        entry_date: NaiveDate,
        particulars: &str,
        bill_amount: f64,
        paid: f64,
    ) -> DbResult<LedgerEntry> {
        validate_ledger_entry(particulars, bill_amount, paid)?;

        // Fail fast with a typed error instead of an orphan row.
        self.get(ledger_id).await?;

        let remaining = ledger_balance(bill_amount, paid);

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO ledger_entries (ledger_id, entry_date, particulars, bill_amount, paid, remaining)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id",
        )
        .bind(ledger_id)
        .bind(entry_date.to_string())
        .bind(particulars)
        .bind(bill_amount)
        .bind(paid)
        .bind(remaining)
        .fetch_one(&self.pool)
        .await?;

        self.get_entry(id).await
    }

    /// Gets an entry by its primary key.
    pub async fn get_entry(&self, entry_id: i64) -> DbResult<LedgerEntry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE id = ?1");
        sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Ledger entry", entry_id))
    }

    /// Lists a ledger's entries, oldest first, same-day ties in creation
    /// order.
    pub async fn entries(&self, ledger_id: i64) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries
             WHERE ledger_id = ?1
             ORDER BY entry_date, id"
        );
        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(ledger_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Updates an entry in place, addressed by primary key. The stored
    /// `remaining` is recomputed from the new amounts.
    pub async fn update_entry(
        &self,
        entry_id: i64,
        patch: &LedgerEntryPatch,
    ) -> DbResult<LedgerEntry> {
        validate_ledger_entry(&patch.particulars, patch.bill_amount, patch.paid)?;

        let remaining = ledger_balance(patch.bill_amount, patch.paid);

        let result = sqlx::query(
            "UPDATE ledger_entries
             SET entry_date = ?1, particulars = ?2, bill_amount = ?3, paid = ?4, remaining = ?5
             WHERE id = ?6",
        )
        .bind(patch.entry_date.to_string())
        .bind(&patch.particulars)
        .bind(patch.bill_amount)
        .bind(patch.paid)
        .bind(remaining)
        .bind(entry_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ledger entry", entry_id));
        }
        self.get_entry(entry_id).await
    }

    /// Deletes an entry by primary key.
    pub async fn delete_entry(&self, entry_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE id = ?1")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ledger entry", entry_id));
        }
        Ok(())
    }

    /// Sums a ledger's columns for the footer row.
    pub async fn totals(&self, ledger_id: i64) -> DbResult<LedgerTotals> {
        let row: (f64, f64, f64) = sqlx::query_as(
            "SELECT COALESCE(SUM(bill_amount), 0.0),
                    COALESCE(SUM(paid), 0.0),
                    COALESCE(SUM(remaining), 0.0)
             FROM ledger_entries WHERE ledger_id = ?1",
        )
        .bind(ledger_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(LedgerTotals {
            bill_amount: row.0,
            paid: row.1,
            remaining: row.2,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
