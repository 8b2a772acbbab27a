//! # Settings Repository
//!
//! Key/value configuration store backing the settings tab and the store
//! profile printed on invoices.
//!
//! ## Seeding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Default Settings Lifecycle                          │
//! │                                                                         │
//! │  Every startup:  seed_defaults()                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT OR IGNORE (store_name, store_address, ...)                      │
//! │       │                                                                 │
//! │       ├── Fresh database  → defaults appear                             │
//! │       └── Existing values → untouched (user edits win)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use storebill_core::StoreProfile;

/// Setting key for the store display name.
pub const KEY_STORE_NAME: &str = "store_name";
/// Setting key for the store street address.
pub const KEY_STORE_ADDRESS: &str = "store_address";
/// Setting key for the store contact email.
pub const KEY_STORE_EMAIL: &str = "store_email";
/// Setting key for the store contact phone.
pub const KEY_STORE_PHONE: &str = "store_phone";
/// Setting key for the stored dark-mode preference ("0" or "1").
pub const KEY_DARK_MODE: &str = "dark_mode";
/// Setting key that, when present, overrides OS theme detection.
pub const KEY_DARK_MODE_OVERRIDE: &str = "dark_mode_override";

/// The defaults seeded into a fresh database.
const DEFAULTS: &[(&str, &str)] = &[
    (KEY_STORE_NAME, "Lilly's Closet"),
    (KEY_STORE_ADDRESS, "12 Market Street"),
    (KEY_STORE_EMAIL, "hello@lillyscloset.example"),
    (KEY_STORE_PHONE, "000-000-0000"),
    (KEY_DARK_MODE, "0"),
];

/// Repository for the settings key/value table.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting value, or None if the key is absent.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Gets a setting value, falling back to a default when absent.
    pub async fn get_or(&self, key: &str, default: &str) -> DbResult<String> {
        Ok(self.get(key).await?.unwrap_or_else(|| default.to_string()))
    }

    /// Sets a setting, inserting or overwriting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Writing setting");
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Deletes a setting. Deleting an absent key is not an error.
    pub async fn delete(&self, key: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Lists all settings as (key, value) pairs, ordered by key.
    pub async fn all(&self) -> DbResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Seeds the default settings without clobbering existing values.
    ///
    /// Called on every startup; `INSERT OR IGNORE` makes it idempotent.
    pub async fn seed_defaults(&self) -> DbResult<()> {
        for (key, value) in DEFAULTS {
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)")
                .bind(key)
                .bind(value)
                .execute(&self.pool)
                .await?;
        }
        debug!("Default settings seeded");
        Ok(())
    }

    /// Assembles the store profile from its four settings keys.
    ///
    /// Missing keys come back as empty strings so invoice rendering never
    /// has to special-case a half-configured store.
    pub async fn store_profile(&self) -> DbResult<StoreProfile> {
        Ok(StoreProfile {
            name: self.get_or(KEY_STORE_NAME, "").await?,
            address: self.get_or(KEY_STORE_ADDRESS, "").await?,
            email: self.get_or(KEY_STORE_EMAIL, "").await?,
            phone: self.get_or(KEY_STORE_PHONE, "").await?,
        })
    }

    /// Writes the store profile back to its settings keys.
    pub async fn set_store_profile(&self, profile: &StoreProfile) -> DbResult<()> {
        self.set(KEY_STORE_NAME, &profile.name).await?;
        self.set(KEY_STORE_ADDRESS, &profile.address).await?;
        self.set(KEY_STORE_EMAIL, &profile.email).await?;
        self.set(KEY_STORE_PHONE, &profile.phone).await?;
        Ok(())
    }

    /// Reads the stored dark-mode flag ("1" = dark).
    pub async fn dark_mode(&self) -> DbResult<bool> {
        Ok(self.get_or(KEY_DARK_MODE, "0").await? == "1")
    }

    /// Stores the dark-mode flag.
    pub async fn set_dark_mode(&self, dark: bool) -> DbResult<()> {
        self.set(KEY_DARK_MODE, if dark { "1" } else { "0" }).await
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

    #[tokio::test]
    async fn test_get_set_roundtrip() {
        let db = test_db().await;
        let settings = db.settings();

        assert_eq!(settings.get("currency").await.unwrap(), None);

        settings.set("currency", "INR").await.unwrap();
        assert_eq!(
            settings.get("currency").await.unwrap().as_deref(),
            Some("INR")
        );

        // Overwrite
        settings.set("currency", "USD").await.unwrap();
        assert_eq!(
            settings.get("currency").await.unwrap().as_deref(),
            Some("USD")
        );
    }

    #[tokio::test]
    async fn test_seed_preserves_user_edits() {
        let db = test_db().await;
        let settings = db.settings();

        settings.set(KEY_STORE_NAME, "My Boutique").await.unwrap();
        settings.seed_defaults().await.unwrap();

        assert_eq!(
            settings.get(KEY_STORE_NAME).await.unwrap().as_deref(),
            Some("My Boutique")
        );
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let db = test_db().await;
        db.settings().delete("never_existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_store_profile_roundtrip() {
        let db = test_db().await;
        let settings = db.settings();

        let profile = StoreProfile {
            name: "Corner Shop".to_string(),
            address: "1 High St".to_string(),
            email: "shop@example.com".to_string(),
            phone: "555-0100".to_string(),
        };
        settings.set_store_profile(&profile).await.unwrap();

        let loaded = settings.store_profile().await.unwrap();
        assert_eq!(loaded.name, "Corner Shop");
        assert_eq!(loaded.phone, "555-0100");
    }

    #[tokio::test]
    async fn test_dark_mode_flag() {
        let db = test_db().await;
        let settings = db.settings();

        assert!(!settings.dark_mode().await.unwrap());
        settings.set_dark_mode(true).await.unwrap();
        assert!(settings.dark_mode().await.unwrap());
    }
}
