//! # Theme Resolution
//!
//! Decides whether the app should render dark, combining the OS preference
//! with stored settings.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Dark Mode Resolution                               │
//! │                                                                         │
//! │  1. dark_mode_override setting present? → use it ("1" dark, else light) │
//! │  2. OS preference detectable?           → use it                        │
//! │  3. Otherwise                           → stored dark_mode setting      │
//! │                                                                         │
//! │  Detection is best-effort: it shells out to the platform tool and any   │
//! │  failure (missing binary, odd output, unsupported OS) silently falls    │
//! │  through to the stored setting. Theme must never block startup.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[cfg(any(target_os = "linux", target_os = "macos"))]
use std::process::Command;

use tracing::debug;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::settings::KEY_DARK_MODE_OVERRIDE;

/// Probes the operating system for its dark-mode preference.
///
/// Returns None when the preference cannot be determined.
pub fn detect_system_theme() -> Option<bool> {
    detect_impl()
}

// GNOME and most GTK desktops expose the preference via gsettings.
#[cfg(target_os = "linux")]
fn detect_impl() -> Option<bool> {
    let output = Command::new("gsettings")
        .args(["get", "org.gnome.desktop.interface", "color-scheme"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let scheme = String::from_utf8_lossy(&output.stdout);
    Some(scheme.contains("dark"))
}

// The key exists only when dark mode is on; a failing read means light.
#[cfg(target_os = "macos")]
fn detect_impl() -> Option<bool> {
    let output = Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    Some(
        output.status.success()
            && String::from_utf8_lossy(&output.stdout)
                .trim()
                .eq_ignore_ascii_case("dark"),
    )
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn detect_impl() -> Option<bool> {
    None
}

/// Resolves the effective dark-mode flag for this session.
pub async fn resolve_dark_mode(db: &Database) -> DbResult<bool> {
    let settings = db.settings();

    if let Some(value) = settings.get(KEY_DARK_MODE_OVERRIDE).await? {
        debug!(value = %value, "Dark mode forced by override setting");
        return Ok(value == "1");
    }

    if let Some(os_dark) = detect_system_theme() {
        debug!(os_dark, "Dark mode taken from OS preference");
        return Ok(os_dark);
    }

    settings.dark_mode().await
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_override_wins() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.settings()
            .set(KEY_DARK_MODE_OVERRIDE, "1")
            .await
            .unwrap();
        assert!(resolve_dark_mode(&db).await.unwrap());

        db.settings()
            .set(KEY_DARK_MODE_OVERRIDE, "0")
            .await
            .unwrap();
        assert!(!resolve_dark_mode(&db).await.unwrap());
    }

    #[test]
    fn test_detection_never_panics() {
        // Result depends on the host; only the absence of a panic matters.
        let _ = detect_system_theme();
    }
}
