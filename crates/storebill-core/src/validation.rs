//! # Validation Module
//!
//! Input validation rules shared by the catalog, billing, and ledger flows.
//!
//! ## Validation Philosophy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Validation Strategy                               │
//! │                                                                         │
//! │  User input ──► validate_*() ──► business logic ──► persistence         │
//! │                      │                                                  │
//! │                      └── Err(ValidationError) with the FIELD NAME       │
//! │                                                                         │
//! │  Every check names the offending field so the UI can point at the       │
//! │  right input. Checks are pure; they never touch the database.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_LINE_QUANTITY;

/// Maximum length for names (products, customers, ledgers, discounts).
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for free-text fields (descriptions, particulars, addresses).
pub const MAX_TEXT_LENGTH: usize = 500;

// =============================================================================
// Name and Text Validation
// =============================================================================

/// Validates a required name field (product, customer, ledger, discount).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most [`MAX_NAME_LENGTH`] characters
pub fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Validates an optional free-text field (description, particulars).
pub fn validate_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validation
// =============================================================================

/// Validates a monetary amount: finite and non-negative.
///
/// NaN and infinities would silently poison every downstream sum, so they
/// are rejected at the door.
pub fn validate_amount(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    if value < 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a percentage in [0, 100]: discounts and tax rates.
pub fn validate_percent(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "not a finite number".to_string(),
        });
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

/// Validates a discount percentage.
pub fn validate_discount_percent(value: f64) -> Result<(), ValidationError> {
    validate_percent("discount percent", value)
}

/// Validates a product tax rate.
pub fn validate_tax_rate(value: f64) -> Result<(), ValidationError> {
    validate_percent("tax rate", value)
}

/// Validates a cart line quantity: strictly positive and within bounds.
pub fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1.0,
            max: MAX_LINE_QUANTITY as f64,
        });
    }
    Ok(())
}

/// Validates stock on hand: non-negative.
pub fn validate_stock(stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::MustBePositive {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates the editable fields of a product before create or update.
pub fn validate_product(
    name: &str,
    price: f64,
    cost_price: f64,
    stock: i64,
    tax_rate: f64,
) -> Result<(), ValidationError> {
    validate_name("product name", name)?;
    validate_amount("price", price)?;
    validate_amount("cost price", cost_price)?;
    validate_stock(stock)?;
    validate_tax_rate(tax_rate)?;
    Ok(())
}

/// Validates the editable fields of a ledger entry.
pub fn validate_ledger_entry(
    particulars: &str,
    bill_amount: f64,
    paid: f64,
) -> Result<(), ValidationError> {
    validate_text("particulars", particulars)?;
    validate_amount("bill amount", bill_amount)?;
    validate_amount("paid", paid)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
