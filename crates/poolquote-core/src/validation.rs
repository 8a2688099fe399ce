//! # Validation Module
//!
//! Input validation utilities for PoolQuote.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (CLI args / web form)                              │
//! │  ├── Basic parsing (amounts, enums)                                    │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: AppState::apply (Rust)                                       │
//! │  └── THIS MODULE: field rules before the ledger is touched             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Snapshot import                                              │
//! │  └── Whole-document checks (snapshot::validate_import)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use poolquote_core::validation::{validate_item_name, validate_quantity};
//!
//! assert!(validate_item_name("Pool Shovel").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CatalogItem, Percent};
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LEN, MAX_NOTES_LEN, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a catalog item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates free-text notes (item notes and project notes).
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(())
}

/// Validates a supplier link.
///
/// ## Rules
/// - Empty is allowed (no link)
/// - Otherwise must start with `http://` or `https://` and have a host
///
/// ## Example
/// ```rust
/// use poolquote_core::validation::validate_link;
///
/// assert!(validate_link("").is_ok());
/// assert!(validate_link("https://www.homedepot.com/p/123").is_ok());
/// assert!(validate_link("homedepot").is_err());
/// ```
pub fn validate_link(link: &str) -> ValidationResult<()> {
    let link = link.trim();

    if link.is_empty() {
        return Ok(());
    }

    let rest = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"));

    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "link".to_string(),
            reason: "must be an http(s) URL".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Zero is allowed (item tracked but not yet needed)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (owned or donated items)
/// - Must not exceed MAX_PRICE_CENTS ($10,000,000)
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&price.cents()) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a customer discount (0% to 100%).
pub fn validate_discount(discount: Percent) -> ValidationResult<()> {
    if discount.bps() > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates a margin: strictly below 100%, or `cost / (1 - margin)`
/// divides by zero.
pub fn validate_margin(margin: Percent) -> ValidationResult<()> {
    if margin.bps() >= 10000 {
        return Err(ValidationError::OutOfRange {
            field: "margin".to_string(),
            min: 0,
            max: 99,
        });
    }

    Ok(())
}

/// Validates a revenue entry amount.
pub fn validate_revenue(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "revenue".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Item Validators
// =============================================================================

/// Validates a whole catalog item, as read from an import file.
///
/// Links are kept as written and not checked.
pub fn validate_catalog_item(item: &CatalogItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_quantity(item.quantity as i64)?;
    validate_price("estimatedPrice", item.estimated_price)?;
    validate_price("actualPrice", item.actual_price)?;
    validate_notes(&item.notes)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
