//! # Error Types
//!
//! Domain-specific error types for poolquote-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  poolquote-core errors (this file)                                     │
//! │  ├── CoreError        - Quote, ledger, import and ROI failures         │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  poolquote-db errors (separate crate)                                  │
//! │  └── DbError          - Local store failures                           │
//! │                                                                         │
//! │  poolquote-sync errors (separate crate)                                │
//! │  └── SyncError        - Remote/local persistence, config, transport    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → Workspace (logged + Notice)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recoverability
//! `InvalidPackage` is a contract violation of the caller (the UI only offers
//! known packages). Every ledger error is recoverable: the workspace logs it
//! and the state is left untouched.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Package key is not one of `6ft`, `8ft`, `10ft`.
    ///
    /// Never defaulted: a quote for the wrong pool is worse than no quote.
    #[error("Unknown package: {0}")]
    InvalidPackage(String),

    /// Ledger operation referenced a section or index that does not exist.
    ///
    /// ## When This Occurs
    /// ```text
    /// UI renders section "tools" (3 items)
    ///      │
    ///      ▼
    /// Remote merge replaces "tools" with 2 items
    ///      │
    ///      ▼
    /// Stale click on row 2 → InvalidSectionOrIndex { section: "tools", index: 2 }
    /// ```
    #[error("No item at {section}[{index}]")]
    InvalidSectionOrIndex { section: String, index: usize },

    /// Status string is not one of the five lifecycle states.
    #[error("Unknown status: {0}")]
    InvalidStatus(String),

    /// Status change skips or reverses the fixed cycle.
    #[error("Status cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Delete confirmation does not match the item at the index.
    #[error("Delete confirmation does not match the item at {section}[{index}]")]
    ConfirmationMismatch { section: String, index: usize },

    /// Imported file is malformed. Nothing was merged.
    #[error("Import rejected: {reason}")]
    ImportValidation { reason: String },

    /// Revenue entries must be strictly positive.
    #[error("Revenue amount must be greater than zero")]
    InvalidRevenue,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad URL, bad amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
