//! # poolquote-core: Pure Business Logic for PoolQuote
//!
//! This crate is the **heart** of PoolQuote. It contains the quote, payout
//! and inventory-ledger engine as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PoolQuote Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Front end (CLI / web estimate + admin pages)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Command values                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          poolquote-sync::Workspace (runtime owner)              │   │
//! │  │    debounced local persist, remote push, remote merge           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ poolquote-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │   quote   │  │  ledger   │  │   merge   │  │   │
//! │  │   │  config   │  │  payout   │  │  roi      │  │  snapshot │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                poolquote-db (local key-value store)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (CatalogItem, SectionName, ItemStatus, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Admin-tunable pricing configuration
//! - [`quote`] - Customer quote calculator
//! - [`payout`] - Contractor payout and profit calculator
//! - [`category`] - Keyword classifier for default categories
//! - [`ledger`] - Inventory ledger operations and aggregates
//! - [`roi`] - Revenue vs. investment tracking
//! - [`template`] - Built-in default catalog
//! - [`snapshot`] - Persisted document shapes and import validation
//! - [`merge`] - Last-write-wins merge of remote documents
//! - [`command`] - Command values and the `AppState` reducer
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level rules
//!
//! ## Example Usage
//!
//! ```rust
//! use poolquote_core::pricing::PricingConfiguration;
//! use poolquote_core::quote::{compute_quote, Selection};
//! use poolquote_core::payout::compute_payout;
//! use poolquote_core::types::{PackageType, Percent};
//!
//! let config = PricingConfiguration::default();
//! let selection = Selection {
//!     add_saltwater: true,
//!     discount: Percent::from_whole(10),
//!     ..Selection::new(PackageType::EightFoot)
//! };
//!
//! let quote = compute_quote(&config, &selection).unwrap();
//! assert_eq!(quote.total.cents(), 314280);
//!
//! // Payout always uses the quote the customer saw.
//! let payout = compute_payout(&config, &selection, &quote);
//! assert_eq!(payout.revenue, quote.total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod category;
pub mod command;
pub mod error;
pub mod ledger;
pub mod merge;
pub mod money;
pub mod payout;
pub mod pricing;
pub mod quote;
pub mod roi;
pub mod snapshot;
pub mod template;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use command::{AppState, Command};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Document format version written into remote documents and exports.
pub const DOCUMENT_VERSION: &str = "2.0";

/// Maximum quantity of a single catalog item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum price of a single catalog item, in cents ($10,000,000).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Maximum item name length in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum notes length in characters.
pub const MAX_NOTES_LEN: usize = 5000;
