//! # CLI Subcommands
//!
//! Each module turns arguments into [`poolquote_core::Command`] values or
//! read-only queries against the workspace.
//!
//! ## Command Categories
//! - [`quote`] - Customer quote and payout
//! - [`items`] - Ledger item CRUD
//! - [`ledger`] - Summary, ROI, revenue and notes
//! - [`data`] - Export and import
//! - [`admin`] - Pricing configuration
//! - [`relay`] - Relay server

pub mod admin;
pub mod data;
pub mod items;
pub mod ledger;
pub mod quote;
pub mod relay;
