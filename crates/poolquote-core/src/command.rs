//! # Commands and Application State
//!
//! Every user action is a [`Command`] value applied through
//! [`AppState::apply`], the single mutation entry point.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  UI action ──► Command ──► AppState::apply ──► Ok(Change)               │
//! │                                   │                 │                   │
//! │                                   │                 ├─ Inventory → save │
//! │                                   │                 │   snapshot, push  │
//! │                                   │                 │   remote          │
//! │                                   │                 └─ Pricing → save   │
//! │                                   │                     admin blob      │
//! │                                   ▼                                     │
//! │                              Err(CoreError) → state untouched           │
//! │                                                                         │
//! │  replay(state, [cmd1, cmd2, ...]) → same final state every time         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands carry everything they need (including dates), so applying them
//! never reads a clock and replay is deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ledger::{DeleteConfirmation, ItemField, ItemTemplate};
use crate::merge::{merge_remote, MergeOutcome, MergeTemplate};
use crate::money::Money;
use crate::payout::{compute_payout, PayoutBreakdown};
use crate::pricing::{AdminConfigPatch, InventoryLevels, PricingConfiguration};
use crate::quote::{compute_quote, Quote, Selection};
use crate::roi::RoiReport;
use crate::snapshot::{InventorySnapshot, RemoteDocument};
use crate::types::{Percent, SectionName};
use crate::validation::validate_notes;

// =============================================================================
// Command
// =============================================================================

/// A discrete user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Command {
    AddItem {
        section: SectionName,
        template: ItemTemplate,
    },
    UpdateField {
        section: SectionName,
        index: usize,
        field: ItemField,
    },
    CycleStatus {
        section: SectionName,
        index: usize,
    },
    SetStatus {
        section: SectionName,
        index: usize,
        status: String,
    },
    DeleteItem {
        section: SectionName,
        index: usize,
        confirmation: DeleteConfirmation,
    },
    SetProjectNotes(String),
    RecordRevenue {
        amount: Money,
        date: DateTime<Utc>,
    },
    /// Replaces the whole inventory with an already validated import.
    ImportSnapshot(InventorySnapshot),
    SetGlobalMargin(Percent),
    SetInventoryLevels(InventoryLevels),
    ApplyAdminPatch(AdminConfigPatch),
}

/// What a successful command changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Ledger, notes or ROI: persisted locally and pushed to the remote.
    Inventory,
    /// Pricing configuration: persisted locally as the admin blob.
    Pricing,
}

// =============================================================================
// App State
// =============================================================================

/// The single owning context for everything the UI reads and edits.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub snapshot: InventorySnapshot,
    pub pricing: PricingConfiguration,
    /// `lastUpdated` of the last remote document applied.
    pub last_applied_remote: Option<i64>,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(InventorySnapshot::from_template(), PricingConfiguration::default())
    }
}

impl AppState {
    pub fn new(snapshot: InventorySnapshot, pricing: PricingConfiguration) -> Self {
        AppState {
            snapshot,
            pricing,
            last_applied_remote: None,
        }
    }

    /// Applies one command. On error nothing was changed.
    pub fn apply(&mut self, command: Command) -> CoreResult<Change> {
        let sections = &mut self.snapshot.sections;
        match command {
            Command::AddItem { section, template } => {
                sections.add_item(section, template)?;
                Ok(Change::Inventory)
            }
            Command::UpdateField {
                section,
                index,
                field,
            } => {
                sections.update_field(section, index, field, &self.pricing.tax)?;
                Ok(Change::Inventory)
            }
            Command::CycleStatus { section, index } => {
                sections.cycle_status(section, index)?;
                Ok(Change::Inventory)
            }
            Command::SetStatus {
                section,
                index,
                status,
            } => {
                sections.set_status(section, index, &status)?;
                Ok(Change::Inventory)
            }
            Command::DeleteItem {
                section,
                index,
                confirmation,
            } => {
                sections.delete_item(section, index, &confirmation)?;
                Ok(Change::Inventory)
            }
            Command::SetProjectNotes(notes) => {
                validate_notes(&notes)?;
                self.snapshot.project_notes = notes;
                Ok(Change::Inventory)
            }
            Command::RecordRevenue { amount, date } => {
                self.snapshot.roi_tracking.record_revenue(amount, date)?;
                Ok(Change::Inventory)
            }
            Command::ImportSnapshot(snapshot) => {
                self.snapshot = snapshot;
                Ok(Change::Inventory)
            }
            Command::SetGlobalMargin(margin) => {
                self.pricing.margins.set_global(margin)?;
                Ok(Change::Pricing)
            }
            Command::SetInventoryLevels(levels) => {
                self.pricing.inventory_levels = levels;
                Ok(Change::Pricing)
            }
            Command::ApplyAdminPatch(patch) => {
                self.pricing.apply_patch(patch);
                Ok(Change::Pricing)
            }
        }
    }

    /// Merges a remote document into the inventory.
    ///
    /// The freshness guard uses `last_applied_remote`, which advances only
    /// when the document is applied.
    pub fn apply_remote(
        &mut self,
        remote: &RemoteDocument,
        template: &MergeTemplate,
    ) -> MergeOutcome {
        let outcome = merge_remote(&self.snapshot, remote, self.last_applied_remote, template);
        if outcome.applied {
            self.snapshot = outcome.state.clone();
            self.last_applied_remote = outcome.last_applied;
        }
        outcome
    }

    /// Quote and the payout computed against it.
    pub fn quote(&self, selection: &Selection) -> CoreResult<(Quote, PayoutBreakdown)> {
        let quote = compute_quote(&self.pricing, selection)?;
        let payout = compute_payout(&self.pricing, selection, &quote);
        Ok((quote, payout))
    }

    pub fn roi(&self) -> RoiReport {
        self.snapshot.roi_tracking.report(&self.snapshot.sections)
    }
}

// =============================================================================
// Replay
// =============================================================================

/// Applies `commands` in order. Failed commands are skipped and reported
/// with their position.
pub fn replay(
    mut state: AppState,
    commands: impl IntoIterator<Item = Command>,
) -> (AppState, Vec<(usize, CoreError)>) {
    let mut failures = Vec::new();
    for (position, command) in commands.into_iter().enumerate() {
        if let Err(e) = state.apply(command) {
            failures.push((position, e));
        }
    }
    (state, failures)
}

// =============================================================================
// Unit Tests
// =============================================================================
