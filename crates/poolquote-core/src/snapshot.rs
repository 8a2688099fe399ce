//! # Snapshot Shapes
//!
//! The documents PoolQuote stores and exchanges.
//!
//! ## Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  InventorySnapshot (local key "inventoryData")                          │
//! │  { cliff: [...], tools: [...], ... hardware: [...],                     │
//! │    projectNotes: "", roiTracking: {...}, lastSaved: "2024-..." }        │
//! │                                                                         │
//! │  RemoteDocument                                                         │
//! │  { data: <InventorySnapshot>, lastUpdated: 1717243200000,               │
//! │    lastUpdatedBy: "device-a", version: "2.0" }                          │
//! │                                                                         │
//! │  ExportDocument (JSON export file)                                      │
//! │  { <InventorySnapshot fields>, exportedAt: "...", version: "2.0" }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Import
//! [`validate_import`] checks a whole file before anything is replaced. A
//! malformed file yields `ImportValidation` and the caller's state is never
//! partially updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::category;
use crate::error::{CoreError, CoreResult};
use crate::ledger::Sections;
use crate::pricing::AdminConfigPatch;
use crate::roi::RoiLedger;
use crate::template::default_sections;
use crate::types::{CatalogItem, SectionName};
use crate::validation::validate_catalog_item;
use crate::DOCUMENT_VERSION;

// =============================================================================
// Inventory Snapshot
// =============================================================================

/// Everything the ledger persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    #[serde(flatten)]
    pub sections: Sections,
    #[serde(default)]
    pub project_notes: String,
    #[serde(default)]
    pub roi_tracking: RoiLedger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub last_saved: Option<DateTime<Utc>>,
}

impl InventorySnapshot {
    /// A fresh workspace: the default catalog, no notes, no revenue.
    pub fn from_template() -> Self {
        InventorySnapshot {
            sections: default_sections(),
            ..InventorySnapshot::default()
        }
    }

    /// Loads a stored snapshot, backfilling categories of legacy items and
    /// clamping out-of-range quantities and prices.
    pub fn load(json: &str) -> CoreResult<Self> {
        let mut snapshot: InventorySnapshot =
            serde_json::from_str(json).map_err(|e| CoreError::ImportValidation {
                reason: e.to_string(),
            })?;
        snapshot.backfill();
        snapshot.clamp_to_limits();
        Ok(snapshot)
    }

    /// Clamps every item to the quantity and price limits. Returns how many
    /// items changed.
    pub fn clamp_to_limits(&mut self) -> usize {
        self.sections
            .items_mut()
            .map(CatalogItem::clamp_to_limits)
            .filter(|changed| *changed)
            .count()
    }

    /// One-time migration for snapshots written before categories were
    /// stored. Returns how many items changed.
    pub fn backfill(&mut self) -> usize {
        category::backfill(self.sections.items_mut())
    }

    /// Wraps for the remote store.
    pub fn to_remote(&self, last_updated: i64, last_updated_by: &str) -> RemoteDocument {
        RemoteDocument {
            data: self.clone(),
            last_updated,
            last_updated_by: last_updated_by.to_string(),
            version: DOCUMENT_VERSION.to_string(),
        }
    }

    /// Wraps for a JSON export file.
    pub fn to_export(&self, exported_at: DateTime<Utc>) -> ExportDocument {
        ExportDocument {
            snapshot: self.clone(),
            exported_at,
            version: DOCUMENT_VERSION.to_string(),
        }
    }
}

// =============================================================================
// Remote Document
// =============================================================================

/// The document held by the real-time store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub data: InventorySnapshot,
    /// Epoch milliseconds of the write.
    pub last_updated: i64,
    pub last_updated_by: String,
    pub version: String,
}

// =============================================================================
// Export Document
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(flatten)]
    pub snapshot: InventorySnapshot,
    #[ts(as = "String")]
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

// =============================================================================
// Import Validation
// =============================================================================

fn reject(reason: impl Into<String>) -> CoreError {
    CoreError::ImportValidation {
        reason: reason.into(),
    }
}

/// Validates an imported inventory file (a JSON export or a raw snapshot).
///
/// ## Rules
/// - Top level is an object with at least one section array
/// - Every present section is an array of objects with a non-empty `name`
/// - `projectNotes`, if present, is a string
/// - The whole document then deserializes into typed values
/// - Every item passes the field rules (quantity 0-999, prices within
///   $0-$10,000,000, name and notes length)
pub fn validate_import(json: &str) -> CoreResult<InventorySnapshot> {
    let value: Value = serde_json::from_str(json).map_err(|e| reject(format!("not JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| reject("top level must be an object"))?;

    let mut found_section = false;
    for section in SectionName::ALL {
        let Some(items) = object.get(section.as_str()) else {
            continue;
        };
        let items = items
            .as_array()
            .ok_or_else(|| reject(format!("{} must be an array", section)))?;
        found_section = true;

        for (index, item) in items.iter().enumerate() {
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();
            if name.is_empty() {
                return Err(reject(format!("{}[{}] has no name", section, index)));
            }
        }
    }
    if !found_section {
        return Err(reject("no inventory sections found"));
    }

    if let Some(notes) = object.get("projectNotes") {
        if !notes.is_string() {
            return Err(reject("projectNotes must be a string"));
        }
    }

    let mut snapshot: InventorySnapshot =
        serde_json::from_value(value).map_err(|e| reject(e.to_string()))?;

    for section in SectionName::ALL {
        for (index, item) in snapshot.sections.get(section).iter().enumerate() {
            validate_catalog_item(item)
                .map_err(|e| reject(format!("{}[{}]: {}", section, index, e)))?;
        }
    }

    snapshot.backfill();
    Ok(snapshot)
}

/// Validates an imported admin configuration blob.
pub fn validate_admin_import(json: &str) -> CoreResult<AdminConfigPatch> {
    let value: Value = serde_json::from_str(json).map_err(|e| reject(format!("not JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| reject("top level must be an object"))?;

    const KEYS: [&str; 5] = ["margins", "jorgeRates", "inventory", "leadTimes", "baseCosts"];
    if !KEYS.iter().any(|key| object.contains_key(*key)) {
        return Err(reject("no admin configuration keys found"));
    }

    serde_json::from_value(value).map_err(|e| reject(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = InventorySnapshot::from_template();
        let value = serde_json::to_value(&snapshot).unwrap();

        for section in SectionName::ALL {
            assert!(value[section.as_str()].is_array(), "{}", section);
        }
        assert_eq!(value["projectNotes"], "");
        assert_eq!(value["roiTracking"]["totalRevenue"], 0);
        assert_eq!(value["roiTracking"]["jobsCompleted"], 0);
    }

    #[test]
    fn test_remote_document_shape() {
        let doc = InventorySnapshot::default().to_remote(1_717_243_200_000, "device-a");
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["lastUpdated"], 1_717_243_200_000_i64);
        assert_eq!(value["lastUpdatedBy"], "device-a");
        assert_eq!(value["version"], DOCUMENT_VERSION);
        assert!(value["data"]["cliff"].is_array());
    }

    #[test]
    fn test_load_backfills_categories() {
        let json = r#"{"tools": [{"name": "Hand tamper"}], "projectNotes": "hi"}"#;
        let snapshot = InventorySnapshot::load(json).unwrap();
        assert_eq!(snapshot.sections.tools[0].category, Some(Category::SitePrep));
        assert!(snapshot.sections.cliff.is_empty());
        assert_eq!(snapshot.project_notes, "hi");
    }

    #[test]
    fn test_export_round_trips_through_import() {
        let mut snapshot = InventorySnapshot::from_template();
        snapshot.project_notes = "Phase 2".to_string();
        let exported_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let json = serde_json::to_string(&snapshot.to_export(exported_at)).unwrap();

        let imported = validate_import(&json).unwrap();
        assert_eq!(imported, snapshot);
    }

    #[test]
    fn test_import_rejects_malformed_files() {
        assert!(matches!(
            validate_import("not json"),
            Err(CoreError::ImportValidation { .. })
        ));
        assert!(validate_import("[]").is_err());
        assert!(validate_import(r#"{"projectNotes": "x"}"#).is_err());
        assert!(validate_import(r#"{"tools": {}}"#).is_err());
        assert!(validate_import(r#"{"tools": [{"name": ""}]}"#).is_err());
        assert!(validate_import(r#"{"tools": [{"name": "x", "status": "lost"}]}"#).is_err());
        assert!(validate_import(r#"{"tools": [], "projectNotes": 5}"#).is_err());
    }

    #[test]
    fn test_import_rejects_out_of_range_items() {
        let huge = r#"{"tools": [{"name": "Shovel", "actualPrice": 9000000000000, "quantity": 4000000000, "status": "verified"}]}"#;
        let err = validate_import(huge).unwrap_err();
        assert!(matches!(&err, CoreError::ImportValidation { reason } if reason.starts_with("tools[0]")));

        let negative = r#"{"pumps": [{"name": "Pump", "estimatedPrice": -100}]}"#;
        assert!(validate_import(negative).is_err());

        let fine = r#"{"tools": [{"name": "Shovel", "actualPrice": 3500, "quantity": 999, "status": "verified"}]}"#;
        let snapshot = validate_import(fine).unwrap();
        let total = snapshot.sections.aggregate(crate::ledger::Scope::All).total;
        assert_eq!(total.cents(), 3500 * 999);
    }

    #[test]
    fn test_load_clamps_out_of_range_items() {
        let json = r#"{"tools": [{"name": "Shovel", "actualPrice": 9000000000000, "quantity": 4000000000, "status": "verified"}]}"#;
        let snapshot = InventorySnapshot::load(json).unwrap();
        let shovel = &snapshot.sections.tools[0];
        assert_eq!(shovel.quantity, 999);
        assert_eq!(shovel.actual_price.cents(), crate::MAX_PRICE_CENTS);

        // Aggregates over the loaded data stay finite.
        let total = snapshot.sections.aggregate(crate::ledger::Scope::All).total;
        assert_eq!(total.cents(), crate::MAX_PRICE_CENTS * 999);
    }

    #[test]
    fn test_admin_import() {
        let patch = validate_admin_import(r#"{"leadTimes": {"local": 1}}"#).unwrap();
        assert_eq!(patch.lead_times.map(|l| l.local), Some(1));
        assert!(patch.margins.is_none());

        assert!(validate_admin_import(r#"{"colors": {}}"#).is_err());
        assert!(validate_admin_import(r#"{"margins": 5}"#).is_err());
    }
}
