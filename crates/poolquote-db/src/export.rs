//! # Export
//!
//! Flat CSV and full JSON renditions of the inventory snapshot.
//!
//! ## CSV Columns
//! ```text
//! Section,Item,Price,Quantity,Usage,Location,Status,Link,Notes,Total Cost
//! tools,Hand tamper,45.00,1,reusable,local,pending,,,45.00
//! ```
//!
//! `Price` is the actual price once one has been entered and the estimate
//! before that. `Total Cost` is `Price × Quantity`. Amounts are plain
//! decimals with no currency symbol so spreadsheets read them as numbers.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::DbResult;
use poolquote_core::snapshot::InventorySnapshot;
use poolquote_core::types::CatalogItem;
use poolquote_core::Money;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 10] = [
    "Section",
    "Item",
    "Price",
    "Quantity",
    "Usage",
    "Location",
    "Status",
    "Link",
    "Notes",
    "Total Cost",
];

fn export_price(item: &CatalogItem) -> Money {
    if item.actual_price.is_zero() {
        item.estimated_price
    } else {
        item.actual_price
    }
}

/// Writes every item of every section, in display order.
pub fn write_csv<W: std::io::Write>(snapshot: &InventorySnapshot, writer: W) -> DbResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    let mut rows = 0usize;
    for (section, item) in snapshot.sections.iter() {
        let price = export_price(item);
        csv.write_record([
            section.as_str().to_string(),
            item.name.clone(),
            price.to_plain_string(),
            item.quantity.to_string(),
            item.usage.as_str().to_string(),
            item.location.as_str().to_string(),
            item.status.as_str().to_string(),
            item.link.clone(),
            item.notes.clone(),
            price.multiply_quantity(item.quantity).to_plain_string(),
        ])?;
        rows += 1;
    }
    csv.flush().map_err(csv::Error::from)?;

    debug!(rows, "CSV export written");
    Ok(())
}

/// CSV export as a string.
pub fn to_csv_string(snapshot: &InventorySnapshot) -> DbResult<String> {
    let mut buf = Vec::new();
    write_csv(snapshot, &mut buf)?;
    // csv only writes the UTF-8 strings it was given.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Pretty-printed JSON export with `exportedAt` and `version`.
pub fn to_json_string(snapshot: &InventorySnapshot, exported_at: DateTime<Utc>) -> DbResult<String> {
    Ok(serde_json::to_string_pretty(&snapshot.to_export(exported_at))?)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use poolquote_core::ledger::{ItemField, ItemTemplate};
    use poolquote_core::pricing::TaxRules;
    use poolquote_core::snapshot::validate_import;
    use poolquote_core::types::{SectionName, TaxRate};
    use pretty_assertions::assert_eq;

    fn snapshot() -> InventorySnapshot {
        let mut snapshot = InventorySnapshot::default();
        let sections = &mut snapshot.sections;
        sections
            .add_item(
                SectionName::Tools,
                ItemTemplate {
                    estimated_price: Money::from_dollars(45),
                    quantity: 2,
                    ..ItemTemplate::named("Hand tamper")
                },
            )
            .unwrap();
        sections
            .add_item(
                SectionName::Hardware,
                ItemTemplate {
                    estimated_price: Money::from_dollars(10),
                    notes: "buy at the \"big\" store, not online".to_string(),
                    ..ItemTemplate::named("Hose clamps, 4 pack")
                },
            )
            .unwrap();
        let untaxed = TaxRules {
            rate: TaxRate::zero(),
            ..TaxRules::default()
        };
        sections
            .update_field(
                SectionName::Hardware,
                0,
                ItemField::ActualPrice(Money::from_cents(1250)),
                &untaxed,
            )
            .unwrap();
        snapshot
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv_string(&snapshot()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Section,Item,Price,Quantity,Usage,Location,Status,Link,Notes,Total Cost"
        );
        assert_eq!(lines[1], "tools,Hand tamper,45.00,2,one-time,local,pending,,,90.00");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_quotes_fields_and_prefers_actual_price() {
        let csv = to_csv_string(&snapshot()).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        let clamps = &rows[1];
        assert_eq!(&clamps[0], "hardware");
        assert_eq!(&clamps[1], "Hose clamps, 4 pack");
        assert_eq!(&clamps[2], "12.50");
        assert_eq!(&clamps[8], "buy at the \"big\" store, not online");
        assert_eq!(&clamps[9], "12.50");
    }

    #[test]
    fn test_empty_snapshot_is_header_only() {
        let csv = to_csv_string(&InventorySnapshot::default()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_json_export_imports_back() {
        let snapshot = snapshot();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let json = to_json_string(&snapshot, at).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], poolquote_core::DOCUMENT_VERSION);
        assert!(value["exportedAt"].as_str().unwrap().starts_with("2024-06-01T09:30:00"));

        assert_eq!(validate_import(&json).unwrap(), snapshot);
    }
}
