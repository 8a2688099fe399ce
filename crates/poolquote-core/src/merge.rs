//! # Remote Merge
//!
//! Applies a remote document to local state. Pure: no clock, no I/O.
//!
//! ## Consistency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LAST WRITE WINS, WHOLE DOCUMENT                                        │
//! │                                                                         │
//! │  remote.lastUpdated <= last applied?  ──yes──►  local unchanged         │
//! │            │ no                                                         │
//! │            ▼                                                            │
//! │  for each section:                                                      │
//! │     remote non-empty  → replaces local section wholesale                │
//! │     remote empty      → default template section (self-healing)         │
//! │  projectNotes, roiTracking → copied verbatim                            │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  top up tools: append newly purchased tools missing by id AND name      │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  clamp quantities and prices to their limits                            │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  healed, topped up or clamped?  ──yes──►  needs_write_back              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no per-field resolution. Two collaborators editing the same
//! item concurrently: the later document wins and the other edit is lost.
//! The guard compares wall-clock stamps from different machines, so clock
//! skew can drop an update or reject a valid one.
//!
//! Writing back only when the merge changed something keeps two clients from
//! echoing the same document at each other forever.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ledger::Sections;
use crate::snapshot::{InventorySnapshot, RemoteDocument};
use crate::template;
use crate::types::{CatalogItem, SectionName};

/// What merge heals and tops up from.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeTemplate {
    pub sections: Sections,
    pub tools: Vec<CatalogItem>,
}

impl MergeTemplate {
    /// The built-in catalog.
    pub fn builtin() -> Self {
        MergeTemplate {
            sections: template::default_sections(),
            tools: template::newly_purchased_tools(),
        }
    }
}

/// Result of [`merge_remote`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub state: InventorySnapshot,
    /// False when the freshness guard rejected the document.
    pub applied: bool,
    /// Timestamp to pass as `last_applied` next time.
    pub last_applied: Option<i64>,
    pub healed_sections: Vec<SectionName>,
    /// Names of tools appended by the top-up.
    pub added_tools: Vec<String>,
    /// Items that received a category on this merge.
    pub backfilled: usize,
    /// Items whose quantity or prices were pulled back into range.
    pub clamped: usize,
    /// The merged state differs from the remote payload and should be
    /// written back so other collaborators receive it.
    pub needs_write_back: bool,
}

/// Merges `remote` into `local`.
///
/// The merged state is not unconditionally written back to the remote
/// store: callers write it back only when `needs_write_back` is set.
pub fn merge_remote(
    local: &InventorySnapshot,
    remote: &RemoteDocument,
    last_applied: Option<i64>,
    template: &MergeTemplate,
) -> MergeOutcome {
    if last_applied.is_some_and(|applied| remote.last_updated <= applied) {
        return MergeOutcome {
            state: local.clone(),
            applied: false,
            last_applied,
            healed_sections: Vec::new(),
            added_tools: Vec::new(),
            backfilled: 0,
            clamped: 0,
            needs_write_back: false,
        };
    }

    let mut state = remote.data.clone();

    let mut healed_sections = Vec::new();
    for section in SectionName::ALL {
        if state.sections.get(section).is_empty() {
            *state.sections.get_mut(section) = template.sections.get(section).clone();
            if !state.sections.get(section).is_empty() {
                healed_sections.push(section);
            }
        }
    }

    let added_tools = top_up_tools(&mut state.sections.tools, &template.tools);
    let backfilled = state.backfill();
    let clamped = state.clamp_to_limits();

    let needs_write_back = !healed_sections.is_empty()
        || !added_tools.is_empty()
        || backfilled > 0
        || clamped > 0;

    MergeOutcome {
        state,
        applied: true,
        last_applied: Some(remote.last_updated),
        healed_sections,
        added_tools,
        backfilled,
        clamped,
        needs_write_back,
    }
}

/// Appends every tool not already present by id or by name.
fn top_up_tools(tools: &mut Vec<CatalogItem>, wanted: &[CatalogItem]) -> Vec<String> {
    let mut added = Vec::new();
    for tool in wanted {
        let present = tools.iter().any(|existing| {
            existing.id == tool.id || same_name(&existing.name, &tool.name)
        });
        if !present {
            tools.push(tool.clone());
            added.push(tool.name.clone());
        }
    }
    added
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ItemTemplate;
    use crate::money::Money;
    use pretty_assertions::assert_eq;

    fn remote_with(data: InventorySnapshot, last_updated: i64) -> RemoteDocument {
        data.to_remote(last_updated, "device-b")
    }

    fn full_remote() -> InventorySnapshot {
        let mut data = InventorySnapshot::from_template();
        data.project_notes = "Remote notes".to_string();
        data.roi_tracking.total_revenue = Money::from_dollars(3142);
        data.roi_tracking.jobs_completed = 1;
        data
    }

    #[test]
    fn test_stale_or_equal_remote_is_ignored() {
        let template = MergeTemplate::builtin();
        let mut local = InventorySnapshot::from_template();
        local.project_notes = "Local notes".to_string();
        let remote = remote_with(full_remote(), 1000);

        for last_applied in [1000, 1001, 5000] {
            let outcome = merge_remote(&local, &remote, Some(last_applied), &template);
            assert!(!outcome.applied);
            assert_eq!(outcome.state, local);
            assert_eq!(outcome.last_applied, Some(last_applied));
            assert!(!outcome.needs_write_back);
        }
    }

    #[test]
    fn test_newer_remote_replaces_everything() {
        let template = MergeTemplate::builtin();
        let mut local = InventorySnapshot::from_template();
        local
            .sections
            .add_item(SectionName::Tools, ItemTemplate::named("Local only tool"))
            .unwrap();

        let remote = remote_with(full_remote(), 2000);
        let outcome = merge_remote(&local, &remote, Some(1000), &template);

        assert!(outcome.applied);
        assert_eq!(outcome.last_applied, Some(2000));
        assert_eq!(outcome.state, remote.data);
        assert!(!outcome.needs_write_back);
        assert!(outcome
            .state
            .sections
            .tools
            .iter()
            .all(|tool| tool.name != "Local only tool"));
    }

    #[test]
    fn test_first_remote_is_always_applied() {
        let template = MergeTemplate::builtin();
        let remote = remote_with(full_remote(), 1);
        let outcome = merge_remote(&InventorySnapshot::default(), &remote, None, &template);
        assert!(outcome.applied);
        assert_eq!(outcome.state.project_notes, "Remote notes");
    }

    #[test]
    fn test_out_of_range_remote_items_are_clamped_and_written_back() {
        let template = MergeTemplate::builtin();
        let mut data = full_remote();
        data.sections.tools[0].quantity = 4_000_000_000;
        data.sections.tools[0].actual_price = Money::from_cents(9_000_000_000_000);

        let outcome = merge_remote(
            &InventorySnapshot::default(),
            &remote_with(data, 10),
            None,
            &template,
        );

        assert_eq!(outcome.clamped, 1);
        assert!(outcome.needs_write_back);
        assert_eq!(outcome.state.sections.tools[0].quantity, 999);
        assert_eq!(
            outcome.state.sections.tools[0].actual_price.cents(),
            crate::MAX_PRICE_CENTS
        );
    }

    #[test]
    fn test_empty_remote_sections_are_healed_from_template() {
        let template = MergeTemplate::builtin();
        let mut data = full_remote();
        data.sections.pumps.clear();
        data.sections.hardware.clear();

        let outcome = merge_remote(
            &InventorySnapshot::default(),
            &remote_with(data, 10),
            None,
            &template,
        );

        assert_eq!(
            outcome.healed_sections,
            vec![SectionName::Pumps, SectionName::Hardware]
        );
        assert_eq!(outcome.state.sections.pumps, template.sections.pumps);
        assert!(outcome.needs_write_back);
    }

    #[test]
    fn test_notes_and_roi_copied_verbatim() {
        let template = MergeTemplate::builtin();
        let mut local = InventorySnapshot::from_template();
        local.roi_tracking.jobs_completed = 7;

        let mut data = full_remote();
        data.project_notes.clear();
        let outcome = merge_remote(&local, &remote_with(data.clone(), 10), None, &template);

        // Empty notes from remote win over local notes; no field merge.
        assert_eq!(outcome.state.project_notes, "");
        assert_eq!(outcome.state.roi_tracking, data.roi_tracking);
    }

    #[test]
    fn test_tool_top_up_matches_by_id_or_name() {
        let template = MergeTemplate::builtin();
        let mut data = full_remote();
        let laser = template_tool(&template, "Laser level");
        let driver = template_tool(&template, "Cordless impact driver");

        // Keep the laser level with a new name (matched by id), re-add the
        // driver under a fresh id (matched by name), drop the vacuum head.
        data.sections.tools.retain(|tool| {
            tool.id != template_tool(&template, "Pool vacuum head").id && tool.id != driver.id
        });
        if let Some(tool) = data.sections.tools.iter_mut().find(|t| t.id == laser.id) {
            tool.name = "Laser level (red)".to_string();
        }
        let mut renamed_driver = driver.clone();
        renamed_driver.id = "legacy-driver".to_string();
        renamed_driver.name = " cordless IMPACT driver ".to_string();
        data.sections.tools.push(renamed_driver);

        let outcome = merge_remote(
            &InventorySnapshot::default(),
            &remote_with(data.clone(), 10),
            None,
            &template,
        );

        assert_eq!(outcome.added_tools, vec!["Pool vacuum head".to_string()]);
        assert_eq!(
            outcome.state.sections.tools.len(),
            data.sections.tools.len() + 1
        );
        assert!(outcome.needs_write_back);

        // Merging the written-back document again changes nothing.
        let again = merge_remote(
            &outcome.state,
            &outcome.state.to_remote(20, "device-a"),
            Some(10),
            &template,
        );
        assert!(again.added_tools.is_empty());
        assert!(!again.needs_write_back);
    }

    fn template_tool(template: &MergeTemplate, name: &str) -> CatalogItem {
        template
            .tools
            .iter()
            .find(|tool| tool.name == name)
            .cloned()
            .unwrap()
    }
}
