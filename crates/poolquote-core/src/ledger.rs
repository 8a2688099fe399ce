//! # Inventory Ledger
//!
//! The eight catalog sections and every operation that mutates them.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_item(section, template)         → new pending item, stable id     │
//! │  update_field(section, i, field)     → one field; actualPrice taxed    │
//! │  cycle_status(section, i)            → next status in the cycle        │
//! │  set_status(section, i, "ordered")   → only the next status accepted   │
//! │  request_delete(section, i)          → DeleteConfirmation              │
//! │  delete_item(section, i, confirm)    → removes, if confirmation matches│
//! │  aggregate(scope) / summary()        → verified-only totals            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Verified-Only Totals
//! Every financial figure counts only `verified` items. This is enforced
//! when aggregating, never when entering data: a pending item may carry any
//! price and quantity and still contributes zero.
//!
//! ## Actual Price Is Stored Taxed
//! Entering an actual price stores `price × (1 + rate)` for taxable items.
//! The retail figure is not kept. Entering the stored value again taxes it
//! a second time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use chrono::{DateTime, Utc};

use crate::category::categorize;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::TaxRules;
use crate::MAX_PRICE_CENTS;
use crate::types::{
    new_item_id, CatalogItem, Category, ItemStatus, Location, SectionName, Usage,
};
use crate::validation::{
    validate_item_name, validate_link, validate_notes, validate_price, validate_quantity,
};

// =============================================================================
// Sections
// =============================================================================

/// The eight ordered item lists. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sections {
    #[serde(default)]
    pub cliff: Vec<CatalogItem>,
    #[serde(default)]
    pub tools: Vec<CatalogItem>,
    #[serde(default)]
    pub tanks: Vec<CatalogItem>,
    #[serde(default)]
    pub pumps: Vec<CatalogItem>,
    #[serde(default)]
    pub salt: Vec<CatalogItem>,
    #[serde(default)]
    pub heating: Vec<CatalogItem>,
    #[serde(default)]
    pub siteprep: Vec<CatalogItem>,
    #[serde(default)]
    pub hardware: Vec<CatalogItem>,
}

impl Sections {
    pub fn get(&self, section: SectionName) -> &Vec<CatalogItem> {
        match section {
            SectionName::Cliff => &self.cliff,
            SectionName::Tools => &self.tools,
            SectionName::Tanks => &self.tanks,
            SectionName::Pumps => &self.pumps,
            SectionName::Salt => &self.salt,
            SectionName::Heating => &self.heating,
            SectionName::SitePrep => &self.siteprep,
            SectionName::Hardware => &self.hardware,
        }
    }

    pub fn get_mut(&mut self, section: SectionName) -> &mut Vec<CatalogItem> {
        match section {
            SectionName::Cliff => &mut self.cliff,
            SectionName::Tools => &mut self.tools,
            SectionName::Tanks => &mut self.tanks,
            SectionName::Pumps => &mut self.pumps,
            SectionName::Salt => &mut self.salt,
            SectionName::Heating => &mut self.heating,
            SectionName::SitePrep => &mut self.siteprep,
            SectionName::Hardware => &mut self.hardware,
        }
    }

    /// Every item with its section, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionName, &CatalogItem)> {
        SectionName::ALL
            .into_iter()
            .flat_map(move |section| self.get(section).iter().map(move |item| (section, item)))
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut CatalogItem> {
        [
            &mut self.cliff,
            &mut self.tools,
            &mut self.tanks,
            &mut self.pumps,
            &mut self.salt,
            &mut self.heating,
            &mut self.siteprep,
            &mut self.hardware,
        ]
        .into_iter()
        .flat_map(|items| items.iter_mut())
    }

    pub fn len(&self) -> usize {
        SectionName::ALL.iter().map(|s| self.get(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn item(&self, section: SectionName, index: usize) -> CoreResult<&CatalogItem> {
        self.get(section)
            .get(index)
            .ok_or_else(|| out_of_range(section, index))
    }

    fn item_mut(&mut self, section: SectionName, index: usize) -> CoreResult<&mut CatalogItem> {
        self.get_mut(section)
            .get_mut(index)
            .ok_or_else(|| out_of_range(section, index))
    }

    /// Finds an item anywhere by its stable id.
    pub fn find_by_id(&self, id: &str) -> Option<(SectionName, usize)> {
        SectionName::ALL.into_iter().find_map(|section| {
            self.get(section)
                .iter()
                .position(|item| item.id == id)
                .map(|index| (section, index))
        })
    }
}

fn out_of_range(section: SectionName, index: usize) -> CoreError {
    CoreError::InvalidSectionOrIndex {
        section: section.to_string(),
        index,
    }
}

// =============================================================================
// Item Creation
// =============================================================================

/// The user-entered fields of a new item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemTemplate {
    pub name: String,
    /// Defaults to keyword classification of name and notes.
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub estimated_price: Money,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub notes: String,
}

fn one() -> u32 {
    1
}

impl ItemTemplate {
    pub fn named(name: impl Into<String>) -> Self {
        ItemTemplate {
            name: name.into(),
            category: None,
            estimated_price: Money::zero(),
            quantity: 1,
            usage: Usage::default(),
            location: Location::default(),
            link: String::new(),
            notes: String::new(),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        validate_item_name(&self.name)?;
        validate_price("estimatedPrice", self.estimated_price)?;
        validate_quantity(self.quantity as i64)?;
        validate_link(&self.link)?;
        validate_notes(&self.notes)?;
        Ok(())
    }

    /// Builds a fresh `pending` item with a new id.
    pub fn into_item(self) -> CatalogItem {
        let category = self
            .category
            .unwrap_or_else(|| categorize(&self.name, &self.notes));
        CatalogItem {
            id: new_item_id(),
            name: self.name.trim().to_string(),
            category: Some(category),
            estimated_price: self.estimated_price,
            actual_price: Money::zero(),
            quantity: self.quantity,
            usage: self.usage,
            location: self.location,
            status: ItemStatus::Pending,
            link: self.link.trim().to_string(),
            notes: self.notes,
            receipt_photo: None,
            purchase_date: None,
        }
    }
}

// =============================================================================
// Field Updates
// =============================================================================

/// One editable field and its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ItemField {
    Name(String),
    Category(Category),
    EstimatedPrice(Money),
    /// Retail price as entered; stored tax-adjusted.
    ActualPrice(Money),
    Quantity(i64),
    Usage(Usage),
    Location(Location),
    Link(String),
    Notes(String),
    ReceiptPhoto(Option<String>),
    PurchaseDate(Option<DateTime<Utc>>),
}

// =============================================================================
// Delete Confirmation
// =============================================================================

/// Proof that the caller confirmed deleting a specific item.
///
/// Index-based deletion races with remote merges that reorder a section, so
/// the confirmation pins the item id seen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConfirmation {
    pub section: SectionName,
    pub index: usize,
    pub item_id: String,
    pub item_name: String,
}

// =============================================================================
// Aggregates
// =============================================================================

/// What to aggregate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Scope {
    All,
    Section(SectionName),
    Category(Category),
}

impl Scope {
    fn contains(&self, section: SectionName, item: &CatalogItem) -> bool {
        match self {
            Scope::All => true,
            Scope::Section(wanted) => *wanted == section,
            Scope::Category(wanted) => item.effective_category() == *wanted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    /// Items in scope, any status.
    pub count: usize,
    /// Verified items in scope.
    pub verified_count: usize,
    /// Sum of verified line totals.
    pub total: Money,
}

impl Aggregate {
    fn add(&mut self, item: &CatalogItem) {
        self.count += 1;
        if item.is_verified() {
            self.verified_count += 1;
            self.total += item.line_total();
        }
    }
}

/// Dashboard totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub overall: Aggregate,
    /// Verified `one-time` spend (tooling and setup).
    pub one_time_total: Money,
    /// Verified `per-job` spend (materials consumed by each install).
    pub per_job_total: Money,
    pub by_section: Vec<(SectionName, Aggregate)>,
    pub by_category: Vec<(Category, Aggregate)>,
}

// =============================================================================
// Ledger Operations
// =============================================================================

impl Sections {
    /// Appends a new `pending` item. Returns its index.
    pub fn add_item(&mut self, section: SectionName, template: ItemTemplate) -> CoreResult<usize> {
        template.validate()?;
        let items = self.get_mut(section);
        items.push(template.into_item());
        Ok(items.len() - 1)
    }

    /// Updates one field of the item at `index`.
    ///
    /// `ActualPrice` goes through `tax.adjust` using the item's current name
    /// and usage, capped at `MAX_PRICE_CENTS`.
    pub fn update_field(
        &mut self,
        section: SectionName,
        index: usize,
        field: ItemField,
        tax: &TaxRules,
    ) -> CoreResult<()> {
        // Validate before touching the item so a failure changes nothing.
        match &field {
            ItemField::Name(name) => validate_item_name(name)?,
            ItemField::EstimatedPrice(price) => validate_price("estimatedPrice", *price)?,
            ItemField::ActualPrice(price) => validate_price("actualPrice", *price)?,
            ItemField::Quantity(qty) => validate_quantity(*qty)?,
            ItemField::Link(link) => validate_link(link)?,
            ItemField::Notes(notes) => validate_notes(notes)?,
            _ => {}
        }

        let item = self.item_mut(section, index)?;
        match field {
            ItemField::Name(name) => item.name = name.trim().to_string(),
            ItemField::Category(category) => item.category = Some(category),
            ItemField::EstimatedPrice(price) => item.estimated_price = price,
            ItemField::ActualPrice(retail) => {
                item.actual_price = tax
                    .adjust(retail, &item.name, item.usage)
                    .min(Money::from_cents(MAX_PRICE_CENTS));
            }
            ItemField::Quantity(qty) => item.quantity = qty as u32,
            ItemField::Usage(usage) => item.usage = usage,
            ItemField::Location(location) => item.location = location,
            ItemField::Link(link) => item.link = link.trim().to_string(),
            ItemField::Notes(notes) => item.notes = notes,
            ItemField::ReceiptPhoto(photo) => item.receipt_photo = photo,
            ItemField::PurchaseDate(date) => item.purchase_date = date,
        }
        Ok(())
    }

    /// Advances the item to the next status. Returns the new status.
    pub fn cycle_status(&mut self, section: SectionName, index: usize) -> CoreResult<ItemStatus> {
        let item = self.item_mut(section, index)?;
        item.status = item.status.next();
        Ok(item.status)
    }

    /// Sets the status by name.
    ///
    /// Only the next status in the cycle is accepted. Naming the current
    /// status is a no-op.
    pub fn set_status(
        &mut self,
        section: SectionName,
        index: usize,
        status: &str,
    ) -> CoreResult<ItemStatus> {
        let wanted: ItemStatus = status.parse()?;
        let item = self.item_mut(section, index)?;

        if wanted == item.status {
            return Ok(wanted);
        }
        if wanted != item.status.next() {
            return Err(CoreError::InvalidStatusTransition {
                from: item.status.to_string(),
                to: wanted.to_string(),
            });
        }
        item.status = wanted;
        Ok(wanted)
    }

    /// First half of a delete: describes the item so the user can confirm.
    pub fn request_delete(
        &self,
        section: SectionName,
        index: usize,
    ) -> CoreResult<DeleteConfirmation> {
        let item = self.item(section, index)?;
        Ok(DeleteConfirmation {
            section,
            index,
            item_id: item.id.clone(),
            item_name: item.name.clone(),
        })
    }

    /// Removes the item if the confirmation still describes it.
    pub fn delete_item(
        &mut self,
        section: SectionName,
        index: usize,
        confirmation: &DeleteConfirmation,
    ) -> CoreResult<CatalogItem> {
        let item = self.item(section, index)?;
        if confirmation.section != section
            || confirmation.index != index
            || confirmation.item_id != item.id
        {
            return Err(CoreError::ConfirmationMismatch {
                section: section.to_string(),
                index,
            });
        }
        Ok(self.get_mut(section).remove(index))
    }

    /// Count and verified total over a scope.
    pub fn aggregate(&self, scope: Scope) -> Aggregate {
        let mut aggregate = Aggregate::default();
        for (section, item) in self.iter() {
            if scope.contains(section, item) {
                aggregate.add(item);
            }
        }
        aggregate
    }

    pub fn summary(&self) -> LedgerSummary {
        let verified_by_usage = |usage: Usage| -> Money {
            self.iter()
                .filter(|(_, item)| item.is_verified() && item.usage == usage)
                .map(|(_, item)| item.line_total())
                .sum()
        };

        LedgerSummary {
            overall: self.aggregate(Scope::All),
            one_time_total: verified_by_usage(Usage::OneTime),
            per_job_total: verified_by_usage(Usage::PerJob),
            by_section: SectionName::ALL
                .into_iter()
                .map(|section| (section, self.aggregate(Scope::Section(section))))
                .collect(),
            by_category: Category::ALL
                .into_iter()
                .map(|category| (category, self.aggregate(Scope::Category(category))))
                .collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger_with(section: SectionName, names: &[&str]) -> Sections {
        let mut sections = Sections::default();
        for name in names {
            sections.add_item(section, ItemTemplate::named(*name)).unwrap();
        }
        sections
    }

    #[test]
    fn test_add_item_starts_pending_with_category() {
        let mut sections = Sections::default();
        let index = sections
            .add_item(SectionName::SitePrep, ItemTemplate::named("Pea gravel"))
            .unwrap();

        let item = sections.item(SectionName::SitePrep, index).unwrap();
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.category, Some(Category::SitePrep));
        assert_eq!(item.quantity, 1);
        assert!(uuid::Uuid::parse_str(&item.id).is_ok());
    }

    #[test]
    fn test_add_item_rejects_blank_name() {
        let mut sections = Sections::default();
        let err = sections
            .add_item(SectionName::Tools, ItemTemplate::named("  "))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(sections.tools.is_empty());
    }

    #[test]
    fn test_invalid_index() {
        let mut sections = ledger_with(SectionName::Tools, &["Shovel"]);
        assert_eq!(
            sections.cycle_status(SectionName::Tools, 1),
            Err(CoreError::InvalidSectionOrIndex {
                section: "tools".to_string(),
                index: 1
            })
        );
        assert!(sections.cycle_status(SectionName::Pumps, 0).is_err());
    }

    #[test]
    fn test_cycle_status_five_times_returns_to_start() {
        let mut sections = ledger_with(SectionName::Tools, &["Shovel"]);
        sections.set_status(SectionName::Tools, 0, "ordered").unwrap();

        for _ in 0..5 {
            sections.cycle_status(SectionName::Tools, 0).unwrap();
        }
        assert_eq!(sections.tools[0].status, ItemStatus::Ordered);
    }

    #[test]
    fn test_set_status_only_accepts_next() {
        let mut sections = ledger_with(SectionName::Tools, &["Shovel"]);

        assert!(matches!(
            sections.set_status(SectionName::Tools, 0, "verified"),
            Err(CoreError::InvalidStatusTransition { .. })
        ));
        assert!(matches!(
            sections.set_status(SectionName::Tools, 0, "lost"),
            Err(CoreError::InvalidStatus(_))
        ));
        assert_eq!(sections.tools[0].status, ItemStatus::Pending);

        assert_eq!(
            sections.set_status(SectionName::Tools, 0, "pending").unwrap(),
            ItemStatus::Pending
        );
        assert_eq!(
            sections.set_status(SectionName::Tools, 0, "ordered").unwrap(),
            ItemStatus::Ordered
        );
    }

    #[test]
    fn test_actual_price_is_taxed_again_on_reentry() {
        let tax = TaxRules::default();
        let mut sections = ledger_with(SectionName::Tools, &["Shovel"]);

        sections
            .update_field(
                SectionName::Tools,
                0,
                ItemField::ActualPrice(Money::from_cents(1000)),
                &tax,
            )
            .unwrap();
        let first = sections.tools[0].actual_price;
        assert_eq!(first.cents(), 1083);

        // Entering the stored value again marks it up a second time.
        sections
            .update_field(SectionName::Tools, 0, ItemField::ActualPrice(first), &tax)
            .unwrap();
        assert_eq!(sections.tools[0].actual_price.cents(), 1172);
        assert_ne!(sections.tools[0].actual_price, first);
    }

    #[test]
    fn test_actual_price_exempt_items_stored_unchanged() {
        let tax = TaxRules::default();
        let mut sections = ledger_with(SectionName::SitePrep, &["Gravel delivery"]);
        sections
            .update_field(
                SectionName::SitePrep,
                0,
                ItemField::ActualPrice(Money::from_dollars(85)),
                &tax,
            )
            .unwrap();
        assert_eq!(sections.siteprep[0].actual_price, Money::from_dollars(85));

        sections
            .update_field(SectionName::SitePrep, 0, ItemField::Usage(Usage::PerJob), &tax)
            .unwrap();
        sections
            .update_field(SectionName::SitePrep, 0, ItemField::Name("Gravel".into()), &tax)
            .unwrap();
        sections
            .update_field(
                SectionName::SitePrep,
                0,
                ItemField::ActualPrice(Money::from_dollars(85)),
                &tax,
            )
            .unwrap();
        assert_eq!(sections.siteprep[0].actual_price, Money::from_dollars(85));
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let tax = TaxRules::default();
        let mut sections = ledger_with(SectionName::Tools, &["Shovel"]);
        let before = sections.clone();

        assert!(sections
            .update_field(SectionName::Tools, 0, ItemField::Quantity(-3), &tax)
            .is_err());
        assert!(sections
            .update_field(SectionName::Tools, 0, ItemField::Link("nope".into()), &tax)
            .is_err());
        assert_eq!(sections, before);
    }

    #[test]
    fn test_delete_requires_matching_confirmation() {
        let mut sections = ledger_with(SectionName::Tools, &["Shovel", "Rake"]);
        let confirm_rake = sections.request_delete(SectionName::Tools, 1).unwrap();
        assert_eq!(confirm_rake.item_name, "Rake");

        // Confirmation for the rake cannot delete the shovel.
        let mut forged = confirm_rake.clone();
        forged.index = 0;
        assert!(matches!(
            sections.delete_item(SectionName::Tools, 0, &forged),
            Err(CoreError::ConfirmationMismatch { .. })
        ));

        let removed = sections
            .delete_item(SectionName::Tools, 1, &confirm_rake)
            .unwrap();
        assert_eq!(removed.name, "Rake");
        assert_eq!(sections.tools.len(), 1);
    }

    #[test]
    fn test_aggregate_counts_verified_only() {
        let tax = TaxRules::default();
        let mut sections = ledger_with(SectionName::Pumps, &["Pump hose", "Pump"]);
        for index in 0..2 {
            sections
                .update_field(
                    SectionName::Pumps,
                    index,
                    ItemField::EstimatedPrice(Money::from_dollars(100)),
                    &tax,
                )
                .unwrap();
            sections
                .update_field(SectionName::Pumps, index, ItemField::Usage(Usage::PerJob), &tax)
                .unwrap();
            sections
                .update_field(
                    SectionName::Pumps,
                    index,
                    ItemField::ActualPrice(Money::from_dollars(100)),
                    &tax,
                )
                .unwrap();
            sections
                .update_field(SectionName::Pumps, index, ItemField::Quantity(3), &tax)
                .unwrap();
        }
        // Only the second item is verified.
        for _ in 0..4 {
            sections.cycle_status(SectionName::Pumps, 1).unwrap();
        }

        let aggregate = sections.aggregate(Scope::Section(SectionName::Pumps));
        assert_eq!(aggregate.count, 2);
        assert_eq!(aggregate.verified_count, 1);
        assert_eq!(aggregate.total, Money::from_dollars(300));

        let summary = sections.summary();
        assert_eq!(summary.per_job_total, Money::from_dollars(300));
        assert_eq!(summary.one_time_total, Money::zero());
        assert_eq!(
            sections.aggregate(Scope::Category(Category::Pool)).total,
            Money::from_dollars(300)
        );
        assert_eq!(sections.aggregate(Scope::Section(SectionName::Tools)).count, 0);
    }

    #[test]
    fn test_find_by_id() {
        let sections = ledger_with(SectionName::Hardware, &["Bolt", "Nut"]);
        let id = sections.hardware[1].id.clone();
        assert_eq!(sections.find_by_id(&id), Some((SectionName::Hardware, 1)));
        assert_eq!(sections.find_by_id("missing"), None);
    }
}
