//! # Default Catalog
//!
//! The catalog a brand-new workspace starts from, and the source merge uses
//! to heal empty remote sections.
//!
//! Template ids are UUID v5 of the item name under a fixed namespace, so
//! every device that bootstraps from the template produces the same ids.
//! Names are unique across the whole template.

use uuid::Uuid;

use crate::ledger::Sections;
use crate::money::Money;
use crate::types::{CatalogItem, Category, ItemStatus, Location, SectionName, Usage};
use crate::types::{Category as C, Location as L, Usage as U};

/// Namespace for template item ids.
const TEMPLATE_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a8e_4b7d_4e0a_9c35_8d2f_71a4_b6e3);

/// Deterministic id of a template item.
pub fn template_item_id(name: &str) -> String {
    Uuid::new_v5(&TEMPLATE_NAMESPACE, name.as_bytes()).to_string()
}

struct Seed {
    name: &'static str,
    dollars: i64,
    quantity: u32,
    usage: Usage,
    location: Location,
    category: Category,
}

const fn seed(
    name: &'static str,
    dollars: i64,
    quantity: u32,
    usage: Usage,
    location: Location,
    category: Category,
) -> Seed {
    Seed {
        name,
        dollars,
        quantity,
        usage,
        location,
        category,
    }
}

impl Seed {
    fn build(&self) -> CatalogItem {
        CatalogItem {
            id: template_item_id(self.name),
            name: self.name.to_string(),
            category: Some(self.category),
            estimated_price: Money::from_dollars(self.dollars),
            actual_price: Money::zero(),
            quantity: self.quantity,
            usage: self.usage,
            location: self.location,
            status: ItemStatus::Pending,
            link: String::new(),
            notes: String::new(),
            receipt_photo: None,
            purchase_date: None,
        }
    }
}

const CLIFF: &[Seed] = &[
    seed("First install 8ft frame pool kit", 650, 1, U::OneTime, L::Online, C::Pool),
    seed("First install sand filter pump", 250, 1, U::OneTime, L::Online, C::Pool),
    seed("First install salt chlorinator", 300, 1, U::OneTime, L::Online, C::Pool),
    seed("First install gravel base", 120, 1, U::OneTime, L::Local, C::SitePrep),
    seed("Landscape fabric roll", 40, 1, U::OneTime, L::Local, C::SitePrep),
];

const TOOLS: &[Seed] = &[
    seed("Hand tamper", 45, 1, U::Reusable, L::Local, C::SitePrep),
    seed("Steel garden rake", 30, 1, U::Reusable, L::Local, C::SitePrep),
    seed("Flat shovel", 35, 2, U::Reusable, L::Local, C::SitePrep),
    seed("Wheelbarrow", 90, 1, U::Reusable, L::Local, C::SitePrep),
];

/// Tools bought after the template was first published. Merge appends any
/// of these missing from the tools section.
const NEWLY_PURCHASED_TOOLS: &[Seed] = &[
    seed("Laser level", 120, 1, U::OneTime, L::Online, C::SitePrep),
    seed("Cordless impact driver", 160, 1, U::OneTime, L::Local, C::Deck),
    seed("Pool vacuum head", 35, 1, U::OneTime, L::Online, C::Pool),
];

const TANKS: &[Seed] = &[
    seed("6ft frame pool tank", 420, 1, U::PerJob, L::Online, C::Pool),
    seed("8ft frame pool tank", 560, 1, U::PerJob, L::Online, C::Pool),
    seed("10ft frame pool tank", 780, 1, U::PerJob, L::Online, C::Pool),
];

const PUMPS: &[Seed] = &[
    seed("SX2800 sand filter pump", 250, 1, U::PerJob, L::Online, C::Pool),
    seed("Filter sand 50 lb", 25, 1, U::Consumable, L::Local, C::Pool),
];

const SALT: &[Seed] = &[
    seed("Saltwater chlorinator", 285, 1, U::PerJob, L::Online, C::Pool),
    seed("Pool salt 40 lb", 10, 3, U::Consumable, L::Local, C::Pool),
];

const HEATING: &[Seed] = &[
    seed("Electric pool heater", 420, 1, U::PerJob, L::Online, C::Pool),
    seed("Heater GFCI breaker", 45, 1, U::PerJob, L::Local, C::Electrical),
];

const SITEPREP: &[Seed] = &[
    seed("Pea gravel per yard", 45, 2, U::PerJob, L::Local, C::SitePrep),
    seed("Leveling sand per yard", 40, 1, U::PerJob, L::Local, C::SitePrep),
    seed("Landscape fabric", 25, 1, U::PerJob, L::Local, C::SitePrep),
];

const HARDWARE: &[Seed] = &[
    seed("Hose clamps pack", 12, 1, U::Consumable, L::Local, C::Plumbing),
    seed("1.5in PVC fittings", 18, 1, U::Consumable, L::Local, C::Plumbing),
    seed("Outdoor outlet cover", 25, 1, U::PerJob, L::Local, C::Electrical),
];

fn build(seeds: &[Seed]) -> Vec<CatalogItem> {
    seeds.iter().map(Seed::build).collect()
}

/// Default items of one section.
pub fn default_section(section: SectionName) -> Vec<CatalogItem> {
    match section {
        SectionName::Cliff => build(CLIFF),
        SectionName::Tools => {
            let mut tools = build(TOOLS);
            tools.extend(build(NEWLY_PURCHASED_TOOLS));
            tools
        }
        SectionName::Tanks => build(TANKS),
        SectionName::Pumps => build(PUMPS),
        SectionName::Salt => build(SALT),
        SectionName::Heating => build(HEATING),
        SectionName::SitePrep => build(SITEPREP),
        SectionName::Hardware => build(HARDWARE),
    }
}

/// The full default catalog.
pub fn default_sections() -> Sections {
    let mut sections = Sections::default();
    for section in SectionName::ALL {
        *sections.get_mut(section) = default_section(section);
    }
    sections
}

/// Tools to top up into the tools section after every merge.
pub fn newly_purchased_tools() -> Vec<CatalogItem> {
    build(NEWLY_PURCHASED_TOOLS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_deterministic() {
        let a = default_sections();
        let b = default_sections();
        assert_eq!(a, b);
        assert_eq!(a.cliff[0].id, template_item_id("First install 8ft frame pool kit"));
    }

    #[test]
    fn test_names_and_ids_are_unique() {
        let sections = default_sections();
        let names: HashSet<_> = sections.iter().map(|(_, item)| item.name.clone()).collect();
        let ids: HashSet<_> = sections.iter().map(|(_, item)| item.id.clone()).collect();
        assert_eq!(names.len(), sections.len());
        assert_eq!(ids.len(), sections.len());
    }

    #[test]
    fn test_every_section_has_items() {
        let sections = default_sections();
        for section in SectionName::ALL {
            assert!(!sections.get(section).is_empty(), "{} is empty", section);
        }
    }

    #[test]
    fn test_tools_include_newly_purchased() {
        let tools = default_section(SectionName::Tools);
        for tool in newly_purchased_tools() {
            assert!(tools.iter().any(|t| t.id == tool.id));
        }
    }

    #[test]
    fn test_template_starts_unspent() {
        let sections = default_sections();
        assert!(sections
            .iter()
            .all(|(_, item)| item.status == ItemStatus::Pending && item.actual_price.is_zero()));
    }
}
