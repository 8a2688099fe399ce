//! # Keyword Categorization
//!
//! Assigns a default [`Category`] from an item's name and notes.
//!
//! Categories are stored on each item. This classifier only runs when an
//! item is created without one, and once on load for snapshots written
//! before the field existed. It is never re-run on stored items, so a user
//! correction survives.
//!
//! ## Matching
//! Lists are checked in a fixed order and the first hit wins, so
//! "Pool shovel" is `pool`, not `siteprep`. No hit means `pool`.

use crate::types::{CatalogItem, Category};

/// Checked in this order.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Pool,
        &[
            "pool", "tank", "pump", "filter", "liner", "chlorine", "skimmer", "ladder", "heater",
            "salt",
        ],
    ),
    (
        Category::Electrical,
        &[
            "electrical", "wire", "wiring", "outlet", "gfci", "breaker", "conduit", "extension cord",
            "timer",
        ],
    ),
    (
        Category::Plumbing,
        &["pipe", "pvc", "hose", "fitting", "valve", "plumbing", "drain", "clamp"],
    ),
    (
        Category::Deck,
        &["deck", "lumber", "board", "screw", "stain", "joist", "railing"],
    ),
    (
        Category::SitePrep,
        &[
            "gravel", "sand", "level", "excavat", "dirt", "paver", "tamper", "shovel", "rake",
            "site prep", "landscape fabric",
        ],
    ),
    (
        Category::Labor,
        &["labor", "helper", "install", "crew", "jorge"],
    ),
];

/// Classifies by keyword over `name` and `notes`, case-insensitive.
///
/// ```rust
/// use poolquote_core::category::categorize;
/// use poolquote_core::types::Category;
///
/// assert_eq!(categorize("GFCI outlet", ""), Category::Electrical);
/// assert_eq!(categorize("Mystery item", ""), Category::Pool);
/// ```
pub fn categorize(name: &str, notes: &str) -> Category {
    let haystack = format!("{} {}", name, notes).to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|word| haystack.contains(word)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Pool)
}

/// Fills in the category of every item that has none. Returns how many
/// items changed.
pub fn backfill<'a>(items: impl IntoIterator<Item = &'a mut CatalogItem>) -> usize {
    let mut filled = 0;
    for item in items {
        if item.category.is_none() {
            item.category = Some(categorize(&item.name, &item.notes));
            filled += 1;
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_category() {
        assert_eq!(categorize("Intex 8ft tank", ""), Category::Pool);
        assert_eq!(categorize("12/2 wire, 50ft", ""), Category::Electrical);
        assert_eq!(categorize("1.5in PVC", ""), Category::Plumbing);
        assert_eq!(categorize("Pressure treated lumber", ""), Category::Deck);
        assert_eq!(categorize("Pea gravel", ""), Category::SitePrep);
        assert_eq!(categorize("Helper day rate", ""), Category::Labor);
    }

    #[test]
    fn test_first_match_wins() {
        // "pool" is checked before "shovel".
        assert_eq!(categorize("Pool shovel", ""), Category::Pool);
    }

    #[test]
    fn test_notes_are_searched() {
        assert_eq!(categorize("Misc", "for the deck"), Category::Deck);
    }

    #[test]
    fn test_backfill_keeps_explicit_categories() {
        let json = serde_json::json!([
            {"name": "Pea gravel"},
            {"name": "Pea gravel", "category": "deck"}
        ]);
        let mut items: Vec<CatalogItem> = serde_json::from_value(json).unwrap();

        assert_eq!(backfill(items.iter_mut()), 1);
        assert_eq!(items[0].category, Some(Category::SitePrep));
        assert_eq!(items[1].category, Some(Category::Deck));
        assert_eq!(backfill(items.iter_mut()), 0);
    }
}
