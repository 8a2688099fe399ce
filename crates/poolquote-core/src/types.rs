//! # Domain Types
//!
//! Core domain types used throughout PoolQuote.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CatalogItem    │   │  SectionName    │   │  PackageType    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  cliff          │   │  6ft            │       │
//! │  │  name           │   │  tools, tanks   │   │  8ft            │       │
//! │  │  actual_price   │   │  pumps, salt    │   │  10ft           │       │
//! │  │  quantity       │   │  heating, ...   │   └─────────────────┘       │
//! │  │  status         │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ TaxRate/Percent │   │   ItemStatus    │   │ Usage/Location  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  pending ─► ... │   │  one-time       │       │
//! │  │  825 = 8.25%    │   │  ─► verified ─┐ │   │  per-job, ...   │       │
//! │  └─────────────────┘   │  ◄────────────┘ │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every catalog item carries a stable `id` assigned at creation. Items from
//! the built-in template use UUID v5 derived from their name, so two devices
//! bootstrapping independently agree on the same ids. Names are display data
//! and may be edited freely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 825 bps = 8.25% (Texas sales tax, the default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A percentage in basis points, used for margins and discounts.
///
/// `Percent::from_whole(10)` and `Percent::from_bps(1000)` are both 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percent from a whole number (`35` = 35%).
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percent(pct * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Package Type
// =============================================================================

/// The pool size a customer is quoted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PackageType {
    #[serde(rename = "6ft")]
    SixFoot,
    #[serde(rename = "8ft")]
    EightFoot,
    #[serde(rename = "10ft")]
    TenFoot,
}

impl PackageType {
    pub const ALL: [PackageType; 3] = [
        PackageType::SixFoot,
        PackageType::EightFoot,
        PackageType::TenFoot,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PackageType::SixFoot => "6ft",
            PackageType::EightFoot => "8ft",
            PackageType::TenFoot => "10ft",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "6ft" => Ok(PackageType::SixFoot),
            "8ft" => Ok(PackageType::EightFoot),
            "10ft" => Ok(PackageType::TenFoot),
            other => Err(CoreError::InvalidPackage(other.to_string())),
        }
    }
}

// =============================================================================
// Section Name
// =============================================================================

/// The eight fixed ledger sections.
///
/// `Cliff` is the first-install section: every verified item in it counts
/// toward the initial investment regardless of usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SectionName {
    Cliff,
    Tools,
    Tanks,
    Pumps,
    Salt,
    Heating,
    SitePrep,
    Hardware,
}

impl SectionName {
    /// Display and export order.
    pub const ALL: [SectionName; 8] = [
        SectionName::Cliff,
        SectionName::Tools,
        SectionName::Tanks,
        SectionName::Pumps,
        SectionName::Salt,
        SectionName::Heating,
        SectionName::SitePrep,
        SectionName::Hardware,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SectionName::Cliff => "cliff",
            SectionName::Tools => "tools",
            SectionName::Tanks => "tanks",
            SectionName::Pumps => "pumps",
            SectionName::Salt => "salt",
            SectionName::Heating => "heating",
            SectionName::SitePrep => "siteprep",
            SectionName::Hardware => "hardware",
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SectionName::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or(CoreError::InvalidSectionOrIndex {
                section: s.to_string(),
                index: 0,
            })
    }
}

// =============================================================================
// Usage / Location
// =============================================================================

/// How an item is consumed by the business.
///
/// Usage decides the cost bucket (`OneTime` tooling vs. `PerJob` materials)
/// and whether the resale tax exemption applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum Usage {
    OneTime,
    PerJob,
    Reusable,
    Consumable,
}

impl Usage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Usage::OneTime => "one-time",
            Usage::PerJob => "per-job",
            Usage::Reusable => "reusable",
            Usage::Consumable => "consumable",
        }
    }
}

impl Default for Usage {
    fn default() -> Self {
        Usage::OneTime
    }
}

impl FromStr for Usage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "one-time" => Ok(Usage::OneTime),
            "per-job" => Ok(Usage::PerJob),
            "reusable" => Ok(Usage::Reusable),
            "consumable" => Ok(Usage::Consumable),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "usage".to_string(),
                    reason: format!("unknown usage '{}'", other),
                },
            )),
        }
    }
}

/// Where an item is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Online,
    Local,
    Both,
    Owned,
}

impl Location {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Location::Online => "online",
            Location::Local => "local",
            Location::Both => "both",
            Location::Owned => "owned",
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::Local
    }
}

impl FromStr for Location {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "online" => Ok(Location::Online),
            "local" => Ok(Location::Local),
            "both" => Ok(Location::Both),
            "owned" => Ok(Location::Owned),
            other => Err(CoreError::Validation(
                crate::error::ValidationError::InvalidFormat {
                    field: "location".to_string(),
                    reason: format!("unknown location '{}'", other),
                },
            )),
        }
    }
}

// =============================================================================
// Item Status
// =============================================================================

/// Purchase lifecycle of a catalog item.
///
/// ## Cycle
/// ```text
/// pending ──► ordered ──► purchased ──► partial ──► verified
///    ▲                                                  │
///    └──────────────────────────────────────────────────┘
/// ```
/// The cycle is the only permitted transition. Only `Verified` items count
/// toward any financial total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Ordered,
    Purchased,
    Partial,
    Verified,
}

impl ItemStatus {
    /// The next status in the cycle.
    pub const fn next(&self) -> ItemStatus {
        match self {
            ItemStatus::Pending => ItemStatus::Ordered,
            ItemStatus::Ordered => ItemStatus::Purchased,
            ItemStatus::Purchased => ItemStatus::Partial,
            ItemStatus::Partial => ItemStatus::Verified,
            ItemStatus::Verified => ItemStatus::Pending,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Ordered => "ordered",
            ItemStatus::Purchased => "purchased",
            ItemStatus::Partial => "partial",
            ItemStatus::Verified => "verified",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Pending
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(ItemStatus::Pending),
            "ordered" => Ok(ItemStatus::Ordered),
            "purchased" => Ok(ItemStatus::Purchased),
            "partial" => Ok(ItemStatus::Partial),
            "verified" => Ok(ItemStatus::Verified),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// Reporting category of a catalog item.
///
/// Set explicitly at creation. See [`crate::category`] for the keyword
/// classifier used as a default and for backfilling old snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pool,
    Electrical,
    Plumbing,
    Deck,
    SitePrep,
    Labor,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Pool,
        Category::Electrical,
        Category::Plumbing,
        Category::Deck,
        Category::SitePrep,
        Category::Labor,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Pool => "pool",
            Category::Electrical => "electrical",
            Category::Plumbing => "plumbing",
            Category::Deck => "deck",
            Category::SitePrep => "siteprep",
            Category::Labor => "labor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A purchasable or trackable unit of material, tool, or labor.
///
/// Serialized in camelCase to match the stored snapshot shape; money fields
/// are integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Stable identifier. Snapshots written before ids existed get a fresh
    /// v4 id on load.
    #[serde(default = "new_item_id")]
    pub id: String,

    pub name: String,

    /// Explicit category. `None` only for legacy items awaiting backfill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default)]
    pub estimated_price: Money,

    /// Price actually paid, after tax adjustment.
    #[serde(default)]
    pub actual_price: Money,

    #[serde(default)]
    pub quantity: u32,

    #[serde(default)]
    pub usage: Usage,

    #[serde(default)]
    pub location: Location,

    #[serde(default)]
    pub status: ItemStatus,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub notes: String,

    /// Base64-encoded receipt image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_photo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub purchase_date: Option<DateTime<Utc>>,
}

/// Generates a fresh item id (UUID v4).
pub fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl CatalogItem {
    /// The amount this item adds to financial aggregates when verified.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.actual_price.multiply_quantity(self.quantity)
    }

    #[inline]
    pub fn is_verified(&self) -> bool {
        self.status == ItemStatus::Verified
    }

    /// Explicit category, falling back to keyword classification.
    pub fn effective_category(&self) -> Category {
        self.category
            .unwrap_or_else(|| crate::category::categorize(&self.name, &self.notes))
    }

    /// Pulls quantity and prices back into their allowed ranges. Returns
    /// whether anything changed.
    pub fn clamp_to_limits(&mut self) -> bool {
        let max_quantity = crate::MAX_ITEM_QUANTITY as u32;
        let max_price = Money::from_cents(crate::MAX_PRICE_CENTS);
        let before = (self.quantity, self.estimated_price, self.actual_price);

        self.quantity = self.quantity.min(max_quantity);
        self.estimated_price = self.estimated_price.clamp(Money::zero(), max_price);
        self.actual_price = self.actual_price.clamp(Money::zero(), max_price);

        before != (self.quantity, self.estimated_price, self.actual_price)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
