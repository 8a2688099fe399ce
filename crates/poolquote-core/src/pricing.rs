//! # Pricing Configuration
//!
//! The admin-tunable configuration every calculator reads from.
//!
//! ## What Lives Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     PricingConfiguration                                │
//! │                                                                         │
//! │  CUSTOMER-FACING (fixed list prices)     INTERNAL (never shown)         │
//! │  ─────────────────────────────────       ──────────────────────────     │
//! │  customer_pricing.pools   6/8/10ft       package_material_costs         │
//! │  customer_pricing.addons                 base_costs (add-on materials)  │
//! │  site_ready_discount ($400)              labor_rates ("jorgeRates")     │
//! │                                          margins (admin comparison)     │
//! │                                                                         │
//! │  OPERATIONAL                             LEDGER                         │
//! │  ─────────────────────────────────       ──────────────────────────     │
//! │  inventory_levels ("inventory")          tax (rate + exemptions)        │
//! │  lead_times                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Customer Prices Are Literal
//! The quote calculator reads `customer_pricing` as-is. Margins feed only
//! [`suggested_price`], which the admin page shows next to the list price
//! for comparison. Editing a margin never changes a quote.
//!
//! ## Admin Blob
//! The admin page persists only `{margins, jorgeRates, inventory, leadTimes,
//! baseCosts}` ([`AdminConfigPatch`]). At startup the blob is shallow-merged
//! onto the defaults: each present sub-object replaces the default one whole.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::quote::Selection;
use crate::types::{PackageType, Percent, TaxRate, Usage};
use crate::validation::{validate_margin, ValidationResult};

/// Lower bound of the margin band.
pub const MARGIN_FLOOR: Percent = Percent::from_whole(35);

/// Upper bound of the margin band.
pub const MARGIN_CEILING: Percent = Percent::from_whole(80);

// =============================================================================
// Margins
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct Margins {
    pub global: Percent,
    pub materials: Percent,
    pub addons: Percent,
    pub siteprep: Percent,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            global: Percent::from_whole(50),
            materials: Percent::from_whole(45),
            addons: Percent::from_whole(60),
            siteprep: Percent::from_whole(50),
        }
    }
}

impl Margins {
    /// Sets the global margin and rescales the other three proportionally.
    ///
    /// ## Rescale
    /// ```text
    /// global 50% → 60%
    ///   materials 45% × 60/50 = 54%
    ///   addons    60% × 60/50 = 72%
    ///   siteprep  50% × 60/50 = 60%
    /// every result clamped into [35%, 80%]
    /// ```
    /// When the old global is zero there is no ratio; the others take the
    /// new global value.
    pub fn set_global(&mut self, requested: Percent) -> ValidationResult<()> {
        validate_margin(requested)?;

        let old = self.global.bps() as u64;
        let new = clamp_margin(requested);

        let rescale = |other: Percent| -> Percent {
            if old == 0 {
                return new;
            }
            let scaled = (other.bps() as u64 * new.bps() as u64 + old / 2) / old;
            clamp_margin(Percent::from_bps(scaled.min(u32::MAX as u64) as u32))
        };

        self.materials = rescale(self.materials);
        self.addons = rescale(self.addons);
        self.siteprep = rescale(self.siteprep);
        self.global = new;
        Ok(())
    }
}

fn clamp_margin(margin: Percent) -> Percent {
    margin.clamp(MARGIN_FLOOR, MARGIN_CEILING)
}

/// Price that yields `margin` on `cost`: `cost / (1 − margin)`.
///
/// ```rust
/// use poolquote_core::money::Money;
/// use poolquote_core::pricing::suggested_price;
/// use poolquote_core::types::Percent;
///
/// let price = suggested_price(Money::from_dollars(285), Percent::from_whole(50));
/// assert_eq!(price, Money::from_dollars(570));
/// ```
pub fn suggested_price(cost: Money, margin: Percent) -> Money {
    let remainder = 10000 - margin.bps().min(9999) as i64;
    cost.scale(10000, remainder)
}

// =============================================================================
// Labor Rates
// =============================================================================

/// Installer payout rates. Persisted as `jorgeRates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct LaborRates {
    pub base_installation: Money,
    pub site_prep: Money,
    pub salt_system: Money,
    pub heating_system: Money,
    pub shade_system: Money,
    pub review_bonus: Money,
    pub speed_bonus: Money,
    pub helper: Money,
}

impl Default for LaborRates {
    fn default() -> Self {
        LaborRates {
            base_installation: Money::from_dollars(400),
            site_prep: Money::from_dollars(150),
            salt_system: Money::from_dollars(75),
            heating_system: Money::from_dollars(100),
            shade_system: Money::from_dollars(75),
            review_bonus: Money::from_dollars(50),
            speed_bonus: Money::from_dollars(50),
            helper: Money::from_dollars(120),
        }
    }
}

// =============================================================================
// Inventory Levels
// =============================================================================

/// Components on hand. Independent of the ledger's catalog items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryLevels {
    #[serde(rename = "tanks6ft")]
    pub tanks_6ft: u32,
    #[serde(rename = "tanks8ft")]
    pub tanks_8ft: u32,
    #[serde(rename = "tanks10ft")]
    pub tanks_10ft: u32,
    #[serde(rename = "pumpsSX2800")]
    pub pumps_sx2800: u32,
    pub salt_systems: u32,
    pub heating_systems: u32,
}

impl Default for InventoryLevels {
    fn default() -> Self {
        InventoryLevels {
            tanks_6ft: 2,
            tanks_8ft: 3,
            tanks_10ft: 1,
            pumps_sx2800: 4,
            salt_systems: 2,
            heating_systems: 1,
        }
    }
}

impl InventoryLevels {
    pub fn tanks(&self, package: PackageType) -> u32 {
        match package {
            PackageType::SixFoot => self.tanks_6ft,
            PackageType::EightFoot => self.tanks_8ft,
            PackageType::TenFoot => self.tanks_10ft,
        }
    }

    /// Components the selection needs, with how many are on hand.
    fn needed(&self, selection: &Selection) -> Vec<(Component, u32)> {
        let mut needed = vec![
            (Component::Tank, self.tanks(selection.package)),
            (Component::Pump, self.pumps_sx2800),
        ];
        if selection.add_saltwater {
            needed.push((Component::SaltSystem, self.salt_systems));
        }
        if selection.add_heating {
            needed.push((Component::HeatingSystem, self.heating_systems));
        }
        needed
    }

    /// How many complete installs of this selection can start today.
    pub fn ready_to_install(&self, selection: &Selection) -> u32 {
        self.needed(selection)
            .into_iter()
            .map(|(_, on_hand)| on_hand)
            .min()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Tank,
    Pump,
    SaltSystem,
    HeatingSystem,
}

/// Stock label shown next to each inventory count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 0 → out of stock, 1-2 → low stock, otherwise in stock.
pub fn stock_status(quantity: u32) -> StockStatus {
    match quantity {
        0 => StockStatus::OutOfStock,
        1..=2 => StockStatus::LowStock,
        _ => StockStatus::InStock,
    }
}

// =============================================================================
// Lead Times
// =============================================================================

/// Supplier lead times in days. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct LeadTimes {
    pub local: u32,
    pub online: u32,
    pub specialty: u32,
}

impl Default for LeadTimes {
    fn default() -> Self {
        LeadTimes {
            local: 2,
            online: 7,
            specialty: 21,
        }
    }
}

// =============================================================================
// Customer Pricing & Costs
// =============================================================================

/// One amount per pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PerPackage {
    #[serde(rename = "6ft")]
    pub six_foot: Money,
    #[serde(rename = "8ft")]
    pub eight_foot: Money,
    #[serde(rename = "10ft")]
    pub ten_foot: Money,
}

impl PerPackage {
    pub fn get(&self, package: PackageType) -> Money {
        match package {
            PackageType::SixFoot => self.six_foot,
            PackageType::EightFoot => self.eight_foot,
            PackageType::TenFoot => self.ten_foot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonPrices {
    pub saltwater: Money,
    pub heating: Money,
    pub premium_site: Money,
    pub shade: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerPricing {
    pub pools: PerPackage,
    pub addons: AddonPrices,
}

impl Default for CustomerPricing {
    fn default() -> Self {
        CustomerPricing {
            pools: PerPackage {
                six_foot: Money::from_dollars(2295),
                eight_foot: Money::from_dollars(2795),
                ten_foot: Money::from_dollars(3495),
            },
            addons: AddonPrices {
                saltwater: Money::from_dollars(697),
                heating: Money::from_dollars(1295),
                premium_site: Money::from_dollars(400),
                shade: Money::from_dollars(495),
            },
        }
    }
}

/// Material cost baselines for add-ons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct BaseCosts {
    pub salt_system: Money,
    pub heating_system: Money,
    pub site_prep: Money,
    pub shade: Money,
}

impl Default for BaseCosts {
    fn default() -> Self {
        BaseCosts {
            salt_system: Money::from_dollars(285),
            heating_system: Money::from_dollars(420),
            site_prep: Money::from_dollars(120),
            shade: Money::from_dollars(180),
        }
    }
}

fn default_package_material_costs() -> PerPackage {
    PerPackage {
        six_foot: Money::from_dollars(1050),
        eight_foot: Money::from_dollars(1250),
        ten_foot: Money::from_dollars(1550),
    }
}

// =============================================================================
// Tax Rules
// =============================================================================

/// Sales tax applied to entered actual prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxRules {
    pub rate: TaxRate,
    /// Case-insensitive substrings of the item name that mark it untaxed.
    pub exempt_keywords: Vec<String>,
    /// Usages bought under the resale exemption.
    pub exempt_usages: Vec<Usage>,
}

impl Default for TaxRules {
    fn default() -> Self {
        TaxRules {
            rate: TaxRate::from_bps(825),
            exempt_keywords: ["labor", "service", "delivery", "installation", "permit", "rental"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            exempt_usages: vec![Usage::PerJob],
        }
    }
}

impl TaxRules {
    pub fn is_taxable(&self, name: &str, usage: Usage) -> bool {
        if self.exempt_usages.contains(&usage) {
            return false;
        }
        let name = name.to_lowercase();
        !self
            .exempt_keywords
            .iter()
            .any(|keyword| name.contains(&keyword.to_lowercase()))
    }

    /// Price to store for an entered retail price.
    pub fn adjust(&self, retail: Money, name: &str, usage: Usage) -> Money {
        if self.is_taxable(name, usage) {
            retail.with_tax(self.rate)
        } else {
            retail
        }
    }
}

// =============================================================================
// Pricing Configuration
// =============================================================================

/// Everything the calculators and the ledger read. Owned by `AppState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfiguration {
    pub margins: Margins,
    #[serde(rename = "jorgeRates")]
    pub labor_rates: LaborRates,
    #[serde(rename = "inventory")]
    pub inventory_levels: InventoryLevels,
    pub lead_times: LeadTimes,
    pub customer_pricing: CustomerPricing,
    pub package_material_costs: PerPackage,
    pub base_costs: BaseCosts,
    pub tax: TaxRules,
    pub site_ready_discount: Money,
}

impl Default for PricingConfiguration {
    fn default() -> Self {
        PricingConfiguration {
            margins: Margins::default(),
            labor_rates: LaborRates::default(),
            inventory_levels: InventoryLevels::default(),
            lead_times: LeadTimes::default(),
            customer_pricing: CustomerPricing::default(),
            package_material_costs: default_package_material_costs(),
            base_costs: BaseCosts::default(),
            tax: TaxRules::default(),
            site_ready_discount: Money::from_dollars(400),
        }
    }
}

impl PricingConfiguration {
    /// Days until the selection can be installed.
    ///
    /// Zero when every component is on hand. Otherwise the longest lead time
    /// among missing components: tanks are specialty orders, pumps and
    /// systems ship from online suppliers.
    pub fn availability_days(&self, selection: &Selection) -> u32 {
        self.inventory_levels
            .needed(selection)
            .into_iter()
            .filter(|(_, on_hand)| *on_hand == 0)
            .map(|(component, _)| match component {
                Component::Tank => self.lead_times.specialty,
                Component::Pump | Component::SaltSystem | Component::HeatingSystem => {
                    self.lead_times.online
                }
            })
            .max()
            .unwrap_or(0)
    }

    /// Shallow-merges an admin blob: each present sub-object replaces the
    /// current one whole.
    pub fn apply_patch(&mut self, patch: AdminConfigPatch) {
        if let Some(margins) = patch.margins {
            self.margins = margins;
        }
        if let Some(rates) = patch.labor_rates {
            self.labor_rates = rates;
        }
        if let Some(inventory) = patch.inventory {
            self.inventory_levels = inventory;
        }
        if let Some(lead_times) = patch.lead_times {
            self.lead_times = lead_times;
        }
        if let Some(base_costs) = patch.base_costs {
            self.base_costs = base_costs;
        }
    }

    /// List price against the margin-derived suggestion for every priced
    /// product. Pools use the materials margin, site prep its own margin,
    /// every other add-on the add-ons margin.
    pub fn price_comparison(&self) -> Vec<PriceComparison> {
        let margins = &self.margins;
        let pools = &self.customer_pricing.pools;
        let addons = &self.customer_pricing.addons;
        let costs = &self.base_costs;

        let mut rows: Vec<PriceComparison> = PackageType::ALL
            .into_iter()
            .map(|package| {
                PriceComparison::new(
                    format!("{} pool", package),
                    self.package_material_costs.get(package),
                    margins.materials,
                    pools.get(package),
                )
            })
            .collect();
        rows.extend([
            PriceComparison::new("Saltwater system", costs.salt_system, margins.addons, addons.saltwater),
            PriceComparison::new("Heating system", costs.heating_system, margins.addons, addons.heating),
            PriceComparison::new("Premium site prep", costs.site_prep, margins.siteprep, addons.premium_site),
            PriceComparison::new("Shade", costs.shade, margins.addons, addons.shade),
        ]);
        rows
    }

    /// The admin-editable subset, as persisted under its own storage key.
    pub fn admin_export(&self) -> AdminConfigPatch {
        AdminConfigPatch {
            margins: Some(self.margins),
            labor_rates: Some(self.labor_rates),
            inventory: Some(self.inventory_levels),
            lead_times: Some(self.lead_times),
            base_costs: Some(self.base_costs),
        }
    }
}

/// One row of the admin pricing comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub product: String,
    pub cost: Money,
    pub margin: Percent,
    pub list_price: Money,
    pub suggested_price: Money,
}

impl PriceComparison {
    fn new(product: impl Into<String>, cost: Money, margin: Percent, list_price: Money) -> Self {
        PriceComparison {
            product: product.into(),
            cost,
            margin,
            list_price,
            suggested_price: suggested_price(cost, margin),
        }
    }

    /// List price minus suggestion. Negative when the list price is below
    /// what the margin asks for.
    pub fn difference(&self) -> Money {
        self.list_price - self.suggested_price
    }
}

// =============================================================================
// Admin Config Blob
// =============================================================================

/// `{margins, jorgeRates, inventory, leadTimes, baseCosts}`; any key may be
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdminConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margins: Option<Margins>,
    #[serde(default, rename = "jorgeRates", skip_serializing_if = "Option::is_none")]
    pub labor_rates: Option<LaborRates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<InventoryLevels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_times: Option<LeadTimes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_costs: Option<BaseCosts>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stock_status_labels() {
        assert_eq!(stock_status(0).label(), "Out of Stock");
        assert_eq!(stock_status(1).label(), "Low Stock");
        assert_eq!(stock_status(2).label(), "Low Stock");
        assert_eq!(stock_status(3).label(), "In Stock");
        assert_eq!(
            serde_json::to_string(&StockStatus::OutOfStock).unwrap(),
            "\"out-of-stock\""
        );
    }

    #[test]
    fn test_set_global_rescales_proportionally() {
        let mut margins = Margins::default();
        margins.set_global(Percent::from_whole(60)).unwrap();

        assert_eq!(margins.global, Percent::from_whole(60));
        assert_eq!(margins.materials, Percent::from_whole(54));
        assert_eq!(margins.addons, Percent::from_whole(72));
        assert_eq!(margins.siteprep, Percent::from_whole(60));
    }

    #[test]
    fn test_set_global_clamps_into_band() {
        let mut margins = Margins::default();
        margins.set_global(Percent::from_whole(75)).unwrap();
        // addons 60 × 75/50 = 90 → 80
        assert_eq!(margins.addons, MARGIN_CEILING);

        margins.set_global(Percent::from_whole(20)).unwrap();
        assert_eq!(margins.global, MARGIN_FLOOR);
        assert!(margins.materials >= MARGIN_FLOOR);

        assert!(margins.set_global(Percent::from_whole(100)).is_err());
    }

    #[test]
    fn test_suggested_price() {
        let cost = Money::from_dollars(1250);
        assert_eq!(
            suggested_price(cost, Percent::from_whole(50)),
            Money::from_dollars(2500)
        );
        assert_eq!(suggested_price(cost, Percent::zero()), cost);
    }

    #[test]
    fn test_price_comparison_uses_section_margins() {
        let config = PricingConfiguration::default();
        let rows = config.price_comparison();
        assert_eq!(rows.len(), 7);

        // $1250 bundle at 45% → $2272.73
        let eight = &rows[1];
        assert_eq!(eight.product, "8ft pool");
        assert_eq!(eight.margin, Percent::from_whole(45));
        assert_eq!(eight.suggested_price.cents(), 227273);
        assert_eq!(eight.list_price, Money::from_dollars(2795));

        // $285 at 60% → $712.50, above the $697 list price
        let salt = rows.iter().find(|row| row.product == "Saltwater system").unwrap();
        assert_eq!(salt.suggested_price.cents(), 71250);
        assert_eq!(salt.difference().cents(), -1550);
    }

    #[test]
    fn test_ready_to_install_takes_minimum() {
        let levels = InventoryLevels::default();
        let mut selection = Selection::new(PackageType::EightFoot);
        // tanks8ft 3, pumps 4
        assert_eq!(levels.ready_to_install(&selection), 3);

        selection.add_heating = true;
        // heating systems 1
        assert_eq!(levels.ready_to_install(&selection), 1);
    }

    #[test]
    fn test_availability_days() {
        let mut config = PricingConfiguration::default();
        let selection = Selection {
            add_saltwater: true,
            ..Selection::new(PackageType::TenFoot)
        };
        assert_eq!(config.availability_days(&selection), 0);

        config.inventory_levels.salt_systems = 0;
        assert_eq!(config.availability_days(&selection), 7);

        config.inventory_levels.tanks_10ft = 0;
        assert_eq!(config.availability_days(&selection), 21);
    }

    #[test]
    fn test_tax_rules() {
        let tax = TaxRules::default();
        assert!(tax.is_taxable("Pool Shovel", Usage::OneTime));
        assert!(!tax.is_taxable("Delivery fee", Usage::OneTime));
        assert!(!tax.is_taxable("Pool Shovel", Usage::PerJob));

        assert_eq!(
            tax.adjust(Money::from_cents(1000), "Pool Shovel", Usage::OneTime).cents(),
            1083
        );
        assert_eq!(
            tax.adjust(Money::from_cents(1000), "Helper labor", Usage::OneTime).cents(),
            1000
        );
    }

    #[test]
    fn test_admin_patch_replaces_whole_sub_objects() {
        let mut config = PricingConfiguration::default();
        config.inventory_levels.tanks_6ft = 9;

        // Only margins present, and only one margin inside it.
        let patch: AdminConfigPatch =
            serde_json::from_str(r#"{"margins": {"global": 7000}}"#).unwrap();
        config.apply_patch(patch);

        assert_eq!(config.margins.global, Percent::from_whole(70));
        // The rest of the margins object came from the blob (defaults), not
        // from the previous in-memory values.
        assert_eq!(config.margins.materials, Margins::default().materials);
        // Absent sub-objects are untouched.
        assert_eq!(config.inventory_levels.tanks_6ft, 9);
        assert_eq!(config.labor_rates, LaborRates::default());
    }

    #[test]
    fn test_admin_export_wire_keys() {
        let blob = serde_json::to_value(PricingConfiguration::default().admin_export()).unwrap();
        assert!(blob.get("jorgeRates").is_some());
        assert!(blob.get("inventory").is_some());
        assert!(blob.get("leadTimes").is_some());
        assert!(blob.get("baseCosts").is_some());
        assert_eq!(blob["inventory"]["pumpsSX2800"], 4);
        assert_eq!(blob["jorgeRates"]["baseInstallation"], 40000);
    }
}
