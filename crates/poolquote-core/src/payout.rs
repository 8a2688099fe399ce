//! # Payout Calculator
//!
//! Internal cost breakdown for a quoted job: materials, installer pay,
//! helper pay, and the resulting profit.
//!
//! ## One Revenue Figure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   compute_quote(config, selection) ──► Quote ──┬──► customer sees total │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                     compute_payout(config, selection, &quote)           │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                              profit = quote.total − costs               │
//! │                                                                         │
//! │   The payout never re-derives the total, so profit and the customer    │
//! │   price cannot drift apart.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Site Ready
//! Base installation labor includes standard ground leveling. When the
//! customer prepared the site, that work is not performed: the site-prep
//! bonus and its helper surcharge come back out of labor.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::PricingConfiguration;
use crate::quote::{Quote, Selection};

// Helper time per add-on. Fixed, not admin-editable.
pub const HELPER_SURCHARGE_SALT: Money = Money::from_dollars(30);
pub const HELPER_SURCHARGE_HEATING: Money = Money::from_dollars(45);
pub const HELPER_SURCHARGE_SITE_PREP: Money = Money::from_dollars(30);
pub const HELPER_SURCHARGE_SHADE: Money = Money::from_dollars(30);

/// A labeled cost line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CostLine {
    pub label: String,
    pub amount: Money,
}

impl CostLine {
    fn new(label: impl Into<String>, amount: Money) -> Self {
        CostLine {
            label: label.into(),
            amount,
        }
    }
}

/// Materials, labor and profit for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PayoutBreakdown {
    /// The quote total this breakdown was computed against.
    pub revenue: Money,
    pub materials: Vec<CostLine>,
    pub material_total: Money,
    pub installer: Vec<CostLine>,
    pub installer_total: Money,
    pub helper: Vec<CostLine>,
    pub helper_total: Money,
    /// `installer_total + helper_total`.
    pub labor_total: Money,
    pub profit: Money,
    /// `profit / revenue` in basis points, 0 when revenue is 0. Negative on a
    /// losing job.
    pub margin_bps: i64,
}

impl PayoutBreakdown {
    pub fn total_costs(&self) -> Money {
        self.material_total + self.labor_total
    }

    /// Margin as a percentage (for display only).
    pub fn margin_percentage(&self) -> f64 {
        self.margin_bps as f64 / 100.0
    }
}

/// Computes the payout for the job the customer was quoted.
pub fn compute_payout(
    config: &PricingConfiguration,
    selection: &Selection,
    quote: &Quote,
) -> PayoutBreakdown {
    let selection = selection.effective();
    let rates = &config.labor_rates;
    let costs = &config.base_costs;

    let mut materials = vec![CostLine::new(
        format!("{} tank, pump and hardware", selection.package),
        config.package_material_costs.get(selection.package),
    )];
    let mut installer = vec![CostLine::new("Base installation", rates.base_installation)];
    let mut helper = vec![CostLine::new("Helper", rates.helper)];

    if selection.add_saltwater {
        materials.push(CostLine::new("Salt system", costs.salt_system));
        installer.push(CostLine::new("Salt system bonus", rates.salt_system));
        helper.push(CostLine::new("Salt system time", HELPER_SURCHARGE_SALT));
    }
    if selection.add_heating {
        materials.push(CostLine::new("Heating system", costs.heating_system));
        installer.push(CostLine::new("Heating system bonus", rates.heating_system));
        helper.push(CostLine::new("Heating system time", HELPER_SURCHARGE_HEATING));
    }
    if selection.add_site_prep {
        materials.push(CostLine::new("Site prep materials", costs.site_prep));
        installer.push(CostLine::new("Site prep bonus", rates.site_prep));
        helper.push(CostLine::new("Site prep time", HELPER_SURCHARGE_SITE_PREP));
    }
    if selection.add_shade {
        materials.push(CostLine::new("Shade structure", costs.shade));
        installer.push(CostLine::new("Shade bonus", rates.shade_system));
        helper.push(CostLine::new("Shade time", HELPER_SURCHARGE_SHADE));
    }
    if selection.site_ready {
        installer.push(CostLine::new(
            "Site ready (no site prep)",
            Money::zero() - rates.site_prep,
        ));
        helper.push(CostLine::new(
            "Site ready (no site prep)",
            Money::zero() - HELPER_SURCHARGE_SITE_PREP,
        ));
    }
    if selection.review_bonus {
        installer.push(CostLine::new("Review bonus", rates.review_bonus));
    }
    if selection.speed_bonus {
        installer.push(CostLine::new("Speed bonus", rates.speed_bonus));
    }

    let material_total: Money = materials.iter().map(|line| line.amount).sum();
    let installer_total: Money = installer.iter().map(|line| line.amount).sum();
    let helper_total: Money = helper.iter().map(|line| line.amount).sum();
    let labor_total = installer_total + helper_total;

    let revenue = quote.total;
    let profit = revenue - (material_total + labor_total);
    let margin_bps = if revenue.is_positive() {
        ((profit.cents() as i128 * 10000) / revenue.cents() as i128) as i64
    } else {
        0
    };

    PayoutBreakdown {
        revenue,
        materials,
        material_total,
        installer,
        installer_total,
        helper,
        helper_total,
        labor_total,
        profit,
        margin_bps,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
