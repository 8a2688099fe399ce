//! # Quote Calculator
//!
//! Turns a package selection into the customer-facing quote.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Selection { package: 8ft, saltwater, discount: 10% }                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  site_ready? ──yes──► add_site_prep forced OFF                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal = pools[8ft] + Σ enabled addons        $2795 + $697 = $3492   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount = subtotal × 10% (+ $400 if site ready)             $349.20   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total = max(subtotal − discount, 0)                         $3142.80   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  deposit 50%  $1571.40 │ mobilization 25%  $785.70 │ completion $785.70 │
//! │                                     (completion = total − the others)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices come straight from `customer_pricing`; margins are never applied.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing::PricingConfiguration;
use crate::types::{PackageType, Percent};
use crate::validation::validate_discount;

const DEPOSIT_SHARE: Percent = Percent::from_whole(50);
const MOBILIZATION_SHARE: Percent = Percent::from_whole(25);

// =============================================================================
// Selection
// =============================================================================

/// What the customer is being quoted for.
///
/// `review_bonus` and `speed_bonus` do not affect the quote; they are read by
/// the payout calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub package: PackageType,
    #[serde(default)]
    pub add_saltwater: bool,
    #[serde(default)]
    pub add_heating: bool,
    #[serde(default)]
    pub add_site_prep: bool,
    #[serde(default)]
    pub add_shade: bool,
    #[serde(default)]
    pub site_ready: bool,
    #[serde(default)]
    pub discount: Percent,
    #[serde(default)]
    pub review_bonus: bool,
    #[serde(default)]
    pub speed_bonus: bool,
}

impl Selection {
    /// A bare package with no add-ons and no discount.
    pub fn new(package: PackageType) -> Self {
        Selection {
            package,
            add_saltwater: false,
            add_heating: false,
            add_site_prep: false,
            add_shade: false,
            site_ready: false,
            discount: Percent::zero(),
            review_bonus: false,
            speed_bonus: false,
        }
    }

    /// Parses the package key (`6ft`, `8ft`, `10ft`).
    pub fn for_package_key(key: &str) -> CoreResult<Self> {
        Ok(Selection::new(key.parse()?))
    }

    /// The selection actually priced: site prep is off whenever the site is
    /// already ready.
    pub fn effective(&self) -> Selection {
        Selection {
            add_site_prep: self.add_site_prep && !self.site_ready,
            ..self.clone()
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

/// One charged line on the quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteLine {
    pub label: String,
    pub amount: Money,
}

impl QuoteLine {
    fn new(label: impl Into<String>, amount: Money) -> Self {
        QuoteLine {
            label: label.into(),
            amount,
        }
    }
}

/// 50 / 25 / 25 split of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSchedule {
    pub deposit: Money,
    pub mobilization: Money,
    pub completion: Money,
}

impl PaymentSchedule {
    /// Completion is the remainder, so the three always sum to `total`.
    pub fn split(total: Money) -> Self {
        let deposit = total.percent_of(DEPOSIT_SHARE);
        let mobilization = total.percent_of(MOBILIZATION_SHARE);
        PaymentSchedule {
            deposit,
            mobilization,
            completion: total - deposit - mobilization,
        }
    }

    pub fn sum(&self) -> Money {
        self.deposit + self.mobilization + self.completion
    }
}

/// The customer-facing quote. Derived, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub package: PackageType,
    pub line_items: Vec<QuoteLine>,
    pub subtotal: Money,
    pub discount_percent: Percent,
    /// `subtotal × discount_percent`.
    pub percent_discount: Money,
    /// Flat discount when the customer prepared the site.
    pub site_ready_discount: Money,
    /// `percent_discount + site_ready_discount`.
    pub discount_amount: Money,
    pub total: Money,
    pub schedule: PaymentSchedule,
    /// Site prep was requested together with site ready and dropped.
    pub site_prep_forced_off: bool,
    /// Discounts exceeded the subtotal; the total was clamped to zero.
    pub negative_total_warning: bool,
}

/// Computes the quote for a selection.
///
/// ## Errors
/// `Validation` if the discount is above 100%. The package itself is
/// already typed; unknown keys fail earlier with `InvalidPackage`
/// (see [`Selection::for_package_key`]).
pub fn compute_quote(config: &PricingConfiguration, selection: &Selection) -> CoreResult<Quote> {
    validate_discount(selection.discount)?;

    let effective = selection.effective();
    let pricing = &config.customer_pricing;

    let mut line_items = vec![QuoteLine::new(
        format!("{} pool package", effective.package),
        pricing.pools.get(effective.package),
    )];
    if effective.add_saltwater {
        line_items.push(QuoteLine::new("Saltwater system", pricing.addons.saltwater));
    }
    if effective.add_heating {
        line_items.push(QuoteLine::new("Heating system", pricing.addons.heating));
    }
    if effective.add_site_prep {
        line_items.push(QuoteLine::new("Premium site prep", pricing.addons.premium_site));
    }
    if effective.add_shade {
        line_items.push(QuoteLine::new("Shade structure", pricing.addons.shade));
    }

    let subtotal: Money = line_items.iter().map(|line| line.amount).sum();
    let percent_discount = subtotal.percent_of(effective.discount);
    let site_ready_discount = if effective.site_ready {
        config.site_ready_discount
    } else {
        Money::zero()
    };
    let discount_amount = percent_discount + site_ready_discount;

    let raw_total = subtotal - discount_amount;
    let total = raw_total.clamp_non_negative();

    Ok(Quote {
        package: effective.package,
        line_items,
        subtotal,
        discount_percent: effective.discount,
        percent_discount,
        site_ready_discount,
        discount_amount,
        total,
        schedule: PaymentSchedule::split(total),
        site_prep_forced_off: selection.add_site_prep && selection.site_ready,
        negative_total_warning: raw_total.is_negative(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use pretty_assertions::assert_eq;

    fn eight_foot_saltwater_ten_percent() -> Selection {
        Selection {
            add_saltwater: true,
            discount: Percent::from_whole(10),
            ..Selection::new(PackageType::EightFoot)
        }
    }

    #[test]
    fn test_eight_foot_saltwater_with_ten_percent_discount() {
        let config = PricingConfiguration::default();
        let quote = compute_quote(&config, &eight_foot_saltwater_ten_percent()).unwrap();

        assert_eq!(quote.subtotal.cents(), 349200);
        assert_eq!(quote.discount_amount.cents(), 34920);
        assert_eq!(quote.total.cents(), 314280);
        assert_eq!(quote.schedule.deposit.cents(), 157140);
        assert_eq!(quote.schedule.mobilization.cents(), 78570);
        assert_eq!(quote.schedule.completion.cents(), 78570);
        assert_eq!(quote.schedule.sum(), quote.total);
        assert_eq!(quote.line_items.len(), 2);
        assert!(!quote.site_prep_forced_off);
    }

    #[test]
    fn test_site_ready_drops_site_prep_and_takes_flat_discount() {
        let config = PricingConfiguration::default();
        let selection = Selection {
            add_site_prep: true,
            site_ready: true,
            ..eight_foot_saltwater_ten_percent()
        };
        let quote = compute_quote(&config, &selection).unwrap();

        assert!(quote.site_prep_forced_off);
        assert!(quote
            .line_items
            .iter()
            .all(|line| line.label != "Premium site prep"));
        assert_eq!(quote.subtotal.cents(), 349200);
        assert_eq!(quote.discount_amount.cents(), 34920 + 40000);
        assert_eq!(quote.total.cents(), 274280);
        assert_eq!(quote.schedule.deposit.cents(), 137140);
        assert_eq!(quote.schedule.mobilization.cents(), 68570);
        assert_eq!(quote.schedule.completion.cents(), 68570);
    }

    #[test]
    fn test_site_ready_equals_quote_without_site_prep() {
        let config = PricingConfiguration::default();
        let with_prep = Selection {
            add_site_prep: true,
            site_ready: true,
            ..Selection::new(PackageType::TenFoot)
        };
        let without_prep = Selection {
            add_site_prep: false,
            ..with_prep.clone()
        };

        let a = compute_quote(&config, &with_prep).unwrap();
        let b = compute_quote(&config, &without_prep).unwrap();
        assert_eq!(a.total, b.total);
        assert_eq!(a.line_items, b.line_items);
    }

    #[test]
    fn test_total_clamped_at_zero() {
        let mut config = PricingConfiguration::default();
        config.site_ready_discount = Money::from_dollars(5000);
        let selection = Selection {
            site_ready: true,
            ..Selection::new(PackageType::SixFoot)
        };
        let quote = compute_quote(&config, &selection).unwrap();

        assert_eq!(quote.total, Money::zero());
        assert!(quote.negative_total_warning);
        assert_eq!(quote.schedule.sum(), Money::zero());
    }

    #[test]
    fn test_split_is_exact_for_odd_totals() {
        let config = PricingConfiguration::default();
        for discount_bps in [0, 1, 333, 1250, 4999, 10000] {
            for package in PackageType::ALL {
                let selection = Selection {
                    add_heating: true,
                    add_shade: true,
                    discount: Percent::from_bps(discount_bps),
                    ..Selection::new(package)
                };
                let quote = compute_quote(&config, &selection).unwrap();
                assert_eq!(quote.schedule.sum(), quote.total);
            }
        }
    }

    #[test]
    fn test_rejects_discount_over_hundred_percent() {
        let config = PricingConfiguration::default();
        let selection = Selection {
            discount: Percent::from_bps(10001),
            ..Selection::new(PackageType::SixFoot)
        };
        assert!(matches!(
            compute_quote(&config, &selection),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_package_key() {
        assert_eq!(
            Selection::for_package_key("12ft"),
            Err(CoreError::InvalidPackage("12ft".to_string()))
        );
    }

    #[test]
    fn test_prices_ignore_margins() {
        let mut config = PricingConfiguration::default();
        let before = compute_quote(&config, &eight_foot_saltwater_ten_percent()).unwrap();
        config.margins.set_global(Percent::from_whole(80)).unwrap();
        let after = compute_quote(&config, &eight_foot_saltwater_ten_percent()).unwrap();
        assert_eq!(before, after);
    }
}
