//! # Money Module
//!
//! Provides the `Money` type for every price, cost and payout in PoolQuote.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Quote total $3142.80 split 50 / 25 / 25:                               │
//! │    f64: 1571.4 + 785.7 + 785.7 = 3142.7999999999997  ❌                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    314280 → 157140 + 78570 + (314280 - 157140 - 78570) = 314280  ✅     │
//! │    The last share is always the remainder, so the split is exact.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use poolquote_core::money::Money;
//! use poolquote_core::types::Percent;
//!
//! let subtotal = Money::from_dollars(2795) + Money::from_dollars(697);
//! let discount = subtotal.percent_of(Percent::from_bps(1000)); // 10%
//! assert_eq!(discount.cents(), 34920);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Percent, TaxRate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (USD).
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  customer_pricing ──► Quote.subtotal ──► Quote.total ──► payment split  │
/// │                                              │                          │
/// │  base_costs / labor_rates ──► Payout ────────┴──► profit / margin       │
/// │                                                                         │
/// │  CatalogItem.actual_price × quantity ──► ledger totals ──► ROI          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use poolquote_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole dollars.
    ///
    /// Every price in the default pricing tables is a whole-dollar figure.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars.saturating_mul(100))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-dollar portion (truncated toward zero).
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self` if non-negative, zero otherwise.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates a percentage of this amount, rounded half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(cents * bps + 5000) / 10000`. The +5000 rounds
    /// (5000/10000 = 0.5). i128 prevents overflow on large amounts.
    ///
    /// ```rust
    /// use poolquote_core::money::Money;
    /// use poolquote_core::types::Percent;
    ///
    /// let total = Money::from_cents(314280);
    /// assert_eq!(total.percent_of(Percent::from_bps(5000)).cents(), 157140);
    /// ```
    pub fn percent_of(&self, pct: Percent) -> Money {
        Money(round_bps(self.0, pct.bps() as i64))
    }

    /// Calculates the tax owed on this amount.
    ///
    /// ```rust
    /// use poolquote_core::money::Money;
    /// use poolquote_core::types::TaxRate;
    ///
    /// let price = Money::from_cents(1000);
    /// assert_eq!(price.calculate_tax(TaxRate::from_bps(825)).cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(round_bps(self.0, rate.bps() as i64))
    }

    /// Returns this amount with tax added: `price × (1 + rate)`.
    pub fn with_tax(&self, rate: TaxRate) -> Money {
        *self + self.calculate_tax(rate)
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Divides by a ratio `numerator / denominator`, rounded half-up.
    ///
    /// Used for `cost / (1 - margin)` style calculations. A zero denominator
    /// yields zero.
    pub fn scale(&self, numerator: i64, denominator: i64) -> Money {
        if denominator == 0 {
            return Money::zero();
        }
        let n = self.0 as i128 * numerator as i128;
        let d = denominator as i128;
        let half = d.abs() / 2;
        let rounded = if (n >= 0) == (d > 0) {
            (n.abs() + half) / d.abs()
        } else {
            -((n.abs() + half) / d.abs())
        };
        Money(clamp_i128(rounded))
    }

    /// Formats without currency symbol, as used in CSV exports: `1234.50`.
    pub fn to_plain_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

/// `(amount * bps + 5000) / 10000` with half-up rounding away from zero.
fn round_bps(amount: i64, bps: i64) -> i64 {
    let product = amount as i128 * bps as i128;
    let rounded = if product >= 0 {
        (product + 5000) / 10000
    } else {
        (product - 5000) / 10000
    };
    clamp_i128(rounded)
}

/// Narrows to `i64`, saturating at its bounds.
fn clamp_i128(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses user-entered dollar strings such as `12`, `12.5`, `$1,299.99`.
///
/// More than two decimal places is rejected rather than silently rounded.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if frac.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount too large"))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            _ => frac.parse().map_err(|_| invalid("not a number"))?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| invalid("amount too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// Arithmetic saturates at the `i64` bounds.

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
