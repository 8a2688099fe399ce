//! # ROI Tracking
//!
//! Revenue entered per completed job, set against the verified investment.
//!
//! ```text
//! initial_investment = Σ verified line totals in the first-install section
//!                    + Σ verified one-time items in every other section
//! net_profit         = total_revenue − initial_investment
//! roi                = net_profit / initial_investment   ("pending" when 0)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ledger::Sections;
use crate::money::Money;
use crate::types::{SectionName, Usage};
use crate::validation::validate_revenue;

/// One manual revenue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RevenueEntry {
    pub amount: Money,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    /// 1-based, in entry order.
    pub job_number: u32,
}

/// Persisted as `roiTracking`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoiLedger {
    #[serde(default)]
    pub total_revenue: Money,
    #[serde(default)]
    pub jobs_completed: u32,
    #[serde(default)]
    pub revenue_history: Vec<RevenueEntry>,
}

impl RoiLedger {
    /// Records a completed job's revenue. The amount must be positive.
    pub fn record_revenue(
        &mut self,
        amount: Money,
        date: DateTime<Utc>,
    ) -> CoreResult<&RevenueEntry> {
        validate_revenue(amount).map_err(|_| CoreError::InvalidRevenue)?;

        self.total_revenue += amount;
        self.jobs_completed += 1;
        self.revenue_history.push(RevenueEntry {
            amount,
            date,
            job_number: self.jobs_completed,
        });
        // Just pushed.
        Ok(&self.revenue_history[self.revenue_history.len() - 1])
    }

    pub fn report(&self, sections: &Sections) -> RoiReport {
        let initial_investment = initial_investment(sections);
        let net_profit = self.total_revenue - initial_investment;

        let roi_bps = if initial_investment.is_positive() {
            let bps = (net_profit.cents() as i128 * 10000) / initial_investment.cents() as i128;
            Some(bps.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
        } else {
            None
        };

        RoiReport {
            total_revenue: self.total_revenue,
            jobs_completed: self.jobs_completed,
            initial_investment,
            net_profit,
            roi_bps,
        }
    }
}

/// Verified spend that counts as the up-front investment.
pub fn initial_investment(sections: &Sections) -> Money {
    sections
        .iter()
        .filter(|(_, item)| item.is_verified())
        .filter(|(section, item)| *section == SectionName::Cliff || item.usage == Usage::OneTime)
        .map(|(_, item)| item.line_total())
        .sum()
}

/// Derived ROI figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoiReport {
    pub total_revenue: Money,
    pub jobs_completed: u32,
    pub initial_investment: Money,
    pub net_profit: Money,
    /// `None` while there is no verified investment.
    pub roi_bps: Option<i64>,
}

impl RoiReport {
    /// `"12.50%"` or `"pending"`.
    pub fn roi_label(&self) -> String {
        match self.roi_bps {
            Some(bps) => {
                let sign = if bps < 0 { "-" } else { "" };
                format!("{}{}.{:02}%", sign, (bps / 100).abs(), (bps % 100).abs())
            }
            None => "pending".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{ItemField, ItemTemplate};
    use crate::pricing::TaxRules;
    use crate::types::TaxRate;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn verified_item(
        sections: &mut Sections,
        section: SectionName,
        name: &str,
        usage: Usage,
        dollars: i64,
    ) {
        let untaxed = TaxRules {
            rate: TaxRate::zero(),
            ..TaxRules::default()
        };
        let index = sections
            .add_item(
                section,
                ItemTemplate {
                    usage,
                    ..ItemTemplate::named(name)
                },
            )
            .unwrap();
        sections
            .update_field(
                section,
                index,
                ItemField::ActualPrice(Money::from_dollars(dollars)),
                &untaxed,
            )
            .unwrap();
        for _ in 0..4 {
            sections.cycle_status(section, index).unwrap();
        }
    }

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_record_revenue() {
        let mut roi = RoiLedger::default();
        roi.record_revenue(Money::from_dollars(3142), date()).unwrap();
        let entry = roi.record_revenue(Money::from_dollars(2742), date()).unwrap();
        assert_eq!(entry.job_number, 2);

        assert_eq!(roi.total_revenue, Money::from_dollars(5884));
        assert_eq!(roi.jobs_completed, 2);
        assert_eq!(roi.revenue_history.len(), 2);
    }

    #[test]
    fn test_record_revenue_rejects_non_positive() {
        let mut roi = RoiLedger::default();
        assert_eq!(
            roi.record_revenue(Money::zero(), date()).unwrap_err(),
            CoreError::InvalidRevenue
        );
        assert_eq!(roi, RoiLedger::default());
    }

    #[test]
    fn test_initial_investment_rules() {
        let mut sections = Sections::default();
        // First-install items count regardless of usage.
        verified_item(&mut sections, SectionName::Cliff, "Tank", Usage::PerJob, 1000);
        // One-time items elsewhere count.
        verified_item(&mut sections, SectionName::Tools, "Tamper", Usage::OneTime, 60);
        // Per-job items elsewhere do not.
        verified_item(&mut sections, SectionName::Hardware, "Bolts", Usage::PerJob, 20);
        // Unverified items never count.
        sections
            .add_item(SectionName::Cliff, ItemTemplate::named("Pump"))
            .unwrap();

        assert_eq!(initial_investment(&sections), Money::from_dollars(1060));
    }

    #[test]
    fn test_report_pending_without_investment() {
        let roi = RoiLedger::default();
        let report = roi.report(&Sections::default());
        assert_eq!(report.roi_bps, None);
        assert_eq!(report.roi_label(), "pending");
    }

    #[test]
    fn test_report_percentage() {
        let mut sections = Sections::default();
        verified_item(&mut sections, SectionName::Cliff, "Tank", Usage::OneTime, 2000);

        let mut roi = RoiLedger::default();
        roi.record_revenue(Money::from_dollars(2500), date()).unwrap();

        let report = roi.report(&sections);
        assert_eq!(report.net_profit, Money::from_dollars(500));
        assert_eq!(report.roi_bps, Some(2500));
        assert_eq!(report.roi_label(), "25.00%");
    }
}
