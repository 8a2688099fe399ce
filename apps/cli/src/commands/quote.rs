//! `poolquote quote`: customer quote and contractor payout.

use anyhow::Result;
use clap::Args;

use poolquote_core::payout::PayoutBreakdown;
use poolquote_core::pricing::stock_status;
use poolquote_core::quote::{Quote, Selection};
use poolquote_core::types::{PackageType, Percent};

use crate::context::AppContext;

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Package: 6ft, 8ft or 10ft
    #[arg(short, long, default_value = "8ft")]
    pub package: PackageType,

    /// Saltwater system
    #[arg(long)]
    pub salt: bool,

    /// Heating system
    #[arg(long)]
    pub heat: bool,

    /// Site preparation
    #[arg(long)]
    pub site_prep: bool,

    /// Shade structure
    #[arg(long)]
    pub shade: bool,

    /// Customer prepared the site (drops site prep)
    #[arg(long)]
    pub site_ready: bool,

    /// Whole-percent discount, 0 to 100
    #[arg(short, long, default_value_t = 0)]
    pub discount: u32,

    /// Installer earned the review bonus
    #[arg(long)]
    pub review_bonus: bool,

    /// Installer earned the speed bonus
    #[arg(long)]
    pub speed_bonus: bool,

    /// Also print the contractor payout
    #[arg(long)]
    pub payout: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl QuoteArgs {
    pub fn selection(&self) -> Selection {
        Selection {
            add_saltwater: self.salt,
            add_heating: self.heat,
            add_site_prep: self.site_prep,
            add_shade: self.shade,
            site_ready: self.site_ready,
            discount: Percent::from_whole(self.discount),
            review_bonus: self.review_bonus,
            speed_bonus: self.speed_bonus,
            ..Selection::new(self.package)
        }
    }
}

pub async fn run(ctx: &AppContext, args: QuoteArgs) -> Result<()> {
    let selection = args.selection();
    let (quote, payout) = ctx.workspace.quote(&selection).await?;

    if args.json {
        let value = if args.payout {
            serde_json::json!({ "quote": quote, "payout": payout })
        } else {
            serde_json::to_value(&quote)?
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_quote(&quote);

    let (ready, days) = ctx
        .workspace
        .read(|state| {
            (
                state.pricing.inventory_levels.ready_to_install(&selection),
                state.pricing.availability_days(&selection),
            )
        })
        .await;
    println!();
    println!("Ready to install: {} ({})", ready, stock_status(ready));
    println!("Availability:     {} days", days);

    if args.payout {
        println!();
        print_payout(&payout);
    }
    Ok(())
}

fn print_quote(quote: &Quote) {
    println!("Quote - {} package", quote.package);
    for line in &quote.line_items {
        println!("  {:<36} {:>12}", line.label, line.amount.to_string());
    }
    println!("  {:<36} {:>12}", "Subtotal", quote.subtotal.to_string());
    if !quote.discount_amount.is_zero() {
        println!(
            "  {:<36} {:>12}",
            format!("Discount ({})", quote.discount_percent),
            format!("-{}", quote.percent_discount)
        );
        if !quote.site_ready_discount.is_zero() {
            println!(
                "  {:<36} {:>12}",
                "Site ready",
                format!("-{}", quote.site_ready_discount)
            );
        }
    }
    println!("  {:<36} {:>12}", "Total", quote.total.to_string());
    println!();
    println!("  Deposit (50%):      {}", quote.schedule.deposit);
    println!("  Mobilization (25%): {}", quote.schedule.mobilization);
    println!("  Completion (25%):   {}", quote.schedule.completion);

    if quote.site_prep_forced_off {
        eprintln!("note: site prep dropped because the site is ready");
    }
    if quote.negative_total_warning {
        eprintln!("warning: discounts exceed the subtotal; total clamped to $0.00");
    }
}

fn print_payout(payout: &PayoutBreakdown) {
    println!("Payout");
    println!("  Revenue:   {}", payout.revenue);
    println!("  Materials: {}", payout.material_total);
    for line in &payout.materials {
        println!("    {:<34} {:>12}", line.label, line.amount.to_string());
    }
    println!("  Installer: {}", payout.installer_total);
    for line in &payout.installer {
        println!("    {:<34} {:>12}", line.label, line.amount.to_string());
    }
    println!("  Helper:    {}", payout.helper_total);
    for line in &payout.helper {
        println!("    {:<34} {:>12}", line.label, line.amount.to_string());
    }
    println!("  Profit:    {} ({:.2}%)", payout.profit, payout.margin_percentage());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: QuoteArgs,
    }

    #[test]
    fn test_flags_build_selection() {
        let harness =
            Harness::try_parse_from(["quote", "--package", "10ft", "--salt", "-d", "10"]).unwrap();
        let selection = harness.args.selection();
        assert_eq!(selection.package, PackageType::TenFoot);
        assert!(selection.add_saltwater);
        assert!(!selection.add_heating);
        assert_eq!(selection.discount, Percent::from_whole(10));
    }

    #[test]
    fn test_unknown_package_is_rejected() {
        assert!(Harness::try_parse_from(["quote", "--package", "12ft"]).is_err());
    }
}
