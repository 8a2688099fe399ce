//! `poolquote admin`: pricing configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use poolquote_core::pricing::{InventoryLevels, PriceComparison};
use poolquote_core::snapshot::validate_admin_import;
use poolquote_core::types::Percent;
use poolquote_core::Command;

use crate::context::AppContext;

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Print the admin configuration blob
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Apply an admin configuration blob (present keys replace whole sections)
    Import { path: PathBuf },

    /// Global margin in whole percent, 35 to 80
    SetMargin { percent: u32 },

    /// List prices against the prices the margins suggest
    Prices,

    /// Update components on hand; omitted counts stay as they are
    Stock(StockArgs),
}

#[derive(Debug, Args)]
pub struct StockArgs {
    #[arg(long)]
    pub tanks_6ft: Option<u32>,
    #[arg(long)]
    pub tanks_8ft: Option<u32>,
    #[arg(long)]
    pub tanks_10ft: Option<u32>,
    #[arg(long)]
    pub pumps: Option<u32>,
    #[arg(long)]
    pub salt_systems: Option<u32>,
    #[arg(long)]
    pub heating_systems: Option<u32>,
}

impl StockArgs {
    fn apply_to(&self, mut levels: InventoryLevels) -> InventoryLevels {
        let set = |slot: &mut u32, value: Option<u32>| {
            if let Some(value) = value {
                *slot = value;
            }
        };
        set(&mut levels.tanks_6ft, self.tanks_6ft);
        set(&mut levels.tanks_8ft, self.tanks_8ft);
        set(&mut levels.tanks_10ft, self.tanks_10ft);
        set(&mut levels.pumps_sx2800, self.pumps);
        set(&mut levels.salt_systems, self.salt_systems);
        set(&mut levels.heating_systems, self.heating_systems);
        levels
    }
}

pub async fn run(ctx: &AppContext, command: AdminCommand) -> Result<()> {
    let workspace = &ctx.workspace;
    match command {
        AdminCommand::Export { out } => {
            let patch = workspace.read(|state| state.pricing.admin_export()).await;
            let json = serde_json::to_string_pretty(&patch)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Admin configuration written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        AdminCommand::Import { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let patch = validate_admin_import(&json)
                .with_context(|| format!("importing {}", path.display()))?;
            workspace.dispatch(Command::ApplyAdminPatch(patch)).await?;
            println!("Admin configuration applied");
        }
        AdminCommand::SetMargin { percent } => {
            workspace
                .dispatch(Command::SetGlobalMargin(Percent::from_whole(percent)))
                .await?;
            let (margin, rows) = workspace
                .read(|state| (state.pricing.margins.global, state.pricing.price_comparison()))
                .await;
            println!("Global margin is now {}", margin);
            print_comparison(&rows);
        }
        AdminCommand::Prices => {
            let rows = workspace.read(|state| state.pricing.price_comparison()).await;
            print_comparison(&rows);
        }
        AdminCommand::Stock(args) => {
            let current = workspace.read(|state| state.pricing.inventory_levels).await;
            let levels = args.apply_to(current);
            workspace
                .dispatch(Command::SetInventoryLevels(levels))
                .await?;
            println!(
                "Tanks 6/8/10ft: {}/{}/{}  pumps: {}  salt: {}  heating: {}",
                levels.tanks_6ft,
                levels.tanks_8ft,
                levels.tanks_10ft,
                levels.pumps_sx2800,
                levels.salt_systems,
                levels.heating_systems
            );
        }
    }
    Ok(())
}

fn print_comparison(rows: &[PriceComparison]) {
    println!(
        "{:<20} {:>10} {:>7} {:>10} {:>10} {:>10}",
        "Product", "Cost", "Margin", "List", "Suggested", "Diff"
    );
    for row in rows {
        println!(
            "{:<20} {:>10} {:>7} {:>10} {:>10} {:>10}",
            row.product,
            row.cost.to_string(),
            row.margin.to_string(),
            row.list_price.to_string(),
            row.suggested_price.to_string(),
            row.difference().to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(clap::Parser)]
    struct Harness {
        #[command(subcommand)]
        command: AdminCommand,
    }

    #[test]
    fn test_prices_and_margin_parse() {
        use clap::Parser;

        assert!(matches!(
            Harness::try_parse_from(["admin", "prices"]).unwrap().command,
            AdminCommand::Prices
        ));
        assert!(matches!(
            Harness::try_parse_from(["admin", "set-margin", "60"]).unwrap().command,
            AdminCommand::SetMargin { percent: 60 }
        ));
        assert!(Harness::try_parse_from(["admin", "set-margin", "sixty"]).is_err());
    }

    #[test]
    fn test_stock_only_touches_given_counts() {
        let args = StockArgs {
            tanks_6ft: None,
            tanks_8ft: Some(0),
            tanks_10ft: None,
            pumps: Some(9),
            salt_systems: None,
            heating_systems: None,
        };
        let levels = args.apply_to(InventoryLevels::default());
        assert_eq!(levels.tanks_8ft, 0);
        assert_eq!(levels.pumps_sx2800, 9);
        assert_eq!(levels.tanks_6ft, InventoryLevels::default().tanks_6ft);
    }
}
