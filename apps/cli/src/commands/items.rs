//! `poolquote items`: inventory ledger CRUD.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use clap::Subcommand;

use poolquote_core::ledger::{ItemField, ItemTemplate};
use poolquote_core::types::{Location, SectionName, Usage};
use poolquote_core::{Command, Money};

use crate::context::AppContext;

#[derive(Debug, Subcommand)]
pub enum ItemsCommand {
    /// List items, optionally one section only
    List {
        #[arg(short, long)]
        section: Option<SectionName>,
    },

    /// Add a pending item
    Add {
        section: SectionName,
        name: String,
        /// Estimated unit price, e.g. 129.99
        #[arg(short, long, default_value = "0")]
        price: Money,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        #[arg(short, long, default_value = "one-time")]
        usage: Usage,
        #[arg(short, long, default_value = "local")]
        location: Location,
        #[arg(long, default_value = "")]
        link: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Advance status: pending → ordered → purchased → partial → verified
    Cycle { section: SectionName, index: usize },

    /// Set status directly
    SetStatus {
        section: SectionName,
        index: usize,
        status: String,
    },

    /// Record the retail price paid (tax adjusted on save)
    SetPrice {
        section: SectionName,
        index: usize,
        price: Money,
    },

    SetQuantity {
        section: SectionName,
        index: usize,
        quantity: i64,
    },

    SetNotes {
        section: SectionName,
        index: usize,
        notes: String,
    },

    Rename {
        section: SectionName,
        index: usize,
        name: String,
    },

    /// one-time, per-job, reusable or consumable (per-job is untaxed)
    SetUsage {
        section: SectionName,
        index: usize,
        usage: Usage,
    },

    SetLocation {
        section: SectionName,
        index: usize,
        location: Location,
    },

    /// Delete an item after confirmation
    Delete {
        section: SectionName,
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &AppContext, command: ItemsCommand) -> Result<()> {
    let workspace = &ctx.workspace;

    let command = match command {
        ItemsCommand::List { section } => {
            list(ctx, section).await;
            return Ok(());
        }
        ItemsCommand::Add {
            section,
            name,
            price,
            quantity,
            usage,
            location,
            link,
            notes,
        } => Command::AddItem {
            section,
            template: ItemTemplate {
                estimated_price: price,
                quantity,
                usage,
                location,
                link,
                notes,
                ..ItemTemplate::named(name)
            },
        },
        ItemsCommand::Cycle { section, index } => Command::CycleStatus { section, index },
        ItemsCommand::SetStatus {
            section,
            index,
            status,
        } => Command::SetStatus {
            section,
            index,
            status,
        },
        ItemsCommand::SetPrice {
            section,
            index,
            price,
        } => update(section, index, ItemField::ActualPrice(price)),
        ItemsCommand::SetQuantity {
            section,
            index,
            quantity,
        } => update(section, index, ItemField::Quantity(quantity)),
        ItemsCommand::SetNotes {
            section,
            index,
            notes,
        } => update(section, index, ItemField::Notes(notes)),
        ItemsCommand::Rename {
            section,
            index,
            name,
        } => update(section, index, ItemField::Name(name)),
        ItemsCommand::SetUsage {
            section,
            index,
            usage,
        } => update(section, index, ItemField::Usage(usage)),
        ItemsCommand::SetLocation {
            section,
            index,
            location,
        } => update(section, index, ItemField::Location(location)),
        ItemsCommand::Delete {
            section,
            index,
            yes,
        } => {
            let confirmation = workspace
                .read(|state| state.snapshot.sections.request_delete(section, index))
                .await?;
            if !yes && !confirm(&format!("Delete '{}' from {}?", confirmation.item_name, section))? {
                bail!("delete cancelled");
            }
            Command::DeleteItem {
                section,
                index,
                confirmation,
            }
        }
    };

    workspace.dispatch(command).await?;
    Ok(())
}

fn update(section: SectionName, index: usize, field: ItemField) -> Command {
    Command::UpdateField {
        section,
        index,
        field,
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn list(ctx: &AppContext, only: Option<SectionName>) {
    let sections = ctx
        .workspace
        .read(|state| state.snapshot.sections.clone())
        .await;

    for section in SectionName::ALL {
        if only.is_some_and(|wanted| wanted != section) {
            continue;
        }
        let items = sections.get(section);
        println!("{} ({})", section, items.len());
        for (index, item) in items.iter().enumerate() {
            let price = if item.actual_price.is_zero() {
                item.estimated_price
            } else {
                item.actual_price
            };
            println!(
                "  [{:>2}] {:<40} {:>10} x{:<3} {:<10} {:<9} {}",
                index,
                item.name,
                price.to_string(),
                item.quantity,
                item.status,
                item.usage.as_str(),
                item.effective_category(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Harness {
        #[command(subcommand)]
        command: ItemsCommand,
    }

    #[test]
    fn test_add_parses_money_and_enums() {
        let harness = Harness::try_parse_from([
            "items", "add", "tools", "Trowel", "--price", "$12.50", "-u", "reusable",
        ])
        .unwrap();
        match harness.command {
            ItemsCommand::Add {
                section,
                name,
                price,
                usage,
                quantity,
                ..
            } => {
                assert_eq!(section, SectionName::Tools);
                assert_eq!(name, "Trowel");
                assert_eq!(price, Money::from_cents(1250));
                assert_eq!(usage, Usage::Reusable);
                assert_eq!(quantity, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_field_edits_map_to_item_fields() {
        let parse = |args: &[&str]| Harness::try_parse_from(args).unwrap().command;

        match parse(&["items", "set-usage", "siteprep", "2", "per-job"]) {
            ItemsCommand::SetUsage {
                section,
                index,
                usage,
            } => assert_eq!(
                update(section, index, ItemField::Usage(usage)),
                Command::UpdateField {
                    section: SectionName::SitePrep,
                    index: 2,
                    field: ItemField::Usage(Usage::PerJob),
                }
            ),
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            parse(&["items", "rename", "tools", "0", "Steel rake"]),
            ItemsCommand::Rename { name, .. } if name == "Steel rake"
        ));
        assert!(matches!(
            parse(&["items", "set-location", "pumps", "1", "online"]),
            ItemsCommand::SetLocation { location: Location::Online, .. }
        ));
        assert!(Harness::try_parse_from(["items", "set-usage", "tools", "0", "weekly"]).is_err());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(Harness::try_parse_from(["items", "cycle", "garage", "0"]).is_err());
    }
}
