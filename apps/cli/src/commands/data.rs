//! `poolquote export` / `poolquote import`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use tracing::info;

use poolquote_core::snapshot::validate_import;
use poolquote_core::Command;
use poolquote_db::export::{to_csv_string, to_json_string};

use crate::context::AppContext;

#[derive(Debug, Subcommand)]
pub enum ExportCommand {
    /// Spreadsheet of every item with line totals
    Csv {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Full inventory dump, re-importable
    Json {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

pub async fn export(ctx: &AppContext, command: ExportCommand) -> Result<()> {
    let snapshot = ctx.workspace.snapshot().await;
    let (contents, out) = match command {
        ExportCommand::Csv { out } => (to_csv_string(&snapshot)?, out),
        ExportCommand::Json { out } => (to_json_string(&snapshot, Utc::now())?, out),
    };

    match out {
        Some(path) => {
            std::fs::write(&path, contents)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Export written");
            println!("Exported to {}", path.display());
        }
        None => print!("{}", contents),
    }
    Ok(())
}

/// Replaces the inventory with a validated file. Nothing changes when the
/// file is rejected.
pub async fn import(ctx: &AppContext, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let snapshot = validate_import(&json).with_context(|| format!("importing {}", path.display()))?;
    let count = snapshot.sections.len();

    ctx.workspace
        .dispatch(Command::ImportSnapshot(snapshot))
        .await?;
    println!("Imported {} items from {}", count, path.display());
    Ok(())
}
