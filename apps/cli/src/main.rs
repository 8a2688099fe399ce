//! # PoolQuote Command-Line Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          poolquote (CLI)                                │
//! │                                                                         │
//! │  main.rs ─────► logging, argument parsing, subcommand dispatch         │
//! │                                                                         │
//! │  context.rs ──► SyncConfig + Database + Workspace for one invocation   │
//! │                                                                         │
//! │  commands/ ───► quote, items, summary, roi, revenue, notes,            │
//! │                 export, import, admin, relay                           │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  poolquote.db (local file, WAL mode, key-value snapshots)        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Parse arguments
//! 3. Load configuration, open the database, connect to the relay if configured
//! 4. Build the workspace and run the subcommand
//! 5. Flush pending saves and exit

mod commands;
mod context;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::admin::AdminCommand;
use commands::data::ExportCommand;
use commands::items::ItemsCommand;
use commands::ledger::RevenueCommand;
use commands::quote::QuoteArgs;
use context::{load_config, AppContext, GlobalOptions};

#[derive(Debug, Parser)]
#[command(name = "poolquote", version, about = "Pool installation quotes, payouts and inventory")]
struct Cli {
    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Don't connect to a relay for this run
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Customer quote (and payout with --payout)
    Quote(QuoteArgs),

    /// Inventory ledger items
    #[command(subcommand)]
    Items(ItemsCommand),

    /// Counts and verified spend by section and category
    Summary,

    /// Return on investment
    Roi,

    /// Job revenue
    #[command(subcommand)]
    Revenue(RevenueCommand),

    /// Show project notes, or replace them
    Notes { text: Option<String> },

    /// Export the inventory
    #[command(subcommand)]
    Export(ExportCommand),

    /// Replace the inventory with a JSON export
    Import { path: PathBuf },

    /// Pricing configuration
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Host a relay for collaborators
    Relay {
        #[arg(short, long)]
        port: Option<u16>,
        #[arg(long)]
        bind: Option<String>,
    },

    /// Configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration, fixing the collaborator id
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Parsed arguments");

    let options = GlobalOptions {
        config: cli.config,
        database: cli.db,
        offline: cli.offline,
    };

    // These don't need a workspace.
    match cli.command {
        Commands::Relay { port, bind } => {
            let config = load_config(&options)?;
            return commands::relay::run(config.relay, port, bind).await;
        }
        Commands::Config(command) => return config(&options, command),
        command => run(&options, command).await,
    }
}

async fn run(options: &GlobalOptions, command: Commands) -> Result<()> {
    let ctx = AppContext::open(options).await?;
    info!(collaborator_id = %ctx.config.collaborator_id(), "Workspace opened");

    let result = match command {
        Commands::Quote(args) => commands::quote::run(&ctx, args).await,
        Commands::Items(command) => commands::items::run(&ctx, command).await,
        Commands::Summary => commands::ledger::summary(&ctx).await,
        Commands::Roi => commands::ledger::roi(&ctx).await,
        Commands::Revenue(command) => commands::ledger::revenue(&ctx, command).await,
        Commands::Notes { text } => commands::ledger::notes(&ctx, text).await,
        Commands::Export(command) => commands::data::export(&ctx, command).await,
        Commands::Import { path } => commands::data::import(&ctx, &path).await,
        Commands::Admin(command) => commands::admin::run(&ctx, command).await,
        Commands::Relay { .. } | Commands::Config(_) => Ok(()),
    };

    // Flush even when the command failed; earlier edits may be pending.
    ctx.close().await?;
    result
}

fn config(options: &GlobalOptions, command: ConfigCommand) -> Result<()> {
    let config = load_config(options)?;
    match command {
        ConfigCommand::Show => {
            print!("{}", config.to_toml_string()?);
        }
        ConfigCommand::Init => {
            let path = config.save(options.config.clone())?;
            println!("Configuration written to {}", path.display());
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=poolquote_sync=trace` - Trace the runtime only
/// - Default: `info,poolquote=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,poolquote=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
