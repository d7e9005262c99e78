//! # sixmin CLI Module
//!
//! ## Available Commands
//!
//! - `advance` - Advance every pending item whose score passes (default)
//! - `evaluate` - Evaluate one ad-hoc item offline
//! - `validate` - Check the store's schema
//! - `repair` - Rewrite stale review target labels
//! - `set-score` - Record one score on one item
//! - `stages` - Print the stage table

mod commands;

use crate::SixminError;
use crate::config::Config;
use crate::driver::{Driver, DriverOptions};
use crate::store::{FileStore, NotionStore, RecordStore};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use sixmin_core::{ItemId, Stage, parse_iso_date};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// sixmin - score-based spaced-repetition advancement
///
/// Moves review items one stage forward (D1 → D3 → D7 → D14 → D30 → Done)
/// once the score for their current stage reaches 70.
#[derive(Parser, Debug)]
#[command(name = "sixmin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the TOML config file (default: ./sixmin.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Record store backend
    #[arg(short = 'S', long, global = true, value_enum, default_value_t = StoreKind::Notion)]
    pub store: StoreKind,

    /// JSON snapshot file for the file store
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Evaluate and report without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Run day as YYYY-MM-DD (default: today, UTC)
    #[arg(long, global = true, value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Record store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Notion database over the REST API
    Notion,
    /// Local JSON snapshot file
    File,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the schema, then advance every pending item
    Advance,

    /// Evaluate one ad-hoc item without touching any store
    Evaluate {
        /// Current stage (D1, D3, D7, D14, D30, Done)
        #[arg(short, long, value_parser = parse_stage)]
        stage: Stage,

        /// Score for the current stage
        #[arg(short = 'n', long)]
        score: f64,

        /// Date to count the next review from (default: the run day)
        #[arg(short, long, value_parser = parse_date)]
        anchor: Option<NaiveDate>,
    },

    /// Check that the store declares every field the driver writes
    Validate,

    /// Rewrite review target labels that do not match their stage
    Repair,

    /// Record a score on one item
    SetScore {
        /// Item (page) id
        #[arg(short, long)]
        page: String,

        /// Stage whose score field to write (D1..D30)
        #[arg(short, long, value_parser = parse_stage)]
        stage: Stage,

        /// Score value
        #[arg(short = 'n', long)]
        value: f64,
    },

    /// Print the stage table
    Stages,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_iso_date(s).map_err(|e| e.to_string())
}

fn parse_stage(s: &str) -> Result<Stage, String> {
    Stage::parse(s).ok_or_else(|| format!("unknown stage '{}' (expected D1, D3, D7, D14, D30 or Done)", s))
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Operations that need a record store.
enum StoreOp {
    Advance,
    Validate,
    Repair,
    SetScore { id: ItemId, stage: Stage, value: f64 },
}

/// Execute the CLI with parsed arguments and the merged configuration.
///
/// Returns `Ok(false)` when the command ran but reported failures (item
/// errors, schema violations).
pub async fn execute(cli: Cli, config: Config) -> Result<bool, SixminError> {
    let json_mode = cli.json_mode;
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let op = match cli.command.unwrap_or(Commands::Advance) {
        Commands::Stages => return cmd_stages(json_mode),
        Commands::Evaluate {
            stage,
            score,
            anchor,
        } => return cmd_evaluate(stage, score, anchor, today, json_mode),
        Commands::Advance => StoreOp::Advance,
        Commands::Validate => StoreOp::Validate,
        Commands::Repair => StoreOp::Repair,
        Commands::SetScore { page, stage, value } => StoreOp::SetScore {
            id: ItemId::new(page),
            stage,
            value,
        },
    };

    let options = DriverOptions {
        today,
        dry_run: config.dry_run,
    };
    tracing::info!("Today: {}", today);
    if options.dry_run {
        tracing::info!("Dry run mode: ENABLED");
    }

    match cli.store {
        StoreKind::Notion => {
            let store = NotionStore::new(&config.notion, config.fields.clone(), config.anchor)?;
            run(Driver::new(store, options), op, json_mode).await
        }
        StoreKind::File => {
            let path = cli.file.ok_or_else(|| {
                SixminError::Config("--file is required with --store file".to_string())
            })?;
            let store = FileStore::open(&path)
                .await?
                .with_page_size(config.notion.page_size as usize)
                .with_anchor(config.anchor);
            run(Driver::new(store, options), op, json_mode).await
        }
    }
}

async fn run<S: RecordStore>(
    driver: Driver<S>,
    op: StoreOp,
    json_mode: bool,
) -> Result<bool, SixminError> {
    match op {
        StoreOp::Advance => cmd_advance(&driver, json_mode).await,
        StoreOp::Validate => cmd_validate(&driver, json_mode).await,
        StoreOp::Repair => cmd_repair(&driver, json_mode).await,
        StoreOp::SetScore { id, stage, value } => {
            cmd_set_score(&driver, &id, stage, value, json_mode).await
        }
    }
}
