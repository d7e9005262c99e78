//! # sixmin
//!
//! Command-line entry point. See the library crate for the architecture.
//!
//! ## Usage
//!
//! ```bash
//! # Advance every pending item whose current-stage score is at least 70
//! NOTION_TOKEN=... NOTION_DATABASE_ID=... sixmin
//!
//! # Preview without writing
//! sixmin advance --dry-run
//!
//! # Offline against a JSON snapshot
//! sixmin --store file --file items.json advance --today 2025-09-01
//!
//! # One ad-hoc evaluation
//! sixmin evaluate --stage D1 --score 79 --anchor 2025-09-01
//! ```

use clap::Parser;
use sixmin::cli::{self, Cli};
use sixmin::config::{Config, LogLevel};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_process_env();
    if cli.dry_run {
        config.dry_run = true;
    }

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    init_tracing(level);

    match cli::execute(cli, config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// RUST_LOG wins over the configured level. SIXMIN_LOG_FORMAT=json enables
/// machine-parseable output. Logs go to stderr so `--json-mode` output on
/// stdout stays parseable.
fn init_tracing(level: LogLevel) {
    let log_format = std::env::var("SIXMIN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.filter_directive().into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
