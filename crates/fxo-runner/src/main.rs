//! # fxo-runner
//!
//! Main entry point for the FX order execution engine.
//!
//! Loads a JSON configuration file, walks the operator through session
//! setup (risk, account, instrument, side, stop-loss), then runs the
//! interactive order loop against the OANDA v20 REST API.
//!
//! # Usage
//!
//! ```bash
//! fxo-runner config.json --log-level info
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

mod prompt;
mod session;

/// FX Order Execution Runner.
#[derive(Parser)]
#[command(name = "fxo-runner", about = "FX Order Execution Runner")]
struct Cli {
    /// Configuration file path (JSON).
    #[arg(default_value = "config.json")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,

    /// Directory for the trade-history CSV journal.
    #[arg(long, default_value = "logs")]
    journal_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fxo_core::logging::init_logging(&cli.log_level, cli.log_dir.as_deref(), "fxo-runner");

    info!(
        "fxo-runner starting — config={}, log_level={}",
        cli.config.display(),
        cli.log_level,
    );

    let config = fxo_core::config::load_config(&cli.config)?;
    info!("config loaded — {} instrument(s)", config.instruments.len());

    match session::run(config, &cli.journal_dir).await {
        Ok(()) => {
            info!("session complete — goodbye");
            Ok(())
        }
        Err(e) => {
            error!("session failed: {e:#}");
            Err(e)
        }
    }
}
