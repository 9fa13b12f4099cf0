pub mod cli;
pub mod config;
pub mod core;
pub mod providers;
pub mod storage;

use crate::cli::compare::CompareOptions;
use crate::core::cache::Cache;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Fetch,
    Compare(CompareOptions),
    Extract {
        input: PathBuf,
        output: Option<PathBuf>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("etfcmp starting...");

    let config = config::AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Fetch => {
            let history_cache = Arc::new(Cache::new());
            let provider = providers::YahooHistoryProvider::new(
                config.yahoo_base_url(),
                Arc::clone(&history_cache),
            );
            cli::fetch::run(&config, &provider).await
        }
        AppCommand::Compare(options) => cli::compare::run(&config, &options),
        AppCommand::Extract { input, output } => {
            let written = cli::extract::run(&input, output.as_deref(), &config.currency)?;
            println!("Wrote {}", written.display());
            Ok(())
        }
    }
}
