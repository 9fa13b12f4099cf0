use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use etfcmp::cli::compare::CompareOptions;
use etfcmp::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for etfcmp::AppCommand {
    fn from(cmd: Commands) -> etfcmp::AppCommand {
        match cmd {
            Commands::Fetch => etfcmp::AppCommand::Fetch,
            Commands::Compare {
                input_dir,
                months,
                span,
                output_dir,
            } => etfcmp::AppCommand::Compare(CompareOptions {
                input_dir,
                months,
                span,
                output_dir,
            }),
            Commands::Extract { input, output } => etfcmp::AppCommand::Extract { input, output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Download configured instruments and store their performance in the target currency
    Fetch,
    /// Compare stored series over their common date range
    Compare {
        /// Directory of series files (defaults to the configured data path)
        input_dir: Option<PathBuf>,

        /// Only compare the trailing number of months
        #[arg(short, long)]
        months: Option<u32>,

        /// EMA span in days for the smoothed statistics
        #[arg(short, long)]
        span: Option<usize>,

        /// Also write the tables as CSV files into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Convert a series file to CSV
    Extract {
        input: PathBuf,

        /// Output file (defaults to the input path with a .csv extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => etfcmp::cli::setup::setup(),
        Some(cmd) => etfcmp::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
