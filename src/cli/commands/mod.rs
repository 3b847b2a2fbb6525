//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod extract;
mod raw_data;
mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use phmsa_docs::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "phmsa")]
#[command(about = "PHMSA pipeline enforcement document sync and location extraction")]
#[command(version)]
pub struct Cli {
    /// Target data directory (overrides config file)
    #[arg(long, short = 't', global = true)]
    target: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve relative paths from current working directory instead of config file location
    #[arg(long, global = true)]
    cwd: bool,

    /// Directory holding one folder per case (default: <data dir>/phmsa_pdfs)
    #[arg(long, global = true, env = "PHMSA_DOCUMENTS_DIR")]
    documents_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Which cases a sync run covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SyncModeArg {
    /// Every listed case
    #[default]
    All,
    /// Every listed case, fetching only documents not yet on disk
    Missing,
    /// Only the cases given with --cases
    Cases,
}

/// Output format for extraction results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Download case documents from the enforcement portal
    Sync {
        /// Which cases to process
        #[arg(short, long, value_enum, default_value = "all")]
        mode: SyncModeArg,
        /// Re-download documents that already exist (ignored in missing mode)
        #[arg(long)]
        overwrite: bool,
        /// Comma-separated case codes (implies --mode cases)
        #[arg(long)]
        cases: Option<String>,
        /// In missing mode, skip cases whose folder already exists
        #[arg(long)]
        skip_existing_folders: bool,
        /// Delay after each request in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// List case codes from the remote case listing
    Cases {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract inspection locations from the PDFs in a folder
    Extract {
        /// Folder containing PDF files
        folder: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write results to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the bulk enforcement raw-data file
    RawData {
        /// Destination file (default: <data dir>/PHMSA Pipeline Enforcement Raw Data.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        use_cwd: cli.cwd,
        target: cli.target,
    };
    let (mut settings, _config) = load_settings_with_options(options).await;

    if let Some(dir) = cli.documents_dir {
        settings.documents_dir = dir;
    }

    match cli.command {
        Commands::Sync {
            mode,
            overwrite,
            cases,
            skip_existing_folders,
            delay_ms,
            timeout,
        } => {
            if let Some(delay) = delay_ms {
                settings.request_delay_ms = delay;
            }
            if let Some(timeout) = timeout {
                settings.request_timeout = timeout;
            }
            let plan = sync::build_plan(mode, overwrite, cases.as_deref(), skip_existing_folders)?;
            sync::cmd_sync(&settings, plan).await
        }
        Commands::Cases { json } => sync::cmd_cases(&settings, json).await,
        Commands::Extract {
            folder,
            format,
            output,
        } => extract::cmd_extract(&settings, &folder, format, output.as_deref()).await,
        Commands::RawData { output } => raw_data::cmd_raw_data(&settings, output).await,
    }
}
