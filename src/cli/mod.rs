//! Command-line interface for `ingest_store`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::DbConfig;
use crate::logging::{self, LogFormat};
use crate::storage::{DbPool, MetadataStore};

/// `istore` - record ingestion events and raw document metadata.
#[derive(Parser, Debug)]
#[command(name = "istore")]
#[command(
    author,
    version,
    about = "Record ingestion events and deduplicated raw document metadata",
    long_about = None,
    after_help = "Database settings come from --config, then APP_DB_* variables, then --db."
)]
pub struct Cli {
    /// Database file (overrides config and APP_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// YAML config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the ingestion tables in a fresh database
    Init,

    /// Print the content hash of a file (or stdin)
    Hash(HashArgs),

    /// Append an ingestion event
    LogEvent(LogEventArgs),

    /// Record raw document metadata (no-op if source + hash already exist)
    Insert(InsertArgs),

    /// Check the database has the schema the store writes to
    Doctor,

    /// Show version information
    Version,
}

#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash; reads stdin when omitted
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LogEventArgs {
    /// Origin system or connector
    #[arg(long)]
    pub source: String,

    /// What happened (e.g. fetched, rejected, duplicate)
    #[arg(long)]
    pub event_type: String,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub content_hash: Option<String>,

    #[arg(long)]
    pub reason: Option<String>,
}

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Origin system or connector
    #[arg(long)]
    pub source: String,

    /// Security status (accepted, rejected, quarantined, or a custom label)
    #[arg(long)]
    pub status: String,

    /// Document file; its hash and length are computed
    #[arg(long, conflicts_with = "content_hash")]
    pub file: Option<PathBuf>,

    /// Precomputed content hash
    #[arg(long, required_unless_present = "file")]
    pub content_hash: Option<String>,

    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub rejection_reason: Option<String>,

    /// Payload metadata as a JSON object
    #[arg(long, value_name = "JSON")]
    pub meta: Option<String>,

    #[arg(long)]
    pub content_type: Option<String>,

    #[arg(long)]
    pub content_length: Option<u64>,

    /// Bucket holding the stored blob
    #[arg(long, requires = "object_path")]
    pub bucket: Option<String>,

    /// Path of the stored blob inside the bucket
    #[arg(long, requires = "bucket")]
    pub object_path: Option<String>,
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: DbConfig,
    pub json: bool,
}

impl CommandContext {
    /// Open the pool and wrap it in a store.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be opened.
    pub fn open_store(&self) -> Result<MetadataStore> {
        let pool = DbPool::open(&self.config).with_context(|| {
            format!(
                "failed to open database {}",
                self.config.database_path().display()
            )
        })?;
        Ok(MetadataStore::new(pool))
    }
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.log_json.then_some(LogFormat::Json);
    logging::init_logging(cli.verbose, cli.quiet, format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let ctx = build_context(&cli)?;
    tracing::debug!(command = cli.command.name(), "dispatching");

    match cli.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Hash(args) => commands::hash::execute(&args, &ctx),
        Commands::LogEvent(args) => commands::log_event::execute(&args, &ctx),
        Commands::Insert(args) => commands::insert::execute(&args, &ctx),
        Commands::Doctor => commands::doctor::execute(&ctx),
        Commands::Version => commands::version::execute(&ctx),
    }
}

fn build_context(cli: &Cli) -> Result<CommandContext> {
    let mut config =
        DbConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &cli.db {
        config = config.with_path(path.clone());
    }
    Ok(CommandContext {
        config,
        json: cli.json,
    })
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Hash(_) => "hash",
            Self::LogEvent(_) => "log-event",
            Self::Insert(_) => "insert",
            Self::Doctor => "doctor",
            Self::Version => "version",
        }
    }
}
