//! Command-line interface for prompt-rewind.
//!
//! Four commands:
//! - `history`: Print the merged prompt history for a directory
//! - `search`: Match the history against a pattern
//! - `prompt`: Interactive prompt with history and reverse search
//! - `config`: Show the effective configuration

mod commands;

pub use commands::Context;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::discovery::SESSIONS_DIR_ENV;
use crate::error::Result;

/// Prompt history and reverse search over coding-agent session logs.
#[derive(Debug, Parser)]
#[command(name = "rewind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Working directory whose sessions are used (default: current directory).
    #[arg(short = 'C', long, global = true, env = "REWIND_CWD")]
    pub cwd: Option<PathBuf>,

    /// Sessions root (default: ~/.pi/agent/sessions).
    #[arg(short = 'd', long, global = true, env = SESSIONS_DIR_ENV)]
    pub sessions_dir: Option<PathBuf>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "REWIND_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "REWIND_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "REWIND_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Log output file (default: stderr).
    #[arg(long, global = true, env = "REWIND_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the prompt history for the working directory.
    #[command(alias = "h")]
    History(HistoryArgs),

    /// Search the prompt history, most recent match first.
    #[command(alias = "s", alias = "find")]
    Search(SearchArgs),

    /// Read prompts interactively with history and reverse search.
    #[command(alias = "p")]
    Prompt(PromptArgs),

    /// Show the effective configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),
}

/// Arguments for the history command.
#[derive(Debug, Clone, clap::Args)]
pub struct HistoryArgs {
    /// Treat this log as the active session.
    #[arg(short, long)]
    pub session: Option<PathBuf>,

    /// Only print the newest N entries.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the search command.
#[derive(Debug, Clone, clap::Args)]
pub struct SearchArgs {
    /// Case-insensitive pattern.
    pub pattern: String,

    /// Treat this log as the active session.
    #[arg(short, long)]
    pub session: Option<PathBuf>,
}

/// Arguments for the prompt command.
#[derive(Debug, Clone, clap::Args)]
pub struct PromptArgs {
    /// Treat this log as the active session.
    #[arg(short, long)]
    pub session: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Print the configuration file path instead.
    #[arg(long)]
    pub path: bool,
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let writer = match &cli.log_file {
        Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => BoxMakeWriter::new(std::sync::Arc::new(file)),
            Err(e) => {
                eprintln!("Warning: Could not open log file {}: {e}", path.display());
                BoxMakeWriter::new(std::io::stderr)
            }
        },
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = cli.log_file.is_none();

    // Build subscriber based on log format
    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(ansi)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_ansi(ansi).with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match &cli.command {
        Commands::History(args) => commands::history::run(&cli, args),
        Commands::Search(args) => commands::search::run(&cli, args),
        Commands::Prompt(args) => commands::prompt::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
    }
}
