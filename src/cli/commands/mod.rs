//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic.

pub mod config;
pub mod history;
pub mod prompt;
pub mod search;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::Cli;
use crate::config::Config;
use crate::discovery::SessionDirectory;
use crate::error::{Result, RewindError};
use crate::history::HistoryAggregator;
use crate::model::HistoryList;
use crate::parser::PromptParser;
use crate::refresh::ActiveSession;

/// Everything a command needs, resolved from the CLI and config files.
#[derive(Debug, Clone)]
pub struct Context {
    /// Absolute working directory.
    pub cwd: PathBuf,
    /// Effective configuration.
    pub config: Config,
    /// Sessions root.
    pub sessions: SessionDirectory,
}

impl Context {
    /// Resolve the working directory, configuration and sessions root.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let current = std::env::current_dir()
            .map_err(|e| RewindError::io("Failed to read current directory", e))?;
        let cwd = match &cli.cwd {
            Some(path) if path.is_relative() => current.join(path),
            Some(path) => path.clone(),
            None => current,
        };

        let config = match &cli.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load_for_project(&cwd)?,
        };

        let explicit = cli
            .sessions_dir
            .as_deref()
            .or(config.sessions.directory.as_deref());
        let sessions = SessionDirectory::discover(explicit)?;
        debug!(cwd = %cwd.display(), root = %sessions.root().display(), "Resolved context");

        Ok(Self {
            cwd,
            config,
            sessions,
        })
    }

    /// An aggregator configured from the effective config.
    #[must_use]
    pub fn aggregator(&self) -> HistoryAggregator {
        HistoryAggregator::new(self.sessions.clone())
            .with_limits(self.config.history)
            .with_filter(self.config.filter.build())
    }

    /// The active session: the given log, or a fresh session with no prompts.
    pub fn active_session(&self, log: Option<&Path>) -> Result<ActiveSession> {
        match log {
            Some(path) => ActiveSession::from_log(path),
            None => Ok(ActiveSession::default()),
        }
    }

    /// Run a full aggregation pass to completion.
    pub fn full_history(&self, session: &ActiveSession) -> Result<HistoryList> {
        let aggregator = self.aggregator();
        let current = PromptParser::now()
            .with_filter(aggregator.filter().clone())
            .parse_records(&session.records);

        let runtime = build_runtime()?;
        Ok(runtime.block_on(aggregator.build_full(
            &current,
            &self.cwd,
            session.log_path.as_deref(),
        )))
    }
}

/// Build the tokio runtime used for background history passes.
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("rewind-history")
        .build()
        .map_err(|e| RewindError::io("Failed to start async runtime", e))
}
