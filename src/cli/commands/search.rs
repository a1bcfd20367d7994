//! Search command implementation.
//!
//! Runs the reverse-search matcher once over the full history and prints
//! every match, most recent first.

use std::io::{self, IsTerminal, Write};

use tracing::warn;

use crate::cli::{Cli, SearchArgs};
use crate::editor::single_line;
use crate::error::Result;
use crate::search::render::highlight;
use crate::search::{compile_query, find_matches};

use super::history::format_timestamp;
use super::Context;

/// Run the search command.
pub fn run(cli: &Cli, args: &SearchArgs) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let session = ctx.active_session(args.session.as_deref())?;
    let history = ctx.full_history(&session)?;

    if compile_query(&args.pattern).is_none() {
        warn!(pattern = %args.pattern, "Pattern is not a valid regex, nothing matches");
    }

    let matches = find_matches(&history, &args.pattern);
    let colored = io::stdout().is_terminal();

    let mut stdout = io::stdout().lock();
    for entry in &matches {
        let text = single_line(&entry.text);
        let text = if colored {
            highlight(&text, &args.pattern)
        } else {
            text
        };
        writeln!(stdout, "{}  {}", format_timestamp(entry.timestamp), text)?;
    }

    Ok(())
}
