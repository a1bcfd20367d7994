//! Prompt command implementation.
//!
//! Launches the interactive prompt and prints the submitted line.

use crate::cli::{Cli, PromptArgs};
use crate::editor::BorderStyle;
use crate::error::Result;
use crate::tui::{self, PromptOptions};

use super::{build_runtime, Context};

/// Run the prompt command.
pub fn run(cli: &Cli, args: &PromptArgs) -> Result<()> {
    let ctx = Context::from_cli(cli)?;
    let options = PromptOptions {
        session: ctx.active_session(args.session.as_deref())?,
        aggregator: ctx.aggregator(),
        keys: ctx.config.search.keys()?,
        border: BorderStyle::default(),
        cwd: ctx.cwd,
    };

    let runtime = build_runtime()?;
    let submitted = {
        let _guard = runtime.enter();
        tui::run(options)
    };
    // Pending history passes are abandoned with the runtime.
    runtime.shutdown_background();

    if let Some(line) = submitted? {
        println!("{line}");
    }
    Ok(())
}
