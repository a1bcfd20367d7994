//! Config command implementation.
//!
//! Shows the effective configuration: the global file merged with the
//! project override, or the file given with `--config`.

use crate::cli::{Cli, ConfigArgs};
use crate::config::default_config_path;
use crate::error::Result;

use super::Context;

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    if args.path {
        return show_config_path(cli);
    }

    let ctx = Context::from_cli(cli)?;
    print!("{}", ctx.config.to_toml()?);
    Ok(())
}

/// Show configuration file path.
fn show_config_path(cli: &Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}
