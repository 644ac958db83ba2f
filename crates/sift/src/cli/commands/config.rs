//! Implementation of `sift config`.

use std::process::ExitCode;

use crate::cli::{args::ConfigCommand, context::CommandContext, output::fail};

/// Shows effective configuration settings, or the files they came from.
pub fn run(ctx: &CommandContext, cmd: &ConfigCommand) -> ExitCode {
    if cmd.files {
        if ctx.config_files.is_empty() {
            println!("No configuration files found.");
        }
        for path in &ctx.config_files {
            println!("{}", path.display());
        }
        return ExitCode::SUCCESS;
    }

    match ctx.config.settings_to_toml() {
        Ok(toml) => {
            print!("{toml}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
