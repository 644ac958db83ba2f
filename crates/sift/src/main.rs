//! Command-line interface for the `sift` query engine.

use std::process::ExitCode;

use clap::Parser;
use sift::cli::{CommandContext, args::Cli, commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = match CommandContext::load(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    commands::run(cli.command, &ctx)
}
