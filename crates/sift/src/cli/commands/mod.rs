//! Command implementations and dispatch.

pub mod compile;
pub mod config;
pub mod parse;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Parse(cmd) => parse::run(ctx, &cmd),
        Commands::Compile(cmd) => compile::run(ctx, &cmd),
        Commands::Config(cmd) => config::run(ctx, &cmd),
    }
}
