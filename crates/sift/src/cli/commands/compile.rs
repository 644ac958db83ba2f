//! Implementation of `sift compile`.

use std::process::ExitCode;

use sift_predicate::UnknownFieldPolicy;

use crate::cli::{
    args::CompileCommand,
    context::CommandContext,
    output::{fail, print_json},
};

/// Compiles a query against the configured fields and prints the predicate.
pub fn run(ctx: &CommandContext, cmd: &CompileCommand) -> ExitCode {
    let mut engine = ctx.engine();
    if cmd.pass_through {
        engine.options.unknown_fields = UnknownFieldPolicy::PassThrough;
    }
    if cmd.no_merge {
        engine.options.merge_ranges = false;
    }

    let resolver = ctx.resolver();
    match engine.run(&cmd.query, &resolver) {
        Ok(predicate) if cmd.json => print_json(&predicate),
        Ok(predicate) => {
            print!("{predicate}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
