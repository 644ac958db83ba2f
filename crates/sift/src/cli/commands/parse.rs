//! Implementation of `sift parse`.

use std::process::ExitCode;

use sift_query::{parse_with_limits, tokenize_with_limits};

use crate::cli::{
    args::ParseCommand,
    context::CommandContext,
    output::{fail, print_tokens, print_tokens_json},
};

/// Prints the token stream, syntax tree or canonical form of a query.
pub fn run(ctx: &CommandContext, cmd: &ParseCommand) -> ExitCode {
    let limits = ctx.config.parse_limits();

    if cmd.tokens {
        return match tokenize_with_limits(&cmd.query, &limits) {
            Ok(tokens) if cmd.json => print_tokens_json(&cmd.query, &tokens),
            Ok(tokens) => {
                print_tokens(&cmd.query, &tokens);
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        };
    }

    let expr = match parse_with_limits(&cmd.query, &limits) {
        Ok(expr) => expr,
        Err(e) => return fail(&e),
    };
    if cmd.canonical {
        println!("{expr}");
    } else {
        print!("{}", expr.to_tree_string());
    }
    ExitCode::SUCCESS
}
