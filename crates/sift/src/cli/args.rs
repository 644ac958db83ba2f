//! Clap argument definitions for the `sift` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Parse and compile record queries into search predicates")]
pub struct Cli {
    /// Use this config file instead of discovering .sift.toml files
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log verbosity (-v for debug, -vv for trace); overrides SIFT_LOG
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported `sift` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a query and print its syntax tree
    Parse(ParseCommand),

    /// Compile a query into a search predicate
    Compile(CompileCommand),

    /// Show effective configuration settings
    Config(ConfigCommand),
}

/// Arguments for `sift parse`.
#[derive(Args, Debug, Clone)]
pub struct ParseCommand {
    /// Query text
    pub query: String,

    /// Print the token stream instead of the tree
    #[arg(long, conflicts_with = "canonical")]
    pub tokens: bool,

    /// Print the query back in canonical form
    #[arg(long)]
    pub canonical: bool,

    /// Output tokens in JSON format (with --tokens)
    #[arg(long, requires = "tokens")]
    pub json: bool,
}

/// Arguments for `sift compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    /// Query text
    pub query: String,

    /// Output the predicate in JSON format
    #[arg(long)]
    pub json: bool,

    /// Pass unknown fields through unresolved instead of failing
    #[arg(long)]
    pub pass_through: bool,

    /// Keep single-bound ranges separate
    #[arg(long)]
    pub no_merge: bool,
}

/// Arguments for `sift config`.
#[derive(Args, Debug, Clone)]
pub struct ConfigCommand {
    /// List the config files in precedence order instead of the settings
    #[arg(long)]
    pub files: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["sift", "compile", "-vv", "--no-merge", "exists|pos"]);
        assert_eq!(cli.verbose, 2);
        let Commands::Compile(cmd) = cli.command else {
            panic!("expected compile");
        };
        assert!(cmd.no_merge);
        assert_eq!(cmd.query, "exists|pos");
    }

    #[test]
    fn json_tokens_need_tokens() {
        assert!(Cli::try_parse_from(["sift", "parse", "--json", "exists|pos"]).is_err());
    }
}
