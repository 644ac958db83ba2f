//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use sift_config::{Config, ConfigError, discover_config_files};
use sift_predicate::{AliasTable, Engine};

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Config files that were loaded, highest precedence first.
    pub config_files: Vec<PathBuf>,
    /// Loaded configuration (default if no config files were found).
    pub config: Config,
}

impl CommandContext {
    /// Loads configuration from `explicit`, or by discovery from the current directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ExitCode> {
        let (config_files, config) = match explicit {
            Some(path) => (vec![path.to_path_buf()], Config::load_file(path)),
            None => {
                let cwd = current_dir_or_failure()?;
                let files = discover_config_files(&cwd);
                let config = Config::load_from_files(&files);
                (files, config)
            }
        };
        let config = config.map_err(|e: ConfigError| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;
        Ok(Self {
            config_files,
            config,
        })
    }

    /// An engine using the configured limits and compile options.
    pub fn engine(&self) -> Engine {
        Engine::new(self.config.parse_limits(), self.config.compile_options())
    }

    /// The field resolver for the configured `[fields]` table.
    pub fn resolver(&self) -> AliasTable {
        self.config.alias_table()
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}
