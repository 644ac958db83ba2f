//! Configuration system for sift.
//!
//! sift uses TOML configuration files named `.sift.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.sift.toml` files found, then loading `~/.sift.toml` as the global config with lowest
//! precedence.
//!
//! A config supplies the parser's hard limits, the compiler's options and the table of
//! logical fields with the concrete index paths each one resolves to.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{RawCompileSettings, RawConfig, RawLimits, parse_config_file, parse_config_str};
use serde::{Deserialize, Serialize};
use sift_predicate::{AliasTable, CompileOptions, FieldAliases, UnknownFieldPolicy};
use sift_query::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKENS, ParseLimits};
use tracing::debug;
use validate::validate_raw;

/// Top-level merged configuration for sift.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parser hard limits.
    pub limits: LimitSettings,
    /// Compiler settings.
    pub compile: CompileSettings,
    /// Logical field name -> concrete paths, each list non-empty.
    pub fields: BTreeMap<String, Vec<String>>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.sift.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        debug!(files = ?config_files, "discovered config files");
        Self::load_from_files(&config_files)
    }

    /// Loads a single explicitly named file, skipping discovery.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_from_files(&[path.to_path_buf()])
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                validate_raw(&config, path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(merge_configs(&parsed))
    }

    /// The parser limits this configuration sets.
    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_depth: self.limits.max_depth,
            max_tokens: self.limits.max_tokens,
        }
    }

    /// The compiler options this configuration sets.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            unknown_fields: self.compile.unknown_fields,
            merge_ranges: self.compile.merge_ranges,
        }
    }

    /// Builds the field resolver for the `[fields]` table.
    ///
    /// With no fields configured at all, every field resolves to itself.
    pub fn alias_table(&self) -> AliasTable {
        let table: AliasTable = self
            .fields
            .iter()
            .filter_map(|(name, paths)| {
                FieldAliases::from_paths(paths.iter().map(String::as_str))
                    .map(|aliases| (name.clone(), aliases))
            })
            .collect();
        if table.is_empty() {
            table.with_fallback_identity()
        } else {
            table
        }
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same shape as a `.sift.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            limits: &self.limits,
            compile: &self.compile,
            fields: &self.fields,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Parser hard limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Maximum nesting of parenthesised nodes.
    pub max_depth: usize,
    /// Maximum number of tokens in one query.
    pub max_tokens: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Compiler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompileSettings {
    /// Handling of field names missing from `[fields]`.
    pub unknown_fields: UnknownFieldPolicy,
    /// Whether complementary ranges are merged.
    pub merge_ranges: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        let options = CompileOptions::default();
        Self {
            unknown_fields: options.unknown_fields,
            merge_ranges: options.merge_ranges,
        }
    }
}

/// Borrowed view of the settings for TOML output.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Parser hard limits.
    limits: &'a LimitSettings,
    /// Compiler settings.
    compile: &'a CompileSettings,
    /// Field alias table.
    fields: &'a BTreeMap<String, Vec<String>>,
}
