//! Error types for sift configuration.

use std::{io, path::PathBuf};

use thiserror::Error;
use toml::{de, ser};

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// A parse limit was set to zero.
    #[error("{path}: limits.{name} must be at least 1")]
    InvalidLimit {
        /// Config file that sets the limit.
        path: PathBuf,
        /// Name of the limit key.
        name: &'static str,
    },

    /// A field alias entry lists no concrete paths.
    #[error("{path}: field '{field}' must map to at least one non-empty path")]
    EmptyAliases {
        /// Config file that defines the field.
        path: PathBuf,
        /// The logical field name.
        field: String,
    },

    /// Failed to render settings back to TOML.
    #[error("failed to serialize settings: {source}")]
    SerializeToml {
        /// Underlying TOML serialization error.
        #[from]
        source: ser::Error,
    },
}
