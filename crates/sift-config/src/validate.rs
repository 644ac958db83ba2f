//! Per-file validation of raw configuration.

use std::path::Path;

use crate::{ConfigError, parse::RawConfig};

/// Rejects values that parse as TOML but can never work.
///
/// Runs on each file before merging so errors name the file at fault.
pub fn validate_raw(config: &RawConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(limits) = &config.limits {
        for (name, value) in [("max_depth", limits.max_depth), ("max_tokens", limits.max_tokens)] {
            if value == Some(0) {
                return Err(ConfigError::InvalidLimit {
                    path: path.to_path_buf(),
                    name,
                });
            }
        }
    }

    if let Some(fields) = &config.fields {
        for (field, paths) in fields {
            if paths.is_empty() || paths.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyAliases {
                    path: path.to_path_buf(),
                    field: field.clone(),
                });
            }
        }
    }

    Ok(())
}
