//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    CompileSettings, Config, LimitSettings,
    parse::{RawCompileSettings, RawConfig, RawLimits},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to
/// the working directory), lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins
/// - Fields: merged by logical name, first definition wins completely
pub fn merge_configs(configs: &[ParsedConfig]) -> Config {
    let mut limits = LimitSettings::default();
    let mut compile = CompileSettings::default();

    // Iterate in reverse (lowest precedence first) so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref raw) = parsed.config.limits {
            apply_raw_limits(&mut limits, raw);
        }
        if let Some(ref raw) = parsed.config.compile {
            apply_raw_compile(&mut compile, raw);
        }
    }

    Config {
        limits,
        compile,
        fields: merge_fields(configs),
        config_root: configs
            .first()
            .and_then(|c| c.path.parent())
            .map(Path::to_path_buf),
    }
}

/// Applies raw limits to result, overwriting any present values.
fn apply_raw_limits(result: &mut LimitSettings, raw: &RawLimits) {
    if let Some(v) = raw.max_depth {
        result.max_depth = v;
    }
    if let Some(v) = raw.max_tokens {
        result.max_tokens = v;
    }
}

/// Applies raw compile settings to result, overwriting any present values.
fn apply_raw_compile(result: &mut CompileSettings, raw: &RawCompileSettings) {
    if let Some(v) = raw.unknown_fields {
        result.unknown_fields = v;
    }
    if let Some(v) = raw.merge_ranges {
        result.merge_ranges = v;
    }
}

/// Merges field alias tables; the closest definition of each field wins.
fn merge_fields(configs: &[ParsedConfig]) -> BTreeMap<String, Vec<String>> {
    let mut fields = BTreeMap::new();
    for parsed in configs {
        if let Some(ref raw) = parsed.config.fields {
            for (name, paths) in raw {
                fields
                    .entry(name.clone())
                    .or_insert_with(|| paths.clone());
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use sift_predicate::UnknownFieldPolicy;

    use super::*;
    use crate::parse::parse_config_str;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config_str(toml, Path::new(path)).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty() {
        let config = merge_configs(&[]);
        assert_eq!(config.limits, LimitSettings::default());
        assert!(config.fields.is_empty());
        assert!(config.config_root.is_none());
    }

    #[test]
    fn test_closest_scalar_wins() {
        let config = merge_configs(&[
            parsed("/project/.sift.toml", "[limits]\nmax_depth = 8\n"),
            parsed(
                "/home/.sift.toml",
                "[limits]\nmax_depth = 16\nmax_tokens = 100\n[compile]\nmerge_ranges = false\n",
            ),
        ]);
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_tokens, 100);
        assert!(!config.compile.merge_ranges);
        assert_eq!(config.compile.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.config_root, Some(PathBuf::from("/project")));
    }

    #[test]
    fn test_fields_merge_by_name() {
        let config = merge_configs(&[
            parsed("/a/.sift.toml", "[fields]\nstate = \"state\"\n"),
            parsed(
                "/.sift.toml",
                "[fields]\nstate = [\"state\", \"v_municipality.state\"]\nname = \"name\"\n",
            ),
        ]);
        assert_eq!(config.fields["state"], vec!["state"]);
        assert_eq!(config.fields["name"], vec!["name"]);
    }
}
