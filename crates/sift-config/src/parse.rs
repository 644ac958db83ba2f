//! Configuration file parsing.
//!
//! Parses individual `.sift.toml` files into intermediate `RawConfig` structures that
//! keep every key optional until the files are merged.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
use sift_predicate::UnknownFieldPolicy;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Parse limit section.
    pub limits: Option<RawLimits>,
    /// Compile settings section.
    pub compile: Option<RawCompileSettings>,
    /// Logical field name -> one or many concrete paths.
    #[serde_as(as = "Option<BTreeMap<_, OneOrMany<_>>>")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// Raw `[limits]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLimits {
    /// Maximum nesting of parenthesised nodes.
    pub max_depth: Option<usize>,
    /// Maximum number of tokens in one query.
    pub max_tokens: Option<usize>,
}

/// Raw `[compile]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCompileSettings {
    /// Handling of field names missing from `[fields]`.
    pub unknown_fields: Option<UnknownFieldPolicy>,
    /// Whether complementary ranges are merged.
    pub merge_ranges: Option<bool>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> RawConfig {
        parse_config_str(toml, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse("");
        assert!(config.root.is_none());
        assert!(config.limits.is_none());
        assert!(config.compile.is_none());
        assert!(config.fields.is_none());
    }

    #[test]
    fn test_parse_limits() {
        let config = parse(
            r"
[limits]
max_depth = 8
",
        );
        let limits = config.limits.unwrap();
        assert_eq!(limits.max_depth, Some(8));
        assert!(limits.max_tokens.is_none());
    }

    #[test]
    fn test_parse_compile_settings() {
        let config = parse(
            r#"
[compile]
unknown_fields = "pass-through"
merge_ranges = false
"#,
        );
        let compile = config.compile.unwrap();
        assert_eq!(compile.unknown_fields, Some(UnknownFieldPolicy::PassThrough));
        assert_eq!(compile.merge_ranges, Some(false));
    }

    #[test]
    fn test_parse_fields_one_or_many() {
        let config = parse(
            r#"
[fields]
name = "name"
state = ["state", "v_municipality.state"]
"#,
        );
        let fields = config.fields.unwrap();
        assert_eq!(fields["name"], vec!["name"]);
        assert_eq!(fields["state"], vec!["state", "v_municipality.state"]);
    }

    #[test]
    fn test_parse_unknown_policy_rejected() {
        let result = parse_config_str(
            "[compile]\nunknown_fields = \"ignore\"\n",
            Path::new("bad.toml"),
        );
        assert!(matches!(result, Err(ConfigError::ParseToml { .. })));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_config_str("[limits", Path::new("bad.toml"));
        let Err(ConfigError::ParseToml { path, .. }) = result else {
            panic!("expected parse error");
        };
        assert_eq!(path, Path::new("bad.toml"));
    }

    #[test]
    fn test_is_root_config() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root.toml");
        let plain = dir.path().join("plain.toml");
        let broken = dir.path().join("broken.toml");
        fs::write(&root, "root = true\n").unwrap();
        fs::write(&plain, "[limits]\nmax_depth = 3\n").unwrap();
        fs::write(&broken, "root = ").unwrap();

        assert!(is_root_config(&root));
        assert!(!is_root_config(&plain));
        assert!(!is_root_config(&broken));
        assert!(!is_root_config(&dir.path().join("missing.toml")));
    }
}
