//! Integration tests for sift-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> validate -> merge,
//! then feeds the result through the query engine.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use sift_config::{CONFIG_FILENAME, Config, ConfigError};
use sift_predicate::{Engine, EngineError, Predicate, UnknownFieldPolicy};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    /// Temporary root, removed on drop.
    root: tempfile::TempDir,
}

impl TestEnv {
    /// Creates an empty environment.
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    /// Root of the environment.
    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_single_root_config() {
    let env = TestEnv::new();
    env.create_file(
        CONFIG_FILENAME,
        r#"
root = true

[limits]
max_depth = 4

[fields]
state = ["state", "v_municipality.state"]
"#,
    );

    let config = Config::load(env.path()).unwrap();
    assert_eq!(config.limits.max_depth, 4);
    assert_eq!(config.limits.max_tokens, 4096);
    assert_eq!(config.fields.len(), 1);
    assert_eq!(
        config.config_root.as_deref().map(Path::canonicalize).unwrap().unwrap(),
        env.path().canonicalize().unwrap()
    );
}

#[test]
fn test_load_nested_configs_merging() {
    let env = TestEnv::new();
    let subdir = env.create_dir("project/subdir");

    env.create_file(
        CONFIG_FILENAME,
        r#"
root = true

[compile]
unknown_fields = "pass-through"

[fields]
state = "state"
name = "name"
"#,
    );
    env.create_file(
        "project/.sift.toml",
        r#"
[compile]
merge_ranges = false

[fields]
state = ["state", "v_municipality.state"]
"#,
    );

    let config = Config::load(&subdir).unwrap();
    assert_eq!(config.compile.unknown_fields, UnknownFieldPolicy::PassThrough);
    assert!(!config.compile.merge_ranges);
    assert_eq!(config.fields["state"].len(), 2);
    assert_eq!(config.fields["name"], vec!["name"]);
}

#[test]
fn test_explicit_file_skips_discovery() {
    let env = TestEnv::new();
    env.create_file(CONFIG_FILENAME, "root = true\n[limits]\nmax_depth = 2\n");
    let other = env.create_file("elsewhere/custom.toml", "[limits]\nmax_tokens = 10\n");

    let config = Config::load_file(&other).unwrap();
    assert_eq!(config.limits.max_depth, 64);
    assert_eq!(config.limits.max_tokens, 10);
}

#[test]
fn test_invalid_file_is_reported_with_path() {
    let env = TestEnv::new();
    let path = env.create_file(CONFIG_FILENAME, "root = true\n[limits]\nmax_depth = 0\n");

    let err = Config::load(env.path()).unwrap_err();
    let ConfigError::InvalidLimit { path: at, name } = &err else {
        panic!("expected invalid limit, got {err:?}");
    };
    assert_eq!(at, &path);
    assert_eq!(*name, "max_depth");
    assert!(err.to_string().contains("max_depth"));
}

#[test]
fn test_missing_explicit_file() {
    let env = TestEnv::new();
    let err = Config::load_file(&env.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_config_drives_engine() {
    let env = TestEnv::new();
    env.create_file(
        CONFIG_FILENAME,
        r#"
root = true

[limits]
max_depth = 1

[fields]
state = ["state", "v_municipality.state"]
"#,
    );

    let config = Config::load(env.path()).unwrap();
    let engine = Engine::new(config.parse_limits(), config.compile_options());
    let fields = config.alias_table();

    assert_eq!(
        engine.run("exists|state", &fields).unwrap(),
        Predicate::or(vec![
            Predicate::exists("state"),
            Predicate::exists("v_municipality.state"),
        ])
    );
    assert!(matches!(
        engine.run("exists|name", &fields),
        Err(EngineError::UnknownField { .. })
    ));
    assert!(matches!(
        engine.run("and(or(exists|state))", &fields),
        Err(EngineError::Syntax(_))
    ));
}
