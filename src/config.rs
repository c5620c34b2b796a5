use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::errors::BenchError;
use crate::types::{BinaryDef, PlotConfig, TestDef};

pub const SUITE_FILE_NAME: &str = "interpbench.toml";

/// Contents of a suite file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(rename = "binary", default)]
    pub binaries: Vec<BinaryDef>,
    #[serde(rename = "test", default)]
    pub tests: Vec<TestDef>,
}

/// Suite-level defaults; command-line flags win over these.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub runs: Option<usize>,
    /// Seconds.
    pub timeout: Option<f64>,
    pub precision: Option<usize>,
    pub output: Option<String>,
}

/// Places searched, in order, when no suite path is given.
pub fn default_suite_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SUITE_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("interpbench").join("suite.toml"));
    }
    paths
}

/// Pick the suite file: the explicit path if given, else the first default
/// location that exists.
pub fn locate_suite(explicit: Option<&Path>) -> Result<PathBuf, BenchError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(BenchError::SuiteNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(path.to_path_buf());
    }

    default_suite_paths()
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| BenchError::SuiteNotFound {
            path: PathBuf::from(SUITE_FILE_NAME),
        })
}

pub fn load_suite(path: &Path) -> Result<Suite, BenchError> {
    let text = std::fs::read_to_string(path).map_err(|source| BenchError::SuiteReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let suite = parse_suite(&text, path)?;
    debug!(
        path = %path.display(),
        tests = suite.tests.len(),
        binaries = suite.binaries.len(),
        "loaded suite"
    );
    Ok(suite)
}

/// Parse and validate suite text. `path` is only used in error messages.
pub fn parse_suite(text: &str, path: &Path) -> Result<Suite, BenchError> {
    let suite: Suite = toml::from_str(text).map_err(|e| BenchError::SuiteParseError {
        path: path.to_path_buf(),
        detail: e.message().to_string(),
    })?;

    if suite.binaries.is_empty() {
        return Err(BenchError::EmptySuite {
            path: path.to_path_buf(),
            kind: "binaries",
        });
    }
    if suite.tests.is_empty() {
        return Err(BenchError::EmptySuite {
            path: path.to_path_buf(),
            kind: "tests",
        });
    }
    if let Some(timeout) = suite.defaults.timeout
        && !matches!(Duration::try_from_secs_f64(timeout), Ok(d) if !d.is_zero())
    {
        return Err(BenchError::SuiteParseError {
            path: path.to_path_buf(),
            detail: format!("timeout must be a positive number of seconds, got {timeout}"),
        });
    }

    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FULL: &str = r#"
[defaults]
runs = 5
timeout = 30
precision = 4
output = "lua-results"

[plot]
command = "/opt/gnuplot/bin/gnuplot"
script = "scripts/bars.gnuplot"

[[binary]]
name = "lua 5.4"
path = "lua5.4"

[[binary]]
name = "luajit"
path = "/usr/local/bin/luajit"

[[test]]
name = "fib"
args = "workloads/fib.lua 30"

[[test]]
name = "startup"
"#;

    fn path() -> &'static Path {
        Path::new("suite.toml")
    }

    #[test]
    fn parse_full_suite() {
        let suite = parse_suite(FULL, path()).unwrap();
        assert_eq!(suite.defaults.runs, Some(5));
        assert_eq!(suite.defaults.timeout, Some(30.0));
        assert_eq!(suite.defaults.precision, Some(4));
        assert_eq!(suite.defaults.output.as_deref(), Some("lua-results"));
        assert_eq!(suite.plot.command, "/opt/gnuplot/bin/gnuplot");
        assert_eq!(suite.plot.script, PathBuf::from("scripts/bars.gnuplot"));
        assert_eq!(
            suite.binaries,
            vec![
                BinaryDef::new("lua 5.4", "lua5.4"),
                BinaryDef::new("luajit", "/usr/local/bin/luajit"),
            ]
        );
        assert_eq!(
            suite.tests,
            vec![
                TestDef::new("fib", "workloads/fib.lua 30"),
                TestDef::new("startup", ""),
            ]
        );
    }

    #[test]
    fn minimal_suite_uses_defaults() {
        let text = r#"
[[binary]]
name = "A"
path = "a"

[[test]]
name = "t1"
args = "x"
"#;
        let suite = parse_suite(text, path()).unwrap();
        assert_eq!(suite.defaults.runs, None);
        assert_eq!(suite.plot, PlotConfig::default());
    }

    #[test]
    fn declaration_order_preserved() {
        let text = r#"
[[binary]]
name = "z"
path = "z"
[[binary]]
name = "a"
path = "a"
[[test]]
name = "second"
[[test]]
name = "first"
"#;
        let suite = parse_suite(text, path()).unwrap();
        let bins: Vec<_> = suite.binaries.iter().map(|b| b.name.as_str()).collect();
        let tests: Vec<_> = suite.tests.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(bins, vec!["z", "a"]);
        assert_eq!(tests, vec!["second", "first"]);
    }

    #[test]
    fn no_binaries_rejected() {
        let text = "[[test]]\nname = \"t\"\n";
        let err = parse_suite(text, path()).unwrap_err();
        assert!(matches!(err, BenchError::EmptySuite { kind: "binaries", .. }));
    }

    #[test]
    fn no_tests_rejected() {
        let text = "[[binary]]\nname = \"a\"\npath = \"a\"\n";
        let err = parse_suite(text, path()).unwrap_err();
        assert!(matches!(err, BenchError::EmptySuite { kind: "tests", .. }));
    }

    #[test]
    fn unknown_field_rejected() {
        let text = "[defaults]\nrepeats = 3\n";
        let err = parse_suite(text, path()).unwrap_err();
        assert!(matches!(err, BenchError::SuiteParseError { .. }));
        assert!(err.to_string().contains("suite.toml"));
    }

    #[test]
    fn binary_without_path_rejected() {
        let text = "[[binary]]\nname = \"a\"\n[[test]]\nname = \"t\"\n";
        assert!(matches!(
            parse_suite(text, path()),
            Err(BenchError::SuiteParseError { .. })
        ));
    }

    #[test]
    fn non_positive_timeout_rejected() {
        let text = "[defaults]\ntimeout = 0\n[[binary]]\nname = \"a\"\npath = \"a\"\n[[test]]\nname = \"t\"\n";
        let err = parse_suite(text, path()).unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn oversized_timeout_rejected() {
        let text = "[defaults]\ntimeout = 1e20\n[[binary]]\nname = \"a\"\npath = \"a\"\n[[test]]\nname = \"t\"\n";
        let err = parse_suite(text, path()).unwrap_err();
        assert!(matches!(err, BenchError::SuiteParseError { .. }));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn load_suite_from_disk() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let file = tmp.path().join("bench.toml");
        fs::write(&file, FULL).unwrap();

        let suite = load_suite(&file).unwrap();
        assert_eq!(suite.tests.len(), 2);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let err = load_suite(Path::new("/nonexistent/interpbench.toml")).unwrap_err();
        assert!(matches!(err, BenchError::SuiteReadError { .. }));
    }

    #[test]
    fn locate_explicit_path() {
        let tmp = assert_fs::TempDir::new().unwrap();
        let file = tmp.path().join("bench.toml");
        fs::write(&file, FULL).unwrap();

        assert_eq!(locate_suite(Some(file.as_path())).unwrap(), file);
    }

    #[test]
    fn locate_explicit_missing_path() {
        let err = locate_suite(Some(Path::new("/nonexistent/bench.toml"))).unwrap_err();
        assert!(matches!(err, BenchError::SuiteNotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/bench.toml"));
    }

    #[test]
    fn default_paths_start_with_working_directory() {
        let paths = default_suite_paths();
        assert_eq!(paths[0], PathBuf::from(SUITE_FILE_NAME));
    }
}
