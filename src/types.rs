use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::BenchError;

/// A workload: display label plus the fragment appended to a binary invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestDef {
    pub name: String,
    #[serde(default)]
    pub args: String,
}

/// An interpreter under test.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BinaryDef {
    pub name: String,
    pub path: String,
}

impl TestDef {
    pub fn new(name: &str, args: &str) -> Self {
        Self {
            name: name.to_string(),
            args: args.to_string(),
        }
    }
}

impl BinaryDef {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }

    /// Full shell command for running `test` with this binary.
    pub fn command_for(&self, test: &TestDef) -> String {
        if test.args.trim().is_empty() {
            self.path.clone()
        } else {
            format!("{} {}", self.path, test.args)
        }
    }
}

/// Per-row transformation applied before the report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Raw,
    Speedup,
    Normalize,
}

impl Mode {
    /// Resolve the two CLI flags into a single mode, rejecting the ambiguous pair.
    pub fn from_flags(normalize: bool, speedup: bool) -> Result<Self, BenchError> {
        match (normalize, speedup) {
            (true, true) => Err(BenchError::ConflictingModes),
            (true, false) => Ok(Mode::Normalize),
            (false, true) => Ok(Mode::Speedup),
            (false, false) => Ok(Mode::Raw),
        }
    }
}

/// External renderer invocation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub command: String,
    pub script: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            command: "gnuplot".to_string(),
            script: PathBuf::from("plot.gnuplot"),
        }
    }
}

/// Immutable run configuration, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub runs: usize,
    pub suppress_errors: bool,
    pub output: String,
    pub mode: Mode,
    pub plot: bool,
    pub timeout: Option<Duration>,
    pub precision: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runs: 3,
            suppress_errors: true,
            output: "results".to_string(),
            mode: Mode::Raw,
            plot: true,
            timeout: None,
            precision: 3,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.runs == 0 {
            return Err(BenchError::InvalidRuns);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_flags() {
        assert_eq!(Mode::from_flags(false, false).unwrap(), Mode::Raw);
        assert_eq!(Mode::from_flags(true, false).unwrap(), Mode::Normalize);
        assert_eq!(Mode::from_flags(false, true).unwrap(), Mode::Speedup);
    }

    #[test]
    fn mode_from_both_flags_rejected() {
        let err = Mode::from_flags(true, true).unwrap_err();
        assert!(matches!(err, BenchError::ConflictingModes));
    }

    #[test]
    fn command_joins_path_and_args() {
        let bin = BinaryDef::new("lua", "/usr/bin/lua5.4");
        let test = TestDef::new("fib", "fib.lua 30 < input.txt");
        assert_eq!(bin.command_for(&test), "/usr/bin/lua5.4 fib.lua 30 < input.txt");
    }

    #[test]
    fn command_without_args() {
        let bin = BinaryDef::new("true", "true");
        let test = TestDef::new("noop", "");
        assert_eq!(bin.command_for(&test), "true");
    }

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.runs, 3);
        assert!(settings.suppress_errors);
        assert_eq!(settings.output, "results");
        assert!(settings.plot);
        assert_eq!(settings.mode, Mode::Raw);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_runs_rejected() {
        let settings = Settings {
            runs: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(BenchError::InvalidRuns)));
    }
}
