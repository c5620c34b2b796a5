use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Could not parse timing output of `{command}`: {output:?}")]
    ParseError { command: String, output: String },

    #[error("Failed to run `{command}`: {source}")]
    SpawnError {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exceeded the {}s timeout and was killed", .timeout.as_secs_f64())]
    Timeout { command: String, timeout: Duration },

    #[error("Measuring '{test}' with '{binary}' failed: {source}")]
    CellFailure {
        test: String,
        binary: String,
        source: Box<BenchError>,
    },

    #[error("Run count must be at least 1")]
    InvalidRuns,

    #[error("--speedup and --normalize are mutually exclusive")]
    ConflictingModes,

    #[error("No benchmark suite found at {path}. Pass --suite <PATH>")]
    SuiteNotFound { path: PathBuf },

    #[error("Failed to read suite file {path}: {source}")]
    SuiteReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse suite file {path}: {detail}")]
    SuiteParseError { path: PathBuf, detail: String },

    #[error("Suite file {path} defines no {kind}")]
    EmptySuite { path: PathBuf, kind: &'static str },

    #[error("Failed to write report {path}: {source}")]
    ReportWriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to run plot command '{command}': {source}")]
    PlotError {
        command: String,
        source: std::io::Error,
    },
}
