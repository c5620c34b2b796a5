use std::io::Write;

use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::errors::BenchError;
use crate::matrix::ResultMatrix;
use crate::types::{BinaryDef, Mode, TestDef};

/// Start/done feedback on stderr for each sampled command.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn hidden() -> Self {
        Self { enabled: false }
    }

    pub fn start(&self, command: &str) {
        if !self.enabled {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "{} {} ",
            "running".if_supports_color(Stream::Stderr, |s| s.cyan()),
            command
        );
        let _ = err.flush();
    }

    pub fn done(&self, best: f64) {
        if !self.enabled {
            return;
        }
        let _ = writeln!(
            std::io::stderr(),
            "{}",
            format!("done ({best:.3}s)").if_supports_color(Stream::Stderr, |s| s.green())
        );
    }

    pub fn failed(&self) {
        if !self.enabled {
            return;
        }
        let _ = writeln!(
            std::io::stderr(),
            "{}",
            "failed".if_supports_color(Stream::Stderr, |s| s.red())
        );
    }
}

/// Print a cell failure, including the raw text the command produced.
pub fn print_cell_failure(err: &BenchError) {
    eprintln!("{}", format_cell_failure(err));
}

pub fn format_cell_failure(err: &BenchError) -> String {
    format!(
        "{} {}",
        "error:".if_supports_color(Stream::Stderr, |s| s.style(Style::new().red().bold())),
        err
    )
}

/// One line per (test, binary) pair, in measurement order.
pub fn format_commands(tests: &[TestDef], binaries: &[BinaryDef]) -> String {
    let mut out = String::new();
    for test in tests {
        for binary in binaries {
            out.push_str(&format!(
                "{}\t{}\t{}\n",
                test.name,
                binary.name,
                binary.command_for(test)
            ));
        }
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    mode: Mode,
    binaries: Vec<&'a str>,
    rows: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    test: &'a str,
    values: Vec<Option<f64>>,
}

/// JSON rendering of the matrix. Missing cells become `null`.
pub fn format_json(
    matrix: &ResultMatrix,
    tests: &[TestDef],
    binaries: &[BinaryDef],
    mode: Mode,
    now: DateTime<Utc>,
) -> String {
    let report = JsonReport {
        generated_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        mode,
        binaries: binaries.iter().map(|b| b.name.as_str()).collect(),
        rows: tests
            .iter()
            .enumerate()
            .map(|(i, test)| JsonRow {
                test: &test.name,
                values: matrix.row(i).to_vec(),
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}
