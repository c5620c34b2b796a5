use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::BenchError;
use crate::matrix::ResultMatrix;
use crate::types::{BinaryDef, PlotConfig, TestDef};

pub const DATA_EXTENSION: &str = "dat";
pub const IMAGE_EXTENSION: &str = "png";

/// `<base>.dat`
pub fn data_path(base: &str) -> PathBuf {
    PathBuf::from(format!("{base}.{DATA_EXTENSION}"))
}

/// `<base>.png`
pub fn image_path(base: &str) -> PathBuf {
    PathBuf::from(format!("{base}.{IMAGE_EXTENSION}"))
}

/// Render the matrix as tab-separated text.
///
/// The header is `test` followed by each binary label; each row is the test
/// label followed by its values with `precision` decimals. Missing cells are
/// written as `0`.
pub fn format_tsv(
    matrix: &ResultMatrix,
    tests: &[TestDef],
    binaries: &[BinaryDef],
    precision: usize,
) -> String {
    let mut out = String::from("test");
    for binary in binaries {
        out.push('\t');
        out.push_str(&binary.name);
    }
    out.push('\n');

    for (row, test) in tests.iter().enumerate() {
        out.push_str(&test.name);
        for cell in matrix.row(row) {
            out.push_str(&format!("\t{:.*}", precision, cell.unwrap_or(0.0)));
        }
        out.push('\n');
    }

    out
}

/// Write `contents` to `path` via a temporary file in the same directory, so
/// readers never see a half-written report.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), BenchError> {
    let write_error = |source: std::io::Error| BenchError::ReportWriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(contents.as_bytes()).map_err(write_error)?;
    tmp.flush().map_err(write_error)?;
    tmp.persist(path).map_err(|e| write_error(e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}

/// Serialize the matrix and write it to `<base>.dat`. Returns the path written.
pub fn write_report(
    base: &str,
    matrix: &ResultMatrix,
    tests: &[TestDef],
    binaries: &[BinaryDef],
    precision: usize,
) -> Result<PathBuf, BenchError> {
    let path = data_path(base);
    write_atomic(&path, &format_tsv(matrix, tests, binaries, precision))?;
    info!(path = %path.display(), "wrote report");
    Ok(path)
}

/// Arguments passed to the renderer: three `-e` assignments and the script.
pub fn plot_args(
    plot: &PlotConfig,
    data_file: &Path,
    image_file: &Path,
    columns: usize,
) -> Vec<String> {
    vec![
        "-e".to_string(),
        format!("datafile={}", gnuplot_quote(&data_file.to_string_lossy())),
        "-e".to_string(),
        format!("outfile={}", gnuplot_quote(&image_file.to_string_lossy())),
        "-e".to_string(),
        format!("columns={columns}"),
        plot.script.to_string_lossy().into_owned(),
    ]
}

/// Run the renderer and wait for it. Its exit status is not inspected; only
/// a failure to start it at all is an error.
pub fn render_plot(
    plot: &PlotConfig,
    data_file: &Path,
    image_file: &Path,
    columns: usize,
) -> Result<(), BenchError> {
    let args = plot_args(plot, data_file, image_file, columns);
    let status = Command::new(&plot.command)
        .args(&args)
        .status()
        .map_err(|source| BenchError::PlotError {
            command: plot.command.clone(),
            source,
        })?;
    debug!(command = %plot.command, ?args, %status, "plot command exited");
    Ok(())
}

/// Single-quoted gnuplot string literal; `'` is escaped by doubling it.
fn gnuplot_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
