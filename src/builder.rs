use tracing::{debug, info};

use crate::display::{self, Progress};
use crate::errors::BenchError;
use crate::matrix::ResultMatrix;
use crate::sampler;
use crate::timer::Timer;
use crate::types::{BinaryDef, Settings, TestDef};

/// Measure every (test, binary) pair, tests outer and binaries inner.
///
/// A failing pair leaves its cell missing and never stops the others. When
/// errors are not suppressed the diagnostic goes to stderr.
pub fn build_matrix<T: Timer + ?Sized>(
    tests: &[TestDef],
    binaries: &[BinaryDef],
    settings: &Settings,
    timer: &mut T,
    progress: &Progress,
) -> ResultMatrix {
    let mut matrix = ResultMatrix::new(tests.len(), binaries.len());

    for (row, test) in tests.iter().enumerate() {
        for (col, binary) in binaries.iter().enumerate() {
            match measure_cell(test, binary, settings, timer, progress) {
                Ok(secs) => matrix.set(row, col, Some(secs)),
                Err(err) => {
                    debug!(test = %test.name, binary = %binary.name, error = %err, "cell failed");
                    if !settings.suppress_errors {
                        display::print_cell_failure(&err);
                    }
                }
            }
        }
    }

    let missing = matrix.missing_count();
    if missing > 0 {
        info!(
            missing,
            total = tests.len() * binaries.len(),
            "some measurements failed"
        );
    }

    matrix
}

/// Best-of-N for one pair, with any failure wrapped as a `CellFailure`.
pub fn measure_cell<T: Timer + ?Sized>(
    test: &TestDef,
    binary: &BinaryDef,
    settings: &Settings,
    timer: &mut T,
    progress: &Progress,
) -> Result<f64, BenchError> {
    let command = binary.command_for(test);
    sampler::best_of(timer, &command, settings.runs, progress).map_err(|source| {
        BenchError::CellFailure {
            test: test.name.clone(),
            binary: binary.name.clone(),
            source: Box::new(source),
        }
    })
}
