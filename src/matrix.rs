use tracing::warn;

use crate::types::Mode;

/// Durations indexed by (test, binary). `None` marks a cell whose
/// measurement failed, which is not the same thing as a zero duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f64>>,
}

impl ResultMatrix {
    /// All cells start out missing.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn from_rows(rows: Vec<Vec<Option<f64>>>) -> Self {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "all rows must have the same length"
        );
        let n = rows.len();
        Self {
            rows: n,
            cols,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<f64>) {
        let i = self.index(row, col);
        self.cells[i] = value;
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        assert!(row < self.rows, "row {row} out of bounds ({})", self.rows);
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Rewrite every cell according to `mode`, row by row, using each row's
    /// first column as the baseline. Missing cells count as `0`; ratios that
    /// come out non-finite are clamped to `0`.
    pub fn apply(&mut self, mode: Mode) {
        let cols = self.cols;
        if cols == 0 {
            return;
        }
        for (r, row) in self.cells.chunks_mut(cols).enumerate() {
            let baseline = row[0].unwrap_or(0.0);
            let mut clamped = 0;
            for cell in row.iter_mut() {
                let value = cell.unwrap_or(0.0);
                let out = match mode {
                    Mode::Raw => value,
                    Mode::Speedup => baseline / value,
                    Mode::Normalize => value / baseline,
                };
                *cell = Some(if out.is_finite() {
                    out
                } else {
                    clamped += 1;
                    0.0
                });
            }
            if clamped > 0 {
                warn!(
                    row = r,
                    clamped,
                    ?mode,
                    "ratio against a zero or missing value, writing 0"
                );
            }
        }
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) out of bounds ({}x{})",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}
