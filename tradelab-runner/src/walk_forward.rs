//! Walk-forward composition — stitch independently-optimized equity curves
//! into one continuous out-of-sample track record.
//!
//! For each (optimize-window, trade-window) pair a selector picks and
//! weights candidate curves using only the in-sample range; the trading
//! window then contributes the weight-averaged per-curve deltas, measured
//! against each curve's value just before the window, on top of the
//! cumulative value carried from the previous window. A zero-weight
//! selection holds the curve flat ("no tradable edge").

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selectors::EquitySelector;

// ─── Window indices ──────────────────────────────────────────────────

/// Four indices into the shared time axis: opt_from < opt_to ≤ trade_from
/// < trade_to. Enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkForwardIndices {
    opt_from: usize,
    opt_to: usize,
    trade_from: usize,
    trade_to: usize,
}

impl WalkForwardIndices {
    pub fn new(
        opt_from: usize,
        opt_to: usize,
        trade_from: usize,
        trade_to: usize,
    ) -> Result<Self, WalkForwardError> {
        if opt_from >= opt_to || opt_to > trade_from || trade_from >= trade_to {
            return Err(WalkForwardError::InvalidIndices {
                opt_from,
                opt_to,
                trade_from,
                trade_to,
            });
        }
        Ok(Self {
            opt_from,
            opt_to,
            trade_from,
            trade_to,
        })
    }

    pub fn opt_from(&self) -> usize {
        self.opt_from
    }

    pub fn opt_to(&self) -> usize {
        self.opt_to
    }

    pub fn trade_from(&self) -> usize {
        self.trade_from
    }

    pub fn trade_to(&self) -> usize {
        self.trade_to
    }
}

// ─── Candidate matrix ────────────────────────────────────────────────

/// Candidate equity curves sharing one timestamp axis.
#[derive(Debug, Clone, Default)]
pub struct EquityMatrix {
    timestamps: Vec<NaiveDateTime>,
    ids: Vec<String>,
    curves: Vec<Vec<f64>>,
}

impl EquityMatrix {
    pub fn new(timestamps: Vec<NaiveDateTime>) -> Self {
        Self {
            timestamps,
            ids: Vec::new(),
            curves: Vec::new(),
        }
    }

    /// Add a named candidate curve; its length must match the time axis and
    /// its id must be unused.
    pub fn add_curve(&mut self, id: &str, values: Vec<f64>) -> Result<(), WalkForwardError> {
        if values.len() != self.timestamps.len() {
            return Err(WalkForwardError::CurveLengthMismatch {
                id: id.to_string(),
                expected: self.timestamps.len(),
                got: values.len(),
            });
        }
        if self.ids.iter().any(|existing| existing == id) {
            return Err(WalkForwardError::DuplicateCurveId { id: id.to_string() });
        }
        self.ids.push(id.to_string());
        self.curves.push(values);
        Ok(())
    }

    /// Number of ticks on the shared axis.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn id(&self, curve: usize) -> &str {
        &self.ids[curve]
    }

    pub fn values(&self, curve: usize) -> &[f64] {
        &self.curves[curve]
    }

    pub fn value(&self, curve: usize, tick: usize) -> f64 {
        self.curves[curve][tick]
    }

    /// Curve value just before `tick`, or the raw zero baseline at the very
    /// start of the axis. Net profit over a window [from, to) is
    /// `value(to - 1) - base_value(from)`.
    pub fn base_value(&self, curve: usize, tick: usize) -> f64 {
        if tick == 0 {
            0.0
        } else {
            self.curves[curve][tick - 1]
        }
    }

    /// Load a matrix from `;`-delimited text with a
    /// `Date;Time;<id>;<id>;...` header.
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, WalkForwardError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers().map_err(WalkForwardError::Csv)?.clone();
        if headers.len() < 3 {
            return Err(WalkForwardError::BadMatrixHeader {
                header: headers.iter().collect::<Vec<_>>().join(";"),
            });
        }
        let ids: Vec<String> = headers.iter().skip(2).map(|h| h.to_string()).collect();

        let mut timestamps = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); ids.len()];
        for (row, record) in csv.records().enumerate() {
            let record = record.map_err(WalkForwardError::Csv)?;
            let stamp = format!(
                "{} {}",
                record.get(0).unwrap_or(""),
                record.get(1).unwrap_or("")
            );
            let time = NaiveDateTime::parse_from_str(&stamp, "%d.%m.%Y %H:%M:%S").map_err(
                |_| WalkForwardError::BadMatrixRow {
                    row,
                    value: stamp.clone(),
                },
            )?;
            timestamps.push(time);
            for (i, column) in columns.iter_mut().enumerate() {
                let raw = record.get(i + 2).unwrap_or("");
                let value = raw.parse().map_err(|_| WalkForwardError::BadMatrixRow {
                    row,
                    value: raw.to_string(),
                })?;
                column.push(value);
            }
        }

        let mut matrix = Self::new(timestamps);
        for (id, values) in ids.iter().zip(columns) {
            matrix.add_curve(id, values)?;
        }
        Ok(matrix)
    }
}

// ─── Composition ─────────────────────────────────────────────────────

/// Splice the selected curves' window deltas into one cumulative curve on
/// the matrix's full time axis. Ticks outside every trade window hold the
/// carried value (zero before the first window).
pub fn compose(
    matrix: &EquityMatrix,
    windows: &[WalkForwardIndices],
    selector: &dyn EquitySelector,
) -> Result<Vec<f64>, WalkForwardError> {
    for window in windows {
        if window.trade_to() > matrix.len() {
            return Err(WalkForwardError::WindowOutOfRange {
                trade_to: window.trade_to(),
                len: matrix.len(),
            });
        }
    }

    let mut composed = vec![0.0; matrix.len()];
    let mut cumulative = 0.0;
    let mut cursor = 0;

    for window in windows {
        // Carry the baseline through any gap before this window.
        for slot in composed.iter_mut().take(window.trade_from()).skip(cursor) {
            *slot = cumulative;
        }

        let weights = selector.select(matrix, window.opt_from(), window.opt_to());
        let total: f64 = weights.values().sum();

        if total.abs() < f64::EPSILON {
            // No tradable edge: hold flat through the window.
            for slot in composed
                .iter_mut()
                .take(window.trade_to())
                .skip(window.trade_from())
            {
                *slot = cumulative;
            }
        } else {
            let baseline = cumulative;
            for tick in window.trade_from()..window.trade_to() {
                let mut delta = 0.0;
                for (&curve, &weight) in &weights {
                    let reference = matrix.base_value(curve, window.trade_from());
                    delta += weight * (matrix.value(curve, tick) - reference);
                }
                composed[tick] = baseline + delta / total;
            }
            cumulative = composed[window.trade_to() - 1];
        }
        cursor = window.trade_to();
    }

    // Carry the final value to the end of the axis.
    for slot in composed.iter_mut().skip(cursor) {
        *slot = cumulative;
    }
    Ok(composed)
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error(
        "invalid window indices: require opt_from < opt_to <= trade_from < trade_to \
         (got {opt_from}, {opt_to}, {trade_from}, {trade_to})"
    )]
    InvalidIndices {
        opt_from: usize,
        opt_to: usize,
        trade_from: usize,
        trade_to: usize,
    },
    #[error("curve '{id}' has {got} points but the time axis has {expected}")]
    CurveLengthMismatch {
        id: String,
        expected: usize,
        got: usize,
    },
    #[error("duplicate curve id '{id}'")]
    DuplicateCurveId { id: String },
    #[error("trade window end {trade_to} exceeds axis length {len}")]
    WindowOutOfRange { trade_to: usize, len: usize },
    #[error("equity matrix header must be 'Date;Time;<id>...' (got '{header}')")]
    BadMatrixHeader { header: String },
    #[error("equity matrix row {row}: unparseable value '{value}'")]
    BadMatrixRow { row: usize, value: String },
    #[error(transparent)]
    Csv(csv::Error),
}
