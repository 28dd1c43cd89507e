//! Top-K curves by normalized linear-trend slope.

use std::collections::BTreeMap;

use super::{top_k_positive, trend_score, EquitySelector};
use crate::walk_forward::EquityMatrix;

#[derive(Debug, Clone, Copy)]
pub struct TopTrendSlope {
    pub top: usize,
}

impl EquitySelector for TopTrendSlope {
    fn select(&self, matrix: &EquityMatrix, from: usize, to: usize) -> BTreeMap<usize, f64> {
        let scored = (0..matrix.curve_count())
            .map(|curve| (curve, trend_score(&matrix.values(curve)[from..to])))
            .collect();
        top_k_positive(scored, self.top)
    }

    fn name(&self) -> &str {
        "trend-slope"
    }
}
