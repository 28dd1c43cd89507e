//! Top-K curves by in-sample net profit.

use std::collections::BTreeMap;

use super::{net_profit, top_k_positive, EquitySelector};
use crate::walk_forward::EquityMatrix;

#[derive(Debug, Clone, Copy)]
pub struct TopNetProfit {
    pub top: usize,
}

impl EquitySelector for TopNetProfit {
    fn select(&self, matrix: &EquityMatrix, from: usize, to: usize) -> BTreeMap<usize, f64> {
        let scored = (0..matrix.curve_count())
            .map(|curve| (curve, net_profit(matrix, curve, from, to)))
            .collect();
        top_k_positive(scored, self.top)
    }

    fn name(&self) -> &str {
        "net-profit"
    }
}
