//! Top-K curves by in-sample net profit over max intra-window drawdown.

use std::collections::BTreeMap;

use super::{max_drawdown, net_profit, top_k_positive, EquitySelector};
use crate::walk_forward::EquityMatrix;

#[derive(Debug, Clone, Copy)]
pub struct TopProfitDrawdown {
    pub top: usize,
}

impl EquitySelector for TopProfitDrawdown {
    fn select(&self, matrix: &EquityMatrix, from: usize, to: usize) -> BTreeMap<usize, f64> {
        let scored = (0..matrix.curve_count())
            .map(|curve| {
                let profit = net_profit(matrix, curve, from, to);
                let drawdown = max_drawdown(&matrix.values(curve)[from..to]);
                let score = if drawdown > 0.0 {
                    profit / drawdown
                } else if profit > 0.0 {
                    // Profitable without ever giving anything back.
                    f64::INFINITY
                } else {
                    0.0
                };
                (curve, score)
            })
            .collect();
        top_k_positive(scored, self.top)
    }

    fn name(&self) -> &str {
        "profit-drawdown"
    }
}
