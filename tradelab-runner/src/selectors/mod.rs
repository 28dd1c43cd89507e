//! Equity selector strategies — pick and weight candidate curves from the
//! in-sample window.
//!
//! Every selector is a stateless pure function over (matrix, from, to).
//! Returned weights need not sum to one; the composer normalizes. An empty
//! map means "no tradable edge" and yields a flat trading window.

use std::collections::BTreeMap;

use crate::walk_forward::EquityMatrix;

mod best_triple;
mod drawdown_ratio;
mod net_profit;
mod trend_slope;

pub use best_triple::BestTriple;
pub use drawdown_ratio::TopProfitDrawdown;
pub use net_profit::TopNetProfit;
pub use trend_slope::TopTrendSlope;

/// Selection over the half-open in-sample index window [from, to).
pub trait EquitySelector: Send + Sync {
    /// Curve index → weight. Empty (or all-zero) means no edge.
    fn select(&self, matrix: &EquityMatrix, from: usize, to: usize) -> BTreeMap<usize, f64>;

    fn name(&self) -> &str;
}

/// Build a selector by its CLI/config name.
pub fn by_name(name: &str, top: usize) -> Option<Box<dyn EquitySelector>> {
    match name {
        "net-profit" => Some(Box::new(TopNetProfit { top })),
        "profit-drawdown" => Some(Box::new(TopProfitDrawdown { top })),
        "trend-slope" => Some(Box::new(TopTrendSlope { top })),
        "best-triple" => Some(Box::new(BestTriple)),
        _ => None,
    }
}

// ─── Shared window statistics ────────────────────────────────────────

/// Net profit of a curve over [from, to): last value minus the value just
/// before the window (raw value at the axis start).
pub(crate) fn net_profit(matrix: &EquityMatrix, curve: usize, from: usize, to: usize) -> f64 {
    matrix.value(curve, to - 1) - matrix.base_value(curve, from)
}

/// Largest peak-to-trough decline within [from, to), as a positive number.
pub(crate) fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        } else if peak - v > worst {
            worst = peak - v;
        }
    }
    worst
}

/// Normalized linear-trend score: least-squares slope × window length ÷
/// mean absolute residual. A steep, clean ramp scores high; a noisy or flat
/// window scores near zero. A perfectly straight rising line has no
/// residual and scores infinite.
pub(crate) fn trend_score(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx == 0.0 {
        return 0.0;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let residual_sum: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &y)| (y - (slope * i as f64 + intercept)).abs())
        .sum();
    let mean_residual = residual_sum / nf;

    if mean_residual == 0.0 {
        return if slope > 0.0 {
            f64::INFINITY
        } else if slope < 0.0 {
            f64::NEG_INFINITY
        } else {
            0.0
        };
    }
    slope * nf / mean_residual
}

/// Keep the top `k` of (curve, score) with positive scores, weight 1.0 each.
/// Stable: equal scores prefer the lower curve index.
pub(crate) fn top_k_positive(mut scored: Vec<(usize, f64)>, k: usize) -> BTreeMap<usize, f64> {
    scored.retain(|&(_, score)| score > 0.0);
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    scored
        .into_iter()
        .take(k)
        .map(|(curve, _)| (curve, 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_drawdown_of_monotonic_rise_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn max_drawdown_measures_peak_to_trough() {
        assert_eq!(max_drawdown(&[0.0, 10.0, 4.0, 8.0, 2.0]), 8.0);
    }

    #[test]
    fn trend_score_positive_for_clean_ramp_with_noise() {
        let values: Vec<f64> = (0..20)
            .map(|i| i as f64 + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        assert!(trend_score(&values) > 0.0);
    }

    #[test]
    fn trend_score_infinite_for_perfect_line() {
        let values: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();
        assert!(trend_score(&values).is_infinite());
    }

    #[test]
    fn trend_score_zero_for_flat_window() {
        assert_eq!(trend_score(&[5.0; 10]), 0.0);
    }

    #[test]
    fn top_k_drops_nonpositive_and_orders_by_score() {
        let selected = top_k_positive(vec![(0, -1.0), (1, 3.0), (2, 5.0), (3, 1.0)], 2);
        let curves: Vec<usize> = selected.keys().copied().collect();
        assert_eq!(curves, vec![1, 2]);
    }
}
