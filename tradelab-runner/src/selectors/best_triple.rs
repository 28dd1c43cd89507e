//! Exhaustive best-triple selection.
//!
//! Scans every C(N,3) combination of candidate curves, sums the three
//! pointwise over the in-sample window, and scores the sum with the same
//! normalized trend-slope metric as `TopTrendSlope`. O(N³), but N is the
//! number of optimization candidates and expected small; the scan runs on
//! the rayon pool with a deterministic reduction (ties prefer the
//! lexicographically smallest triple).

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::{trend_score, EquitySelector};
use crate::walk_forward::EquityMatrix;

#[derive(Debug, Clone, Copy)]
pub struct BestTriple;

impl EquitySelector for BestTriple {
    fn select(&self, matrix: &EquityMatrix, from: usize, to: usize) -> BTreeMap<usize, f64> {
        let n = matrix.curve_count();
        if n < 3 {
            return BTreeMap::new();
        }

        let triples: Vec<[usize; 3]> = (0..n)
            .flat_map(|a| {
                (a + 1..n).flat_map(move |b| (b + 1..n).map(move |c| [a, b, c]))
            })
            .collect();

        let best = triples
            .par_iter()
            .map(|&triple| {
                let summed: Vec<f64> = (from..to)
                    .map(|tick| triple.iter().map(|&curve| matrix.value(curve, tick)).sum())
                    .collect();
                (triple, trend_score(&summed))
            })
            .reduce(
                || ([usize::MAX; 3], f64::NEG_INFINITY),
                |left, right| {
                    if right.1 > left.1 || (right.1 == left.1 && right.0 < left.0) {
                        right
                    } else {
                        left
                    }
                },
            );

        if best.1 <= 0.0 {
            return BTreeMap::new();
        }
        best.0.iter().map(|&curve| (curve, 1.0)).collect()
    }

    fn name(&self) -> &str {
        "best-triple"
    }
}
