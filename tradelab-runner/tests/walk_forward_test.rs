//! Walk-forward composition integration tests.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use tradelab_runner::selectors::{EquitySelector, TopNetProfit};
use tradelab_runner::walk_forward::{compose, EquityMatrix, WalkForwardIndices};

fn axis(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(18, 45, 0)
        .unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

/// Selector stub with a fixed answer per call, in call order.
struct Scripted {
    answers: std::sync::Mutex<Vec<BTreeMap<usize, f64>>>,
}

impl Scripted {
    fn new(mut answers: Vec<BTreeMap<usize, f64>>) -> Self {
        answers.reverse();
        Self {
            answers: std::sync::Mutex::new(answers),
        }
    }
}

impl EquitySelector for Scripted {
    fn select(&self, _matrix: &EquityMatrix, _from: usize, _to: usize) -> BTreeMap<usize, f64> {
        self.answers.lock().unwrap().pop().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn weights(pairs: &[(usize, f64)]) -> BTreeMap<usize, f64> {
    pairs.iter().copied().collect()
}

#[test]
fn continuity_across_windows_with_changing_selection() {
    // Curve 0 climbs 1/tick, curve 1 climbs 3/tick.
    let n = 12;
    let mut matrix = EquityMatrix::new(axis(n));
    matrix
        .add_curve("slow", (0..n).map(|i| i as f64).collect())
        .unwrap();
    matrix
        .add_curve("fast", (0..n).map(|i| 3.0 * i as f64).collect())
        .unwrap();

    let windows = vec![
        WalkForwardIndices::new(0, 4, 4, 8).unwrap(),
        WalkForwardIndices::new(4, 8, 8, 12).unwrap(),
    ];
    let selector = Scripted::new(vec![weights(&[(0, 1.0)]), weights(&[(1, 1.0)])]);

    let composed = compose(&matrix, &windows, &selector).unwrap();

    // Window 1 trades curve 0: deltas vs its value at tick 3.
    assert_eq!(composed[4], 1.0);
    assert_eq!(composed[7], 4.0);
    // Window 2 switches to curve 1; its first delta (3) lands on the carried
    // baseline (4) with no discontinuity.
    assert_eq!(composed[8], 4.0 + 3.0);
    assert_eq!(composed[11], 4.0 + 12.0);
}

#[test]
fn zero_weight_window_stays_flat() {
    let n = 9;
    let mut matrix = EquityMatrix::new(axis(n));
    matrix
        .add_curve("only", (0..n).map(|i| 2.0 * i as f64).collect())
        .unwrap();

    let windows = vec![
        WalkForwardIndices::new(0, 3, 3, 6).unwrap(),
        WalkForwardIndices::new(3, 6, 6, 9).unwrap(),
    ];
    // Edge in window 1, nothing in window 2.
    let selector = Scripted::new(vec![weights(&[(0, 1.0)]), weights(&[])]);

    let composed = compose(&matrix, &windows, &selector).unwrap();
    let end_of_first = composed[5];
    assert!(end_of_first > 0.0);
    assert_eq!(&composed[6..9], &[end_of_first; 3]);
}

#[test]
fn weights_average_the_deltas() {
    let n = 6;
    let mut matrix = EquityMatrix::new(axis(n));
    matrix
        .add_curve("a", (0..n).map(|i| i as f64).collect())
        .unwrap();
    matrix
        .add_curve("b", (0..n).map(|i| 5.0 * i as f64).collect())
        .unwrap();

    let windows = vec![WalkForwardIndices::new(0, 3, 3, 6).unwrap()];
    // Triple weight on the slow curve.
    let selector = Scripted::new(vec![weights(&[(0, 3.0), (1, 1.0)])]);

    let composed = compose(&matrix, &windows, &selector).unwrap();
    // Tick 3 deltas vs tick 2: a = 1, b = 5 → (3*1 + 1*5) / 4 = 2.
    assert!((composed[3] - 2.0).abs() < 1e-12);
    assert!((composed[5] - 6.0).abs() < 1e-12);
}

#[test]
fn first_window_at_axis_start_uses_raw_values() {
    let n = 6;
    let mut matrix = EquityMatrix::new(axis(n));
    matrix
        .add_curve("a", vec![10.0, 12.0, 14.0, 16.0, 18.0, 20.0])
        .unwrap();

    // trade_from = 0 is unreachable through WalkForwardIndices (opt must
    // precede it), so exercise the raw-value convention through a selector
    // windowed at the axis start instead.
    let selected = TopNetProfit { top: 1 }.select(&matrix, 0, 3);
    // Net profit counts the raw first value: 14 - 0, not 14 - 10.
    assert_eq!(selected.len(), 1);

    let windows = vec![WalkForwardIndices::new(0, 2, 2, 6).unwrap()];
    let selector = Scripted::new(vec![weights(&[(0, 1.0)])]);
    let composed = compose(&matrix, &windows, &selector).unwrap();
    // Deltas vs value at tick 1 (12): 2, 4, 6, 8.
    assert_eq!(&composed[2..6], &[2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn real_selector_end_to_end() {
    let n = 16;
    let mut matrix = EquityMatrix::new(axis(n));
    matrix
        .add_curve("winner", (0..n).map(|i| 2.0 * i as f64).collect())
        .unwrap();
    matrix
        .add_curve("loser", (0..n).map(|i| -(i as f64)).collect())
        .unwrap();

    let windows = vec![
        WalkForwardIndices::new(0, 8, 8, 12).unwrap(),
        WalkForwardIndices::new(4, 12, 12, 16).unwrap(),
    ];
    let selector = TopNetProfit { top: 1 };
    let composed = compose(&matrix, &windows, &selector).unwrap();

    // The winner is selected in both windows; the spliced curve follows its
    // deltas continuously from tick 8 on.
    assert_eq!(composed[8], 2.0);
    assert_eq!(composed[15], 2.0 * 15.0 - 2.0 * 7.0);
}
