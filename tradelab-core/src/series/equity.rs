//! Equity-and-capital-used series — one point per synchronized tick.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Append-only (equity, capital-used) series, reset at run start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityCurve {
    times: Vec<NaiveDateTime>,
    equity: Vec<f64>,
    capital_used: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub time: NaiveDateTime,
    pub equity: f64,
    pub capital_used: f64,
}

impl EquityCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.times.clear();
        self.equity.clear();
        self.capital_used.clear();
    }

    pub fn push(&mut self, time: NaiveDateTime, equity: f64, capital_used: f64) {
        self.times.push(time);
        self.equity.push(equity);
        self.capital_used.push(capital_used);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    pub fn equity(&self) -> &[f64] {
        &self.equity
    }

    pub fn capital_used(&self) -> &[f64] {
        &self.capital_used
    }

    pub fn get(&self, index: usize) -> EquityPoint {
        EquityPoint {
            time: self.times[index],
            equity: self.equity[index],
            capital_used: self.capital_used[index],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = EquityPoint> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    pub fn last(&self) -> Option<EquityPoint> {
        if self.is_empty() {
            None
        } else {
            Some(self.get(self.len() - 1))
        }
    }
}
