//! Candle — one OHLCV bar of an instrument series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// A rising candle sweeps open → low → high → close; a falling one
    /// sweeps open → high → low → close.
    pub fn is_rising(&self) -> bool {
        self.close >= self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
