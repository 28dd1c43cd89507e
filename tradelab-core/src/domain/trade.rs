//! Trade — a FIFO net lot of one instrument, from open to flat.
//!
//! Accounting convention: `scale_in_*` accumulates fills in the trade's own
//! direction (signed — negative for shorts), `scale_out_*` accumulates the
//! reducing fills with the same sign, so that
//! `volume = scale_in_volume - scale_out_volume` and
//! `profit = scale_out_value + volume * price - scale_in_value - commission`
//! hold uniformly for longs and shorts.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Volumes within this tolerance of zero are treated as flat.
pub const VOLUME_EPS: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub security: String,
    pub entry_time: NaiveDateTime,
    /// Price of the very first fill.
    pub entry_price: f64,
    /// Signed volume accumulated while growing in the trade's direction.
    pub scale_in_volume: f64,
    /// Money committed while growing: Σ Δvolume · price (signed).
    pub scale_in_value: f64,
    /// Signed volume accumulated while reducing (same sign as scale-in).
    pub scale_out_volume: f64,
    /// Money committed while reducing: Σ −Δvolume · price (signed).
    pub scale_out_value: f64,
    /// Total commission charged to this trade.
    pub commission: f64,
    /// Bars observed since entry.
    pub bars_held: usize,
    pub last_price: f64,
    pub last_time: NaiveDateTime,
}

impl Trade {
    /// Open a new trade from its entry fill.
    pub fn open(
        time: NaiveDateTime,
        security: &str,
        volume: f64,
        price: f64,
        commission: f64,
    ) -> Self {
        Self {
            security: security.to_string(),
            entry_time: time,
            entry_price: price,
            scale_in_volume: volume,
            scale_in_value: volume * price,
            scale_out_volume: 0.0,
            scale_out_value: 0.0,
            commission,
            bars_held: 0,
            last_price: price,
            last_time: time,
        }
    }

    /// Current signed open volume.
    pub fn volume(&self) -> f64 {
        self.scale_in_volume - self.scale_out_volume
    }

    pub fn is_done(&self) -> bool {
        self.volume().abs() <= VOLUME_EPS
    }

    pub fn is_long(&self) -> bool {
        self.scale_in_volume > VOLUME_EPS
    }

    pub fn is_short(&self) -> bool {
        self.scale_in_volume < -VOLUME_EPS
    }

    /// Volume-weighted average entry price. Always positive.
    pub fn avg_entry_price(&self) -> f64 {
        if self.scale_in_volume.abs() <= VOLUME_EPS {
            return self.entry_price;
        }
        self.scale_in_value / self.scale_in_volume
    }

    /// Money committed while growing the position, absolute.
    pub fn entry_value(&self) -> f64 {
        self.scale_in_value.abs()
    }

    /// Capital currently tied up: open volume at average entry price.
    pub fn capital_used(&self) -> f64 {
        self.avg_entry_price() * self.volume().abs()
    }

    /// Mark-to-market profit with the open remainder valued at `price`.
    pub fn profit_at(&self, price: f64) -> f64 {
        self.scale_out_value + self.volume() * price - self.scale_in_value - self.commission
    }

    /// Profit at the last known price (realized profit once the trade is done).
    pub fn profit(&self) -> f64 {
        self.profit_at(self.last_price)
    }

    /// Profit as a percentage of the money committed at entry.
    pub fn profit_pct(&self) -> f64 {
        let value = self.entry_value();
        if value <= 0.0 {
            return 0.0;
        }
        self.profit() / value * 100.0
    }

    /// Apply a fill to this trade: grow when `volume` points in the trade's
    /// direction, reduce otherwise. The caller (ledger) splits fills that
    /// would overshoot through zero before calling this.
    pub fn update(
        &mut self,
        time: NaiveDateTime,
        volume: f64,
        price: f64,
        commission: f64,
    ) -> Result<(), TradeError> {
        if self.is_done() {
            return Err(TradeError::AlreadyClosed {
                security: self.security.clone(),
            });
        }
        if volume.abs() <= VOLUME_EPS {
            return Err(TradeError::ZeroVolumeUpdate {
                security: self.security.clone(),
            });
        }
        if volume * self.scale_in_volume > 0.0 {
            self.scale_in_volume += volume;
            self.scale_in_value += volume * price;
        } else {
            self.scale_out_volume += -volume;
            self.scale_out_value += -volume * price;
        }
        self.commission += commission;
        self.last_price = price;
        self.last_time = time;
        Ok(())
    }

    /// Refresh the mark and count one more bar held.
    pub fn mark(&mut self, time: NaiveDateTime, price: f64) {
        self.last_price = price;
        self.last_time = time;
        self.bars_held += 1;
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("trade in {security} is already closed")]
    AlreadyClosed { security: String },
    #[error("zero-volume update on trade in {security}")]
    ZeroVolumeUpdate { security: String },
}
