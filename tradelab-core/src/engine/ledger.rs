//! Trade ledger — turns a stream of fills into a lifecycle of FIFO trades.
//!
//! At most one active trade per security (net model, not independent lots):
//! a fill either opens a trade, extends it, reduces/closes it, or — when it
//! overshoots through zero — closes it and opens a new trade in the opposite
//! direction with the commission apportioned by the fill's volume fractions.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::{Fill, Trade, TradeError, VOLUME_EPS};

#[derive(Debug, Default)]
pub struct TradeLedger {
    active: HashMap<String, Trade>,
    done: Vec<Trade>,
    done_profit: f64,
    turnover: f64,
    total_commission: f64,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.done.clear();
        self.done_profit = 0.0;
        self.turnover = 0.0;
        self.total_commission = 0.0;
    }

    /// Apply one executed fill. See module docs for the four outcomes.
    pub fn apply_fill(&mut self, fill: &Fill) -> Result<(), LedgerError> {
        if fill.volume.abs() <= VOLUME_EPS {
            return Err(LedgerError::ZeroVolumeFill {
                security: fill.security.clone(),
                time: fill.time,
            });
        }
        self.turnover += fill.value();
        self.total_commission += fill.commission;

        let Some(trade) = self.active.get_mut(&fill.security) else {
            self.active.insert(
                fill.security.clone(),
                Trade::open(
                    fill.time,
                    &fill.security,
                    fill.volume,
                    fill.price,
                    fill.commission,
                ),
            );
            return Ok(());
        };

        let open_volume = trade.volume();
        let extends = open_volume * fill.volume > 0.0;
        let overshoots = !extends && fill.volume.abs() > open_volume.abs() + VOLUME_EPS;

        if !overshoots {
            trade.update(fill.time, fill.volume, fill.price, fill.commission)?;
            if trade.is_done() {
                self.retire(&fill.security);
            }
            return Ok(());
        }

        // Direction flip: the closing portion carries |old|/|fill| of the
        // commission, the reopened remainder the complementary fraction.
        let close_fraction = open_volume.abs() / fill.volume.abs();
        let reopen_volume = fill.volume + open_volume;
        let reopen_fraction = reopen_volume.abs() / fill.volume.abs();

        trade.update(
            fill.time,
            -open_volume,
            fill.price,
            fill.commission * close_fraction,
        )?;
        self.retire(&fill.security);
        self.active.insert(
            fill.security.clone(),
            Trade::open(
                fill.time,
                &fill.security,
                reopen_volume,
                fill.price,
                fill.commission * reopen_fraction,
            ),
        );
        Ok(())
    }

    /// Refresh the active trade's mark for `security` and count the bar.
    pub fn mark(&mut self, security: &str, time: NaiveDateTime, price: f64) {
        if let Some(trade) = self.active.get_mut(security) {
            trade.mark(time, price);
        }
    }

    /// Aggregate equity: realized profit of closed trades plus mark-to-market
    /// of every open trade at its last known price.
    pub fn equity(&self) -> f64 {
        self.done_profit + self.active.values().map(Trade::profit).sum::<f64>()
    }

    /// Capital tied up across all open trades.
    pub fn capital_used(&self) -> f64 {
        self.active.values().map(Trade::capital_used).sum()
    }

    pub fn active_trade(&self, security: &str) -> Option<&Trade> {
        self.active.get(security)
    }

    pub fn active_trades(&self) -> impl Iterator<Item = &Trade> {
        self.active.values()
    }

    pub fn done_trades(&self) -> &[Trade] {
        &self.done
    }

    /// Closed trades first (in closing order), then the open ones.
    pub fn all_trades(&self) -> impl Iterator<Item = &Trade> {
        self.done.iter().chain(self.active.values())
    }

    pub fn done_profit(&self) -> f64 {
        self.done_profit
    }

    pub fn turnover(&self) -> f64 {
        self.turnover
    }

    pub fn total_commission(&self) -> f64 {
        self.total_commission
    }

    fn retire(&mut self, security: &str) {
        if let Some(trade) = self.active.remove(security) {
            self.done_profit += trade.profit();
            self.done.push(trade);
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("zero-volume fill for {security} at {time}")]
    ZeroVolumeFill {
        security: String,
        time: NaiveDateTime,
    },
    #[error(transparent)]
    Trade(#[from] TradeError),
}
