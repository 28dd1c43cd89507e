//! Backtest orchestrator — synchronized replay of an order tape against
//! candle series.
//!
//! Per global tick: due orders are applied to the ledger first (executions
//! are priced against the prior bar, consistent with how the tape was
//! generated), then each updated instrument's close refreshes its open
//! trade's mark, then one (equity, capital-used) point is appended and the
//! drawdown tracker runs. Buffers are exclusively owned by one tester per
//! run; independent runs use independent testers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::batch::{BatchError, OrderBatch};
use crate::engine::ledger::{LedgerError, TradeLedger};
use crate::engine::summary::Summary;
use crate::series::{CandleSeries, EquityCurve, SyncError, Synchronizer};

/// Reference capital model for drawdown percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawdownMode {
    /// Decline measured against the fixed initial capital.
    FixedCapital,
    /// Decline measured against peak equity plus initial capital.
    Reinvestment,
}

impl Default for DrawdownMode {
    fn default() -> Self {
        Self::FixedCapital
    }
}

pub struct Tester {
    series: Vec<CandleSeries>,
    orders: OrderBatch,
    initial_capital: f64,
    drawdown_mode: DrawdownMode,
    ledger: TradeLedger,
    equity: EquityCurve,
    max_drawdown_pct: f64,
}

impl Tester {
    pub fn new(initial_capital: f64, drawdown_mode: DrawdownMode) -> Result<Self, TesterError> {
        if initial_capital <= 0.0 {
            return Err(TesterError::InvalidCapital {
                capital: initial_capital,
            });
        }
        Ok(Self {
            series: Vec::new(),
            orders: OrderBatch::empty(),
            initial_capital,
            drawdown_mode,
            ledger: TradeLedger::new(),
            equity: EquityCurve::new(),
            max_drawdown_pct: 0.0,
        })
    }

    /// Register a candle series. One series per security.
    pub fn add_series(&mut self, series: CandleSeries) -> Result<(), TesterError> {
        if self
            .series
            .iter()
            .any(|s| s.security() == series.security())
        {
            return Err(TesterError::DuplicateSeries {
                security: series.security().to_string(),
            });
        }
        self.series.push(series);
        Ok(())
    }

    /// Queue an order batch, merged timestamp-stably into any already queued.
    pub fn add_orders(&mut self, batch: OrderBatch) -> Result<(), BatchError> {
        let queued = std::mem::take(&mut self.orders);
        self.orders = queued.merge(batch)?;
        Ok(())
    }

    /// Replay the full tape. Resets all accumulators first, so a tester can
    /// be re-run from scratch.
    pub fn run(&mut self) -> Result<Summary, TesterError> {
        self.ledger.clear();
        self.equity.clear();
        self.max_drawdown_pct = 0.0;

        let axes: Vec<&[chrono::NaiveDateTime]> =
            self.series.iter().map(|s| s.timestamps()).collect();
        let mut sync = Synchronizer::new(axes)?;

        let rows = self.orders.rows();
        let mut next_row = 0;
        let mut max_equity = f64::NEG_INFINITY;

        while let Some(tick) = sync.advance() {
            // (a) Executions decided on the prior bar come first.
            while next_row < rows.len() && rows[next_row].time <= tick {
                self.ledger.apply_fill(&rows[next_row])?;
                next_row += 1;
            }

            // (b) Refresh marks for instruments that updated this tick.
            for (axis, series) in self.series.iter().enumerate() {
                if !sync.updated(axis) {
                    continue;
                }
                if let Some(index) = sync.last_index(axis) {
                    self.ledger
                        .mark(series.security(), tick, series.close(index));
                }
            }

            let equity = self.ledger.equity();
            let capital_used = self.ledger.capital_used();
            self.equity.push(tick, equity, capital_used);

            // (c) Drawdown against the running peak.
            if equity > max_equity {
                max_equity = equity;
            } else if equity < max_equity {
                let drawdown = match self.drawdown_mode {
                    DrawdownMode::FixedCapital => {
                        (equity - max_equity) / self.initial_capital * 100.0
                    }
                    DrawdownMode::Reinvestment => {
                        (equity - max_equity) / (max_equity + self.initial_capital) * 100.0
                    }
                };
                if drawdown < self.max_drawdown_pct {
                    self.max_drawdown_pct = drawdown;
                }
            }
        }

        Ok(self.summary())
    }

    pub fn summary(&self) -> Summary {
        Summary::from_ledger(&self.ledger, self.initial_capital, self.max_drawdown_pct)
    }

    pub fn equity_curve(&self) -> &EquityCurve {
        &self.equity
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn max_drawdown_pct(&self) -> f64 {
        self.max_drawdown_pct
    }
}

#[derive(Debug, Error)]
pub enum TesterError {
    #[error("initial capital must be positive (got {capital})")]
    InvalidCapital { capital: f64 },
    #[error("a series for {security} is already registered")]
    DuplicateSeries { security: String },
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
