//! Run summary — aggregate statistics derived from the final ledger state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::ledger::TradeLedger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub net_profit: f64,
    pub net_profit_pct: f64,
    pub max_drawdown_pct: f64,
    /// Gross profit over |gross loss| of closed trades. Infinite when there
    /// are winners and no losers.
    pub profit_factor: f64,
    /// Mean of per-trade profit as a percentage of the trade's entry value.
    pub avg_trade_profit_pct: f64,
    pub trades: usize,
    pub long_trades: usize,
    pub short_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub turnover: f64,
    pub total_commission: f64,
}

impl Summary {
    pub fn from_ledger(ledger: &TradeLedger, initial_capital: f64, max_drawdown_pct: f64) -> Self {
        let net_profit = ledger.equity();
        let net_profit_pct = if initial_capital > 0.0 {
            net_profit / initial_capital * 100.0
        } else {
            0.0
        };

        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        for trade in ledger.done_trades() {
            let p = trade.profit();
            if p >= 0.0 {
                gross_profit += p;
            } else {
                gross_loss += p;
            }
        }
        let profit_factor = if gross_loss < 0.0 {
            gross_profit / gross_loss.abs()
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let mut trades = 0;
        let mut long_trades = 0;
        let mut short_trades = 0;
        let mut winning_trades = 0;
        let mut losing_trades = 0;
        let mut profit_pct_sum = 0.0;
        for trade in ledger.all_trades() {
            trades += 1;
            if trade.is_long() {
                long_trades += 1;
            } else {
                short_trades += 1;
            }
            if trade.profit() > 0.0 {
                winning_trades += 1;
            } else {
                losing_trades += 1;
            }
            profit_pct_sum += trade.profit_pct();
        }
        let avg_trade_profit_pct = if trades > 0 {
            profit_pct_sum / trades as f64
        } else {
            0.0
        };

        Self {
            net_profit,
            net_profit_pct,
            max_drawdown_pct,
            profit_factor,
            avg_trade_profit_pct,
            trades,
            long_trades,
            short_trades,
            winning_trades,
            losing_trades,
            turnover: ledger.turnover(),
            total_commission: ledger.total_commission(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Net profit:        {:>12.2} ({:.2}%)", self.net_profit, self.net_profit_pct)?;
        writeln!(f, "Max drawdown:      {:>11.2}%", self.max_drawdown_pct)?;
        writeln!(f, "Profit factor:     {:>12.2}", self.profit_factor)?;
        writeln!(f, "Avg trade profit:  {:>11.2}%", self.avg_trade_profit_pct)?;
        writeln!(
            f,
            "Trades:            {:>12} (long {}, short {}, won {}, lost {})",
            self.trades, self.long_trades, self.short_trades, self.winning_trades, self.losing_trades
        )?;
        writeln!(f, "Turnover:          {:>12.2}", self.turnover)?;
        write!(f, "Commission:        {:>12.2}", self.total_commission)
    }
}
