//! Order crossing engine — one `Position` per instrument.
//!
//! `on_candle` walks the intrabar path open → (low, high) for a rising
//! candle, open → (high, low) for a falling one, then close. Every price
//! move tests the active orders:
//! - limits cross when the price lies strictly between the previous and new
//!   simulated price, widened by half a price step;
//! - stops fire when the new price reaches or passes the trigger, filling at
//!   the trigger — except on the gap move (the first move of the candle, to
//!   the open), which fills at the actual gapped price;
//! - take-stop pairs test the protective stop side first, then the take
//!   side; one trigger cancels the pair.
//!
//! Fired orders are removed from the active set, applied to the ledger as
//! fills, and returned in firing order. The gap flag is true only for the
//! open move, even when the open coincides with the candle extreme.

use chrono::NaiveDateTime;

use crate::domain::{Candle, Fill, Order, OrderError, OrderId, OrderKind};
use crate::engine::commission::CommissionPolicy;
use crate::engine::ledger::{LedgerError, TradeLedger};
use crate::series::EquityCurve;

pub struct Position {
    security: String,
    price: f64,
    price_step: f64,
    size: f64,
    orders: Vec<Order>,
    next_id: u64,
    commission: Box<dyn CommissionPolicy>,
    equity: Option<EquityCurve>,
}

impl Position {
    pub fn new(
        security: &str,
        initial_price: f64,
        price_step: f64,
        commission: Box<dyn CommissionPolicy>,
    ) -> Self {
        Self {
            security: security.to_string(),
            price: initial_price,
            price_step,
            size: 0.0,
            orders: Vec::new(),
            next_id: 1,
            commission,
            equity: None,
        }
    }

    /// Attach an equity sub-series, refreshed against every candle close.
    pub fn track_equity(mut self) -> Self {
        self.equity = Some(EquityCurve::new());
        self
    }

    pub fn security(&self) -> &str {
        &self.security
    }

    /// Current simulated price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Current signed position size.
    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn equity(&self) -> Option<&EquityCurve> {
        self.equity.as_ref()
    }

    pub fn submit_limit(
        &mut self,
        volume: f64,
        price: f64,
        comment: &str,
    ) -> Result<OrderId, OrderError> {
        self.submit(OrderKind::Limit { price }, volume, comment)
    }

    pub fn submit_stop(
        &mut self,
        volume: f64,
        trigger: f64,
        comment: &str,
    ) -> Result<OrderId, OrderError> {
        self.submit(OrderKind::Stop { trigger }, volume, comment)
    }

    pub fn submit_take_stop(
        &mut self,
        volume: f64,
        take: f64,
        stop: f64,
        comment: &str,
    ) -> Result<OrderId, OrderError> {
        self.submit(OrderKind::TakeStop { take, stop }, volume, comment)
    }

    fn submit(
        &mut self,
        kind: OrderKind,
        volume: f64,
        comment: &str,
    ) -> Result<OrderId, OrderError> {
        let order = Order {
            id: OrderId(self.next_id),
            kind,
            volume,
            comment: comment.to_string(),
        };
        order.validate_against(self.price)?;
        self.next_id += 1;
        let id = order.id;
        self.orders.push(order);
        Ok(id)
    }

    /// Cancel an active order. Returns whether it was found.
    pub fn cancel(&mut self, id: OrderId) -> bool {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != id);
        self.orders.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.orders.clear();
    }

    /// Simulate one candle's price path, applying fired orders to `ledger`.
    /// Returns the fills executed within this candle, in firing order.
    pub fn on_candle(
        &mut self,
        candle: &Candle,
        ledger: &mut TradeLedger,
    ) -> Result<Vec<Fill>, LedgerError> {
        let path = if candle.is_rising() {
            [candle.open, candle.low, candle.high, candle.close]
        } else {
            [candle.open, candle.high, candle.low, candle.close]
        };

        let mut executed = Vec::new();
        for (step, &target) in path.iter().enumerate() {
            self.move_price(candle.timestamp, target, step == 0, ledger, &mut executed)?;
        }

        self.price = candle.close;
        ledger.mark(&self.security, candle.timestamp, candle.close);
        if let Some(equity) = &mut self.equity {
            equity.push(candle.timestamp, ledger.equity(), ledger.capital_used());
        }
        Ok(executed)
    }

    fn move_price(
        &mut self,
        time: NaiveDateTime,
        to: f64,
        has_gap: bool,
        ledger: &mut TradeLedger,
        executed: &mut Vec<Fill>,
    ) -> Result<(), LedgerError> {
        let from = self.price;
        self.price = to;
        let half_step = self.price_step * 0.5;

        // Rebuild the active set from a still-active predicate instead of
        // removing while iterating.
        let mut fired = Vec::new();
        let mut still_active = Vec::with_capacity(self.orders.len());
        for order in self.orders.drain(..) {
            match crossing(&order, from, to, half_step, has_gap) {
                Some(fill_price) => fired.push((order, fill_price)),
                None => still_active.push(order),
            }
        }
        self.orders = still_active;

        for (order, fill_price) in fired {
            let commission = self
                .commission
                .amount(order.volume, &self.security, fill_price);
            let fill = Fill {
                time,
                security: self.security.clone(),
                volume: order.volume,
                price: fill_price,
                commission,
                comment: order.comment,
            };
            self.size += fill.volume;
            ledger.apply_fill(&fill)?;
            executed.push(fill);
        }
        Ok(())
    }
}

/// Does this price move fire the order, and at what price?
fn crossing(order: &Order, from: f64, to: f64, half_step: f64, has_gap: bool) -> Option<f64> {
    match order.kind {
        OrderKind::Limit { price } => crosses_band(price, from, to, half_step).then_some(price),
        OrderKind::Stop { trigger } => {
            stop_hit(order.is_buy(), trigger, to).then(|| if has_gap { to } else { trigger })
        }
        OrderKind::TakeStop { take, stop } => {
            if stop_hit(order.is_buy(), stop, to) {
                return Some(if has_gap { to } else { stop });
            }
            crosses_band(take, from, to, half_step).then_some(take)
        }
    }
}

/// Buy stops fire at or above the trigger, sell stops at or below.
fn stop_hit(is_buy: bool, trigger: f64, to: f64) -> bool {
    if is_buy {
        to >= trigger
    } else {
        to <= trigger
    }
}

/// Strictly between the move's endpoints, widened by half a price step so
/// near-equality counts as a cross.
fn crosses_band(price: f64, from: f64, to: f64, half_step: f64) -> bool {
    let lo = from.min(to) - half_step;
    let hi = from.max(to) + half_step;
    lo < price && price < hi
}
