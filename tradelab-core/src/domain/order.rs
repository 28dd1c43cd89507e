//! Conditional order intents — limit, stop, and take-stop (OCO) variants.
//!
//! Orders are immutable once accepted: a signed nonzero volume, one or two
//! trigger prices, and a free-text comment that travels onto the fill.
//! Side validation against the current simulated price happens at submission
//! time (`Position::submit_*`), never deferred to the crossing loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::trade::VOLUME_EPS;

/// Stable identifier assigned by the owning `Position`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OrderId(pub u64);

/// Closed set of order variants. The crossing engine dispatches on the tag,
/// keeping the whole matching algorithm in one exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Resting order, filled exactly at its price when the intrabar path
    /// crosses it. No slippage on limits.
    Limit { price: f64 },
    /// Fires when the simulated price reaches or passes the trigger.
    /// Fills at the trigger, except on a gap move (fills at the gapped price).
    Stop { trigger: f64 },
    /// One-cancels-other exit pair: take-profit on the favorable side,
    /// stop-loss on the adverse side. The stop side is tested first.
    TakeStop { take: f64, stop: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderKind,
    /// Signed volume: positive buys, negative sells. Never zero.
    pub volume: f64,
    pub comment: String,
}

impl Order {
    pub fn is_buy(&self) -> bool {
        self.volume > 0.0
    }

    /// Validate this order's prices against the current simulated price.
    ///
    /// Limits may rest at the current price; stops must sit strictly on the
    /// far side (a stop at the market would fire on the next move in either
    /// direction, which is a construction bug under this model).
    pub fn validate_against(&self, current: f64) -> Result<(), OrderError> {
        if self.volume.abs() <= VOLUME_EPS {
            return Err(OrderError::ZeroVolume {
                volume: self.volume,
            });
        }
        let buy = self.is_buy();
        match self.kind {
            OrderKind::Limit { price } => {
                if buy && price > current {
                    return Err(OrderError::BuyLimitAboveMarket { price, current });
                }
                if !buy && price < current {
                    return Err(OrderError::SellLimitBelowMarket { price, current });
                }
            }
            OrderKind::Stop { trigger } => {
                if buy && trigger <= current {
                    return Err(OrderError::BuyStopBelowMarket { trigger, current });
                }
                if !buy && trigger >= current {
                    return Err(OrderError::SellStopAboveMarket { trigger, current });
                }
            }
            OrderKind::TakeStop { take, stop } => {
                // A sell pair exits a long: take above, stop below. A buy
                // pair exits a short: take below, stop above.
                if buy {
                    if take > current {
                        return Err(OrderError::TakeOnWrongSide { take, current });
                    }
                    if stop <= current {
                        return Err(OrderError::StopOnWrongSide { stop, current });
                    }
                } else {
                    if take < current {
                        return Err(OrderError::TakeOnWrongSide { take, current });
                    }
                    if stop >= current {
                        return Err(OrderError::StopOnWrongSide { stop, current });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Rejections raised at order submission.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("order volume must be nonzero (got {volume})")]
    ZeroVolume { volume: f64 },
    #[error("buy limit at {price} must be at or below current price {current}")]
    BuyLimitAboveMarket { price: f64, current: f64 },
    #[error("sell limit at {price} must be at or above current price {current}")]
    SellLimitBelowMarket { price: f64, current: f64 },
    #[error("buy stop at {trigger} must be strictly above current price {current}")]
    BuyStopBelowMarket { trigger: f64, current: f64 },
    #[error("sell stop at {trigger} must be strictly below current price {current}")]
    SellStopAboveMarket { trigger: f64, current: f64 },
    #[error("take price {take} is not on the favorable side of current price {current}")]
    TakeOnWrongSide { take: f64, current: f64 },
    #[error("stop price {stop} is not on the adverse side of current price {current}")]
    StopOnWrongSide { stop: f64, current: f64 },
}
