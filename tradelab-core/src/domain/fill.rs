//! Fill — an executed trade event applied to the ledger.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One execution: signed volume of a security at a price, with the
/// commission already priced in by the policy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub time: NaiveDateTime,
    pub security: String,
    /// Signed volume: positive buys, negative sells.
    pub volume: f64,
    pub price: f64,
    pub commission: f64,
    pub comment: String,
}

impl Fill {
    pub fn is_buy(&self) -> bool {
        self.volume > 0.0
    }

    /// Notional value of the execution.
    pub fn value(&self) -> f64 {
        self.volume.abs() * self.price
    }
}
