//! Time-series storage and the multi-series synchronizer.

pub mod candles;
pub mod equity;
pub mod sync;

pub use candles::{CandleSeries, SeriesError};
pub use equity::{EquityCurve, EquityPoint};
pub use sync::{SyncError, Synchronizer};
