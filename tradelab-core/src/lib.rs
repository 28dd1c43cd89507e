//! TradeLab Core — trade-simulation engine.
//!
//! This crate contains the heart of the replay machinery:
//! - Domain value types (candles, orders, fills, trades)
//! - Order crossing engine with intrabar path simulation and gap-aware stops
//! - FIFO trade ledger with position netting and direction flips
//! - Multi-series synchronizer and the backtest orchestrator
//! - Commission policies, run summaries, and run fingerprinting

pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod series;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed across crate boundaries are
    /// Send + Sync, so runner-side parallel sweeps can share them freely.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        require_send::<series::CandleSeries>();
        require_sync::<series::CandleSeries>();
        require_send::<series::EquityCurve>();
        require_sync::<series::EquityCurve>();

        require_send::<engine::OrderBatch>();
        require_sync::<engine::OrderBatch>();
        require_send::<engine::TradeLedger>();
        require_sync::<engine::TradeLedger>();
        require_send::<engine::Summary>();
        require_sync::<engine::Summary>();

        require_send::<fingerprint::RunFingerprint>();
        require_sync::<fingerprint::RunFingerprint>();
    }
}
