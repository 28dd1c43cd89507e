//! Run fingerprinting — deterministic identity for a replay run.
//!
//! Two runs over the same configuration, candle data, and order tape produce
//! the same fingerprint, so results can be compared or deduplicated across
//! machines without re-running.

use serde::{Deserialize, Serialize};

use crate::engine::batch::OrderBatch;
use crate::series::CandleSeries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    /// Hash of the caller-supplied configuration (canonical JSON).
    pub config_hash: String,
    /// Hash of every candle series and order row fed into the run.
    pub dataset_hash: String,
    /// Combined run identity.
    pub run_id: String,
}

impl RunFingerprint {
    pub fn compute(config_json: &str, series: &[CandleSeries], orders: &OrderBatch) -> Self {
        let config_hash = blake3::hash(config_json.as_bytes()).to_hex().to_string();
        let dataset_hash = hash_dataset(series, orders);

        let mut combined = blake3::Hasher::new();
        combined.update(config_hash.as_bytes());
        combined.update(dataset_hash.as_bytes());
        let run_id = combined.finalize().to_hex().to_string();

        Self {
            config_hash,
            dataset_hash,
            run_id,
        }
    }
}

fn hash_dataset(series: &[CandleSeries], orders: &OrderBatch) -> String {
    let mut hasher = blake3::Hasher::new();
    for s in series {
        hasher.update(s.security().as_bytes());
        for candle in s.iter() {
            hasher.update(&candle.timestamp.and_utc().timestamp().to_le_bytes());
            hasher.update(&candle.open.to_le_bytes());
            hasher.update(&candle.high.to_le_bytes());
            hasher.update(&candle.low.to_le_bytes());
            hasher.update(&candle.close.to_le_bytes());
            hasher.update(&candle.volume.to_le_bytes());
        }
    }
    for row in orders.rows() {
        hasher.update(&row.time.and_utc().timestamp().to_le_bytes());
        hasher.update(row.security.as_bytes());
        hasher.update(&row.volume.to_le_bytes());
        hasher.update(&row.price.to_le_bytes());
        hasher.update(&row.commission.to_le_bytes());
        hasher.update(row.comment.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
