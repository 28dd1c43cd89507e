//! TradeLab Runner — walk-forward composition and run tooling.
//!
//! - Walk-forward window indices, candidate equity matrix, and the splicing
//!   composer that stitches in-sample-selected curves into one continuous
//!   out-of-sample track record
//! - Pluggable equity selector strategies
//! - TOML run configuration
//! - Equity/trade/summary export against explicit sinks

pub mod config;
pub mod reporting;
pub mod selectors;
pub mod walk_forward;

pub use config::{ConfigError, RunConfig};
pub use selectors::EquitySelector;
pub use walk_forward::{compose, EquityMatrix, WalkForwardError, WalkForwardIndices};
