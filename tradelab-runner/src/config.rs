//! Serializable run configuration (TOML).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradelab_core::engine::DrawdownMode;

/// Configuration for a single replay run, loaded from a TOML file.
///
/// ```toml
/// initial_capital = 1000000.0
/// drawdown_mode = "FixedCapital"
/// orders = ["orders/leg_a.csv", "orders/leg_b.csv"]
/// output_dir = "results"
///
/// [[candles]]
/// security = "SBER"
/// path = "data/sber.csv"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub initial_capital: f64,
    #[serde(default)]
    pub drawdown_mode: DrawdownMode,
    /// Reference capital for percent exports; defaults to `initial_capital`.
    #[serde(default)]
    pub reference_capital: Option<f64>,
    pub candles: Vec<CandleFile>,
    pub orders: Vec<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Export the `CapitalUsed,%` column alongside equity.
    #[serde(default = "default_true")]
    pub export_capital_used: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleFile {
    pub security: String,
    pub path: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

impl RunConfig {
    pub fn from_toml_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::InvalidCapital {
                capital: self.initial_capital,
            });
        }
        if let Some(reference) = self.reference_capital {
            if reference <= 0.0 {
                return Err(ConfigError::InvalidCapital { capital: reference });
            }
        }
        if self.candles.is_empty() {
            return Err(ConfigError::NoSeries);
        }
        Ok(())
    }

    pub fn reference_capital(&self) -> f64 {
        self.reference_capital.unwrap_or(self.initial_capital)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("capital must be positive (got {capital})")]
    InvalidCapital { capital: f64 },
    #[error("config lists no candle series")]
    NoSeries,
}
