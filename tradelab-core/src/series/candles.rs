//! Columnar OHLCV series keyed by strictly increasing timestamps.
//!
//! Storage is column-per-field so the replay loop can walk closes without
//! materializing row structs. The loader reads `;`-delimited text with a
//! `Date;Time;Open;High;Low;Close;Volume` header (dates as `DD.MM.YYYY`).

use chrono::NaiveDateTime;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::Candle;

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    security: String,
    timestamps: Vec<NaiveDateTime>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl CandleSeries {
    pub fn new(security: &str) -> Self {
        Self {
            security: security.to_string(),
            ..Default::default()
        }
    }

    pub fn security(&self) -> &str {
        &self.security
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn close(&self, index: usize) -> f64 {
        self.close[index]
    }

    pub fn get(&self, index: usize) -> Candle {
        Candle {
            timestamp: self.timestamps[index],
            open: self.open[index],
            high: self.high[index],
            low: self.low[index],
            close: self.close[index],
            volume: self.volume[index],
        }
    }

    /// Append a candle; timestamps must be strictly increasing.
    pub fn push(&mut self, candle: Candle) -> Result<(), SeriesError> {
        if let Some(&last) = self.timestamps.last() {
            if candle.timestamp <= last {
                return Err(SeriesError::NonMonotonicTimestamp {
                    security: self.security.clone(),
                    prev: last,
                    next: candle.timestamp,
                });
            }
        }
        self.timestamps.push(candle.timestamp);
        self.open.push(candle.open);
        self.high.push(candle.high);
        self.low.push(candle.low);
        self.close.push(candle.close);
        self.volume.push(candle.volume);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Load a series from `;`-delimited text.
    pub fn from_csv_reader<R: Read>(security: &str, reader: R) -> Result<Self, SeriesError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        let expected = ["Date", "Time", "Open", "High", "Low", "Close", "Volume"];
        for name in expected {
            if !headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
                return Err(SeriesError::MissingColumn {
                    column: name.to_string(),
                });
            }
        }
        let col = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .unwrap_or_default()
        };
        let (date_i, time_i) = (col("Date"), col("Time"));
        let (open_i, high_i, low_i) = (col("Open"), col("High"), col("Low"));
        let (close_i, volume_i) = (col("Close"), col("Volume"));

        let mut series = Self::new(security);
        for (row, record) in csv.records().enumerate() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("");
            let stamp = format!("{} {}", field(date_i), field(time_i));
            let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
                .map_err(|_| SeriesError::BadTimestamp { row, value: stamp })?;
            let number = |i: usize| -> Result<f64, SeriesError> {
                field(i).parse().map_err(|_| SeriesError::BadNumber {
                    row,
                    value: field(i).to_string(),
                })
            };
            series.push(Candle {
                timestamp,
                open: number(open_i)?,
                high: number(high_i)?,
                low: number(low_i)?,
                close: number(close_i)?,
                volume: number(volume_i)?,
            })?;
        }
        Ok(series)
    }

    pub fn from_csv_path(security: &str, path: &Path) -> Result<Self, SeriesError> {
        let file = std::fs::File::open(path).map_err(|source| SeriesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(security, file)
    }
}

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("candle timestamps for {security} must be strictly increasing ({prev} then {next})")]
    NonMonotonicTimestamp {
        security: String,
        prev: NaiveDateTime,
        next: NaiveDateTime,
    },
    #[error("missing column '{column}' in candle file")]
    MissingColumn { column: String },
    #[error("row {row}: unparseable timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },
    #[error("row {row}: unparseable number '{value}'")]
    BadNumber { row: usize, value: String },
    #[error("failed to open {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
