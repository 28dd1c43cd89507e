//! Order tape — the six-column batch of scheduled executions replayed by the
//! tester.
//!
//! Schema: `Timestamp;Security;Volume;Price;Commission;Comment` with signed
//! integer volumes and nondecreasing timestamps. Two batches merge with the
//! same synchronized-merge technique as the series axes (stable: on equal
//! timestamps the receiver's rows come first); merging batches with
//! different column sets is rejected.

use chrono::NaiveDateTime;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::domain::Fill;
use crate::series::candles::TIMESTAMP_FORMAT;

pub const ORDER_COLUMNS: [&str; 6] = [
    "Timestamp",
    "Security",
    "Volume",
    "Price",
    "Commission",
    "Comment",
];

#[derive(Debug, Clone, Default)]
pub struct OrderBatch {
    columns: Vec<String>,
    rows: Vec<Fill>,
}

impl OrderBatch {
    /// Build a batch with the standard column set, validating timestamp order.
    pub fn new(rows: Vec<Fill>) -> Result<Self, BatchError> {
        let batch = Self {
            columns: ORDER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        };
        batch.validate()?;
        Ok(batch)
    }

    pub fn empty() -> Self {
        Self {
            columns: ORDER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Fill] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Merge two batches into one, preserving the nondecreasing-timestamp
    /// invariant; ties keep this batch's rows ahead of `other`'s.
    pub fn merge(self, other: OrderBatch) -> Result<OrderBatch, BatchError> {
        if self.columns != other.columns {
            return Err(BatchError::SchemaMismatch {
                left: self.columns.join(";"),
                right: other.columns.join(";"),
            });
        }
        let mut merged = Vec::with_capacity(self.rows.len() + other.rows.len());
        let mut left = self.rows.into_iter().peekable();
        let mut right = other.rows.into_iter().peekable();
        loop {
            let take_left = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => l.time <= r.time,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_left { left.next() } else { right.next() };
            if let Some(fill) = next {
                merged.push(fill);
            }
        }
        Ok(OrderBatch {
            columns: self.columns,
            rows: merged,
        })
    }

    /// Load a batch from `;`-delimited text.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, BatchError> {
        let mut csv = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv.headers()?.iter().map(|h| h.to_string()).collect();
        for name in ORDER_COLUMNS {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                return Err(BatchError::MissingColumn {
                    column: name.to_string(),
                });
            }
        }
        let col = |name: &str| {
            columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(name))
                .unwrap_or_default()
        };
        let (time_i, security_i, volume_i) = (col("Timestamp"), col("Security"), col("Volume"));
        let (price_i, commission_i, comment_i) = (col("Price"), col("Commission"), col("Comment"));

        let mut rows = Vec::new();
        for (row, record) in csv.records().enumerate() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("");
            let time = NaiveDateTime::parse_from_str(field(time_i), TIMESTAMP_FORMAT).map_err(
                |_| BatchError::BadTimestamp {
                    row,
                    value: field(time_i).to_string(),
                },
            )?;
            let volume: i64 = field(volume_i).parse().map_err(|_| BatchError::BadNumber {
                row,
                value: field(volume_i).to_string(),
            })?;
            let number = |i: usize| -> Result<f64, BatchError> {
                field(i).parse().map_err(|_| BatchError::BadNumber {
                    row,
                    value: field(i).to_string(),
                })
            };
            rows.push(Fill {
                time,
                security: field(security_i).to_string(),
                volume: volume as f64,
                price: number(price_i)?,
                commission: number(commission_i)?,
                comment: field(comment_i).to_string(),
            });
        }

        let batch = Self { columns, rows };
        batch.validate()?;
        Ok(batch)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, BatchError> {
        let file = std::fs::File::open(path).map_err(|source| BatchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_csv_reader(file)
    }

    fn validate(&self) -> Result<(), BatchError> {
        for (i, pair) in self.rows.windows(2).enumerate() {
            if pair[1].time < pair[0].time {
                return Err(BatchError::NonMonotonicTimestamps {
                    row: i + 1,
                    prev: pair[0].time,
                    next: pair[1].time,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("order timestamps must be nondecreasing (row {row}: {prev} then {next})")]
    NonMonotonicTimestamps {
        row: usize,
        prev: NaiveDateTime,
        next: NaiveDateTime,
    },
    #[error("cannot merge order batches with different columns ('{left}' vs '{right}')")]
    SchemaMismatch { left: String, right: String },
    #[error("missing column '{column}' in order file")]
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn row(h: u32, m: u32, security: &str, volume: f64) -> Fill {
        Fill {
            time: ts(h, m),
            security: security.into(),
            volume,
            price: 100.0,
            commission: 0.0,
            comment: String::new(),
        }
    }

    #[test]
    fn nondecreasing_timestamps_enforced() {
        let err = OrderBatch::new(vec![row(11, 0, "SBER", 1.0), row(10, 0, "SBER", -1.0)]);
        assert!(matches!(
            err,
            Err(BatchError::NonMonotonicTimestamps { row: 1, .. })
        ));
    }

    #[test]
    fn equal_timestamps_allowed() {
        let batch =
            OrderBatch::new(vec![row(10, 0, "SBER", 1.0), row(10, 0, "GAZP", -1.0)]).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn merge_interleaves_and_keeps_receiver_first_on_ties() {
        let a = OrderBatch::new(vec![row(10, 0, "A", 1.0), row(12, 0, "A", -1.0)]).unwrap();
        let b = OrderBatch::new(vec![row(10, 0, "B", 2.0), row(11, 0, "B", -2.0)]).unwrap();

        let merged = a.merge(b).unwrap();
        let securities: Vec<&str> = merged.rows().iter().map(|f| f.security.as_str()).collect();
        assert_eq!(securities, vec!["A", "B", "B", "A"]);
    }

    #[test]
    fn merge_rejects_schema_mismatch() {
        let a = OrderBatch::new(vec![row(10, 0, "A", 1.0)]).unwrap();
        let mut b = OrderBatch::new(vec![row(11, 0, "B", 1.0)]).unwrap();
        b.columns.push("Extra".into());
        assert!(matches!(
            a.merge(b),
            Err(BatchError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn load_from_csv() {
        let text = "\
Timestamp;Security;Volume;Price;Commission;Comment
01.03.2024 10:00:00;SBER;10;250.5;1.2;entry
01.03.2024 11:00:00;SBER;-10;252;1.2;exit
";
        let batch = OrderBatch::from_csv_reader(text.as_bytes()).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows()[0].volume, 10.0);
        assert_eq!(batch.rows()[1].price, 252.0);
        assert_eq!(batch.rows()[1].comment, "exit");
    }

    #[test]
    fn csv_rejects_fractional_volume() {
        let text = "\
Timestamp;Security;Volume;Price;Commission;Comment
01.03.2024 10:00:00;SBER;1.5;250.5;0;x
";
        assert!(matches!(
            OrderBatch::from_csv_reader(text.as_bytes()),
            Err(BatchError::BadNumber { .. })
        ));
    }
}
