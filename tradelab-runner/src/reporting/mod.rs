//! Result artifacts, written to explicit sinks — the core never touches a
//! process-wide stream.

pub mod equity;
pub mod summary;
pub mod trades;

pub use equity::write_equity;
pub use summary::{write_summary_json, ReportArtifact};
pub use trades::write_trades;
