//! JSON result artifact — summary plus run fingerprint.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

use tradelab_core::engine::Summary;
use tradelab_core::fingerprint::RunFingerprint;

/// Everything needed to compare one run against another without re-running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub summary: Summary,
    pub fingerprint: RunFingerprint,
}

pub fn write_summary_json<W: Write>(mut sink: W, artifact: &ReportArtifact) -> Result<()> {
    let json =
        serde_json::to_string_pretty(artifact).context("failed to serialize run summary")?;
    sink.write_all(json.as_bytes())?;
    sink.write_all(b"\n")?;
    Ok(())
}
