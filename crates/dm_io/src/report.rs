//! Report writer: allocation results → JSON document.
//!
//! Wire shape mirrors the request producer's expectations:
//! ```json
//! { "allocations": [ { "id": "A1", "assignedDiscount": 42,
//!                      "justification": "..." } ] }
//! ```
//! Lines are emitted in the order the pipeline hands them over (canonical,
//! id-ascending); output is pretty-printed (2-space) for human audit.

#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::IoResult;

/// One allocation line on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationLine {
    pub id: String,
    #[serde(rename = "assignedDiscount")]
    pub assigned_discount: i64,
    pub justification: String,
}

/// Top-level report document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllocationReport {
    pub allocations: Vec<AllocationLine>,
}

/// Serialize the report as pretty JSON text.
pub fn report_to_string(report: &AllocationReport) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write the report to a local file path.
pub fn write_report_to_path<P: AsRef<Path>>(report: &AllocationReport, path: P) -> IoResult<()> {
    let text = report_to_string(report)?;
    fs::write(path, text)?;
    Ok(())
}
