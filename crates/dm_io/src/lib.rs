//! dm_io — I/O crate for the DM engine.
//!
//! - Wire-facing serde types for the allocation request and report
//! - File loader/writer (local paths only; no network I/O)
//! - Shared error type (`IoError`) with `From` conversions used across
//!   modules
//!
//! Shape and domain validation beyond "parses into the wire types" lives in
//! `dm_pipeline::validate`; this crate only guarantees typed, canonically
//! ordered data.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for dm_io (used by request/report modules).
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with an optional JSON Pointer.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Generic validation / invariants (bad tokens, non-local paths, ...).
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json doesn't keep a pointer; default to root. Callers may
        // enrich this at higher layers.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

pub mod report;
pub mod request;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
/// Loading in this crate follows a strict offline posture.
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::report;
    pub use crate::request;

    pub use crate::report::{write_report_to_path, AllocationLine, AllocationReport};
    pub use crate::request::{load_request_from_path, AllocationRequest};
}
