//! Request loader: read the allocation request JSON and hand typed records
//! to the pipeline.
//!
//! Wire shape (field names fixed by the upstream producer):
//! ```json
//! {
//!   "siteKitty": 100,
//!   "salesAgents": [
//!     { "id": "A1", "sales": 120.0, "lateDeliveries": 2 },
//!     ...
//!   ]
//! }
//! ```
//! `id` may arrive as a JSON string or integer; it is canonicalized to the
//! `AgentId` token either way. Every non-id key of a record is a metric.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use dm_core::{
    entities::AgentRecord,
    tokens::{AgentId, MetricName},
};

use crate::{looks_like_url_strict, IoError, IoResult};

// ----------------------------- Wire-facing types -----------------------------

/// One agent as it appears on the wire: id plus flattened dynamic metric keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentWire {
    #[serde(with = "id_flex")]
    pub id: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

/// Top-level request document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestWire {
    #[serde(rename = "siteKitty")]
    pub site_kitty: i64,
    #[serde(rename = "salesAgents")]
    pub sales_agents: Vec<AgentWire>,
}

/// Typed, token-validated request handed to the pipeline. Agent order is
/// the wire order; the pipeline canonicalizes to id-ascending internally.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationRequest {
    pub kitty: i64,
    pub agents: Vec<AgentRecord>,
}

/// Accept `"id": "A1"` and `"id": 1` alike; canonicalize to the string form.
mod id_flex {
    use serde::de::{Deserializer, Error as _};
    use serde::ser::Serializer;
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Str(String),
        Int(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match IdRepr::deserialize(d)? {
            IdRepr::Str(s) => Ok(s),
            IdRepr::Int(i) => Ok(i.to_string()),
        }
    }

    pub fn serialize<S: Serializer>(id: &str, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(id)
    }
}

// ----------------------------- Conversion -----------------------------

impl AgentWire {
    /// Token-validate into a core record. A negative integer id like `-3`
    /// canonicalizes to `"-3"`, which is a valid token.
    pub fn into_record(self) -> IoResult<AgentRecord> {
        let id = AgentId::from_str(&self.id)
            .map_err(|e| IoError::Invalid(format!("agent id {:?}: {e}", self.id)))?;
        let mut metrics = BTreeMap::new();
        for (key, value) in self.metrics {
            let name = MetricName::from_str(&key)
                .map_err(|e| IoError::Invalid(format!("metric name {key:?}: {e}")))?;
            metrics.insert(name, value);
        }
        Ok(AgentRecord { id, metrics })
    }
}

impl RequestWire {
    pub fn into_request(self) -> IoResult<AllocationRequest> {
        let agents = self
            .sales_agents
            .into_iter()
            .map(AgentWire::into_record)
            .collect::<IoResult<Vec<_>>>()?;
        Ok(AllocationRequest {
            kitty: self.site_kitty,
            agents,
        })
    }
}

// ----------------------------- Loading -----------------------------

/// Parse a request from JSON text.
pub fn parse_request(json: &str) -> IoResult<AllocationRequest> {
    let wire: RequestWire = serde_json::from_str(json)?;
    wire.into_request()
}

/// Load a request from a local file path. Rejects URL-looking paths.
pub fn load_request_from_path<P: AsRef<Path>>(path: P) -> IoResult<AllocationRequest> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    if looks_like_url_strict(&shown) {
        return Err(IoError::Invalid(format!("path must be local file (no scheme): {shown}")));
    }
    let text = fs::read_to_string(path)?;
    parse_request(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_and_integer_ids() {
        let json = r#"{
            "siteKitty": 100,
            "salesAgents": [
                { "id": "A1", "sales": 120.0, "lateDeliveries": 2 },
                { "id": 7, "sales": 80.0, "lateDeliveries": 0 }
            ]
        }"#;
        let req = parse_request(json).unwrap();
        assert_eq!(req.kitty, 100);
        assert_eq!(req.agents.len(), 2);
        assert_eq!(req.agents[0].id.as_str(), "A1");
        assert_eq!(req.agents[1].id.as_str(), "7");
        let sales: MetricName = "sales".parse().unwrap();
        assert_eq!(req.agents[1].metric(&sales), Some(80.0));
    }

    #[test]
    fn flattened_keys_become_metrics() {
        let json = r#"{
            "siteKitty": 10,
            "salesAgents": [ { "id": "x", "a": 1, "b": 2.5, "c": 3 } ]
        }"#;
        let req = parse_request(json).unwrap();
        assert_eq!(req.agents[0].metrics.len(), 3);
    }

    #[test]
    fn rejects_bad_metric_tokens() {
        let json = r#"{
            "siteKitty": 10,
            "salesAgents": [ { "id": "x", "bad key": 1 } ]
        }"#;
        assert!(matches!(parse_request(json), Err(IoError::Invalid(_))));
    }

    #[test]
    fn token_deserialization_enforces_the_charset() {
        // Tokens deserialized directly (not via the wire structs) still go
        // through the charset rule.
        assert!(serde_json::from_str::<MetricName>(r#""sales""#).is_ok());
        assert!(serde_json::from_str::<MetricName>(r#""bad key""#).is_err());
        assert!(serde_json::from_str::<AgentId>(r#""""#).is_err());
    }

    #[test]
    fn rejects_non_numeric_metric_values() {
        let json = r#"{
            "siteKitty": 10,
            "salesAgents": [ { "id": "x", "sales": "lots" } ]
        }"#;
        assert!(matches!(parse_request(json), Err(IoError::Json { .. })));
    }

    #[test]
    fn rejects_url_paths() {
        let err = load_request_from_path("https://example.com/input.json").unwrap_err();
        assert!(matches!(err, IoError::Invalid(_)));
    }

    #[test]
    fn loads_from_file() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{ "siteKitty": 30, "salesAgents": [ {{ "id": "a", "m": 1 }} ] }}"#
        )
        .unwrap();
        let req = load_request_from_path(f.path()).unwrap();
        assert_eq!(req.kitty, 30);
        assert_eq!(req.agents[0].id.as_str(), "a");
    }
}
