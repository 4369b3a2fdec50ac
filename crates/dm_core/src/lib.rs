//! dm_core — Core types and domains for the DM engine.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`dm_io`, `dm_algo`, `dm_pipeline`, `dm_cli`).
//!
//! - Tokens: `AgentId`, `MetricName` (strict charset)
//! - Metric domain: `MetricKind` (benefit/cost), `MetricSchema`
//! - Entities: `AgentRecord`
//!
//! The metric schema is the rectangularity contract: it is built once from
//! the first agent record plus a cost-metric classification list, and every
//! other record is checked against it before any scoring runs.
//!
//! Serialization derives are gated behind `serde` feature.

#![forbid(unsafe_code)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        EmptyMetricSet,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::EmptyMetricSet => write!(f, "empty metric set"),
            }
        }
    }
}

pub mod tokens {
    //! Token types (`AgentId`, `MetricName`) with strict charset.

    use crate::errors::CoreError;
    use alloc::string::{String, ToString};
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::Serialize;

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=64).contains(&len) { return false; }
        s.bytes().all(|b| matches!(b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
            b'_' | b'-' | b':' | b'.'
        ))
    }

    macro_rules! def_token {
        ($name:ident) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize))]
            pub struct $name(String);

            // Deserialization goes through `FromStr` so the charset rule
            // holds for every constructed token, wire-sourced included.
            #[cfg(feature = "serde")]
            impl<'de> serde::Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: serde::Deserializer<'de>,
                {
                    let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                    s.parse().map_err(|_| {
                        serde::de::Error::custom(concat!("invalid ", stringify!($name), " token"))
                    })
                }
            }

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
                }
            }
        }
    }

    def_token!(AgentId);
    def_token!(MetricName);
}

pub mod metrics {
    //! Metric classification and the rectangular-schema contract.

    use crate::errors::CoreError;
    use crate::tokens::MetricName;
    use alloc::collections::{BTreeMap, BTreeSet};
    use alloc::vec::Vec;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    /// Direction of a metric: `Benefit` = higher raw value is better,
    /// `Cost` = lower raw value is better. Unclassified names default to
    /// `Benefit`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
    pub enum MetricKind {
        Benefit,
        Cost,
    }

    /// Validated, ordered metric set (name → kind), built once from the
    /// first agent record and an injectable cost-metric list.
    ///
    /// Every subsequent record must carry exactly this metric set; the
    /// engine assumes a rectangular agents × metrics matrix and refuses to
    /// run otherwise.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct MetricSchema {
        kinds: BTreeMap<MetricName, MetricKind>,
    }

    /// One shape violation against the schema.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum ShapeIssue {
        /// Record lacks a metric present in the schema.
        Missing(MetricName),
        /// Record carries a metric the schema does not know.
        Unexpected(MetricName),
    }

    impl MetricSchema {
        /// Build from the metric names of the first record. Names listed in
        /// `cost_metrics` are classified `Cost`; everything else `Benefit`.
        pub fn from_metric_names<'a, I>(
            names: I,
            cost_metrics: &BTreeSet<MetricName>,
        ) -> Result<Self, CoreError>
        where
            I: IntoIterator<Item = &'a MetricName>,
        {
            let kinds: BTreeMap<MetricName, MetricKind> = names
                .into_iter()
                .map(|name| {
                    let kind = if cost_metrics.contains(name) {
                        MetricKind::Cost
                    } else {
                        MetricKind::Benefit
                    };
                    (name.clone(), kind)
                })
                .collect();
            if kinds.is_empty() {
                return Err(CoreError::EmptyMetricSet);
            }
            Ok(Self { kinds })
        }

        pub fn len(&self) -> usize { self.kinds.len() }

        pub fn is_empty(&self) -> bool { self.kinds.is_empty() }

        pub fn kind(&self, name: &MetricName) -> Option<MetricKind> {
            self.kinds.get(name).copied()
        }

        pub fn contains(&self, name: &MetricName) -> bool {
            self.kinds.contains_key(name)
        }

        /// Iterate (name, kind) in canonical (name-ascending) order.
        pub fn iter(&self) -> impl Iterator<Item = (&MetricName, MetricKind)> {
            self.kinds.iter().map(|(n, k)| (n, *k))
        }

        /// Metric names in canonical order.
        pub fn names(&self) -> impl Iterator<Item = &MetricName> {
            self.kinds.keys()
        }

        /// Check a record's metric names against the schema; returns every
        /// violation (missing first, then unexpected) for deterministic
        /// reporting.
        pub fn check_shape<'a, I>(&self, names: I) -> Vec<ShapeIssue>
        where
            I: IntoIterator<Item = &'a MetricName>,
        {
            let present: BTreeSet<&MetricName> = names.into_iter().collect();
            let mut issues = Vec::new();
            for name in self.kinds.keys() {
                if !present.contains(name) {
                    issues.push(ShapeIssue::Missing(name.clone()));
                }
            }
            for name in present {
                if !self.contains(name) {
                    issues.push(ShapeIssue::Unexpected(name.clone()));
                }
            }
            issues
        }
    }
}

pub mod entities {
    //! Agent records: the unit of input for every stage.

    use crate::tokens::{AgentId, MetricName};
    use alloc::collections::BTreeMap;

    #[cfg(feature = "serde")]
    use serde::Serialize;

    /// One agent: opaque stable id plus raw metric values. Immutable once
    /// read; the full set is the unit of computation. Deserialization is
    /// deliberately absent: records are built through the wire layer's
    /// validated constructors.
    #[derive(Clone, Debug, PartialEq)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct AgentRecord {
        pub id: AgentId,
        pub metrics: BTreeMap<MetricName, f64>,
    }

    impl AgentRecord {
        pub fn metric(&self, name: &MetricName) -> Option<f64> {
            self.metrics.get(name).copied()
        }
    }
}
