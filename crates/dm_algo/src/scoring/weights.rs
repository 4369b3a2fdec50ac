//! Entropy weighting: objective per-metric importance from the normalized
//! matrix.
//!
//! Contract:
//! - Per metric: `e = −(1/ln n) · Σ p·ln(p)` over agents, skipping terms
//!   with `p ≤ 0` (no information there, and ln(0) is undefined).
//! - Divergence `d = 1 − e`; weight `w = d / Σ d`.
//! - Near-uniform values ⇒ high entropy ⇒ low divergence ⇒ low weight: a
//!   metric that does not discriminate agents should not drive the ranking.
//! - Degenerate cases (Σ d == 0, or n ≤ 1 where 1/ln(n) is undefined) fall
//!   back to equal weights `1/m`. Never NaN, never divide-by-zero. The
//!   fallback is flagged so callers can log it: equal weights usually mean
//!   the input data does not discriminate at all.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use dm_core::{metrics::MetricSchema, tokens::MetricName};

use crate::Matrix;

/// Per-metric weights, summing to 1.0 (within floating tolerance).
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector {
    weights: BTreeMap<MetricName, f64>,
    degenerate: bool,
}

impl WeightVector {
    pub fn get(&self, name: &MetricName) -> f64 {
        self.weights.get(name).copied().unwrap_or(0.0)
    }

    /// True when the equal-weight fallback was taken (zero total divergence
    /// or a single-agent input).
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricName, f64)> {
        self.weights.iter().map(|(n, w)| (n, *w))
    }

    fn equal(schema: &MetricSchema) -> Self {
        let w = 1.0 / schema.len() as f64;
        Self {
            weights: schema.names().map(|n| (n.clone(), w)).collect(),
            degenerate: true,
        }
    }
}

/// Derive entropy weights from the normalized matrix.
pub fn entropy_weights(normalized: &Matrix, schema: &MetricSchema) -> WeightVector {
    let n = normalized.len();
    if n <= 1 {
        // 1/ln(1) is undefined and n == 0 is rejected upstream; either way
        // entropy carries no signal here.
        return WeightVector::equal(schema);
    }
    let k = 1.0 / (n as f64).ln();

    let mut divergence: BTreeMap<MetricName, f64> = BTreeMap::new();
    for name in schema.names() {
        let mut e_sum = 0.0;
        for row in normalized.values() {
            let p = row.get(name).copied().unwrap_or(0.0);
            if p > 0.0 {
                e_sum += p * p.ln();
            }
        }
        let entropy = -k * e_sum;
        divergence.insert(name.clone(), 1.0 - entropy);
    }

    let total: f64 = divergence.values().sum();
    if total == 0.0 {
        return WeightVector::equal(schema);
    }

    WeightVector {
        weights: divergence.into_iter().map(|(name, d)| (name, d / total)).collect(),
        degenerate: false,
    }
}
