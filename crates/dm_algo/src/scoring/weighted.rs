//! Weighted decision matrix: elementwise normalized × weight.
//!
//! Pure multiply; no edge cases beyond propagating upstream values.

#![forbid(unsafe_code)]

use dm_core::metrics::MetricSchema;

use crate::{Matrix, MetricRow, WeightVector};

/// Multiply each normalized value by its metric weight.
pub fn apply_weights(normalized: &Matrix, weights: &WeightVector, schema: &MetricSchema) -> Matrix {
    normalized
        .iter()
        .map(|(id, row)| {
            let weighted: MetricRow = schema
                .names()
                .map(|name| {
                    let v = row.get(name).copied().unwrap_or(0.0);
                    (name.clone(), v * weights.get(name))
                })
                .collect();
            (id.clone(), weighted)
        })
        .collect()
}
