//! Ideal / anti-ideal extraction from the weighted matrix.
//!
//! Per metric: ideal = max weighted value across agents, anti-ideal = min.
//! With a single agent, ideal == anti-ideal for every metric; the closeness
//! stage handles that degenerate pair explicitly.

#![forbid(unsafe_code)]

use dm_core::metrics::MetricSchema;

use crate::{Matrix, MetricRow};

/// Best- and worst-case weighted value per metric, observed across agents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IdealPair {
    pub ideal: MetricRow,
    pub anti: MetricRow,
}

/// Extract the ideal/anti-ideal pair. An empty matrix (rejected upstream)
/// yields empty rows.
pub fn ideal_bounds(weighted: &Matrix, schema: &MetricSchema) -> IdealPair {
    let mut pair = IdealPair::default();
    if weighted.is_empty() {
        return pair;
    }

    for name in schema.names() {
        let mut best = f64::NEG_INFINITY;
        let mut worst = f64::INFINITY;
        for row in weighted.values() {
            let v = row.get(name).copied().unwrap_or(0.0);
            best = best.max(v);
            worst = worst.min(v);
        }
        pair.ideal.insert(name.clone(), best);
        pair.anti.insert(name.clone(), worst);
    }
    pair
}
