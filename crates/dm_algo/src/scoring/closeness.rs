//! Relative closeness to the ideal solution.
//!
//! Contract:
//! - Per agent: Euclidean distance to the ideal row (d+) and the anti-ideal
//!   row (d−) over all metrics; closeness = d− / (d+ + d−).
//! - Closeness ∈ [0,1]; higher means closer to ideal.
//! - Degenerate case: d+ + d− == 0 (agent coincides with both bounds, i.e.
//!   all agents identical or a single-agent input) ⇒ closeness 0.5, neutral.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use dm_core::{metrics::MetricSchema, tokens::AgentId};

use crate::{IdealPair, Matrix};

/// Compute each agent's closeness coefficient.
pub fn closeness_scores(
    weighted: &Matrix,
    bounds: &IdealPair,
    schema: &MetricSchema,
) -> BTreeMap<AgentId, f64> {
    weighted
        .iter()
        .map(|(id, row)| {
            let mut d_plus = 0.0;
            let mut d_minus = 0.0;
            for name in schema.names() {
                let v = row.get(name).copied().unwrap_or(0.0);
                let ideal = bounds.ideal.get(name).copied().unwrap_or(0.0);
                let anti = bounds.anti.get(name).copied().unwrap_or(0.0);
                d_plus += (v - ideal) * (v - ideal);
                d_minus += (v - anti) * (v - anti);
            }
            let d_plus = d_plus.sqrt();
            let d_minus = d_minus.sqrt();

            let closeness = if d_plus + d_minus == 0.0 {
                0.5
            } else {
                d_minus / (d_plus + d_minus)
            };
            (id.clone(), closeness)
        })
        .collect()
}
