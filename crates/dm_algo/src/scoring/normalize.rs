//! Metric normalization: raw agent values → comparable unit-free values.
//!
//! Contract:
//! - Benefit metrics: vector normalization, `raw / sqrt(Σ raw²)` over all
//!   agents for that metric.
//! - Cost metrics: max-based complement, `1 − raw / max`, re-orienting the
//!   metric so larger normalized still means better.
//! - Zero-norm metric (every agent reports 0): every normalized value for
//!   that metric is 0. The metric contributes nothing; no divide-by-zero.
//! - Cost metric with `max ≤ 0` (all values nonpositive, some negative):
//!   the complement is undefined, so the metric normalizes to 0 as well.
//!
//! Assumes records already passed shape validation upstream; a missing
//! metric reads as 0 rather than panicking.

#![forbid(unsafe_code)]

use dm_core::{
    entities::AgentRecord,
    metrics::{MetricKind, MetricSchema},
};

use crate::{Matrix, MetricRow};

/// Normalize the full agent set against `schema`.
pub fn normalize(agents: &[AgentRecord], schema: &MetricSchema) -> Matrix {
    let mut out = Matrix::new();
    for agent in agents {
        out.insert(agent.id.clone(), MetricRow::new());
    }

    for (name, kind) in schema.iter() {
        let norm: f64 = agents
            .iter()
            .map(|a| {
                let v = a.metric(name).unwrap_or(0.0);
                v * v
            })
            .sum::<f64>()
            .sqrt();
        let max = agents
            .iter()
            .map(|a| a.metric(name).unwrap_or(0.0))
            .fold(f64::NEG_INFINITY, f64::max);

        for agent in agents {
            let raw = agent.metric(name).unwrap_or(0.0);
            let value = if norm == 0.0 {
                0.0
            } else {
                match kind {
                    MetricKind::Benefit => raw / norm,
                    // max ≤ 0 with a nonzero norm means negative values;
                    // the max-complement would divide by zero or flip sign.
                    MetricKind::Cost if max <= 0.0 => 0.0,
                    MetricKind::Cost => 1.0 - (raw / max),
                }
            };
            if let Some(row) = out.get_mut(&agent.id) {
                row.insert(name.clone(), value);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::tokens::MetricName;
    use std::collections::BTreeSet;

    fn m(s: &str) -> MetricName { s.parse().unwrap() }

    fn agent(id: &str, pairs: &[(&str, f64)]) -> AgentRecord {
        AgentRecord {
            id: id.parse().unwrap(),
            metrics: pairs.iter().map(|(k, v)| (m(k), *v)).collect(),
        }
    }

    fn schema_of(agents: &[AgentRecord], cost: &[&str]) -> MetricSchema {
        let cost: BTreeSet<MetricName> = cost.iter().map(|s| m(s)).collect();
        MetricSchema::from_metric_names(agents[0].metrics.keys(), &cost).unwrap()
    }

    #[test]
    fn benefit_metric_uses_vector_norm() {
        let agents = vec![agent("a", &[("sales", 3.0)]), agent("b", &[("sales", 4.0)])];
        let schema = schema_of(&agents, &[]);
        let nm = normalize(&agents, &schema);
        // norm = sqrt(9 + 16) = 5
        assert!((nm[&agents[0].id][&m("sales")] - 0.6).abs() < 1e-12);
        assert!((nm[&agents[1].id][&m("sales")] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn cost_metric_uses_max_complement() {
        let agents = vec![agent("a", &[("late", 1.0)]), agent("b", &[("late", 100.0)])];
        let schema = schema_of(&agents, &["late"]);
        let nm = normalize(&agents, &schema);
        assert!((nm[&agents[0].id][&m("late")] - 0.99).abs() < 1e-12);
        assert!((nm[&agents[1].id][&m("late")] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn nonpositive_cost_metric_normalizes_to_zero() {
        // norm != 0 but max == 0: the complement would divide by zero.
        let agents = vec![agent("a", &[("late", -1.0)]), agent("b", &[("late", 0.0)])];
        let schema = schema_of(&agents, &["late"]);
        let nm = normalize(&agents, &schema);
        for row in nm.values() {
            let v = row[&m("late")];
            assert!(v.is_finite());
            assert_eq!(v, 0.0);
        }

        // All negative: same recovery.
        let agents = vec![agent("a", &[("late", -3.0)]), agent("b", &[("late", -7.0)])];
        let schema = schema_of(&agents, &["late"]);
        let nm = normalize(&agents, &schema);
        for row in nm.values() {
            assert_eq!(row[&m("late")], 0.0);
        }
    }

    #[test]
    fn all_zero_metric_normalizes_to_zero() {
        let agents = vec![agent("a", &[("sales", 0.0)]), agent("b", &[("sales", 0.0)])];
        for cost in [&[][..], &["sales"][..]] {
            let schema = schema_of(&agents, cost);
            let nm = normalize(&agents, &schema);
            for row in nm.values() {
                assert_eq!(row[&m("sales")], 0.0);
            }
        }
    }
}
