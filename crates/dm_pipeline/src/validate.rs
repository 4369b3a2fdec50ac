//! Structural & semantic validation before any computation.
//! Deterministic outputs; every stage downstream assumes a validated
//! rectangular numeric matrix, so all Error-severity findings abort the run.
//!
//! Checks:
//! - EmptyInput: zero agents (entropy/normalization undefined for n = 0)
//! - NonPositiveKitty: kitty ≤ 0 is rejected, not zero-filled
//! - EmptyMetricSet: first record carries no metrics
//! - DuplicateAgent: two records share an id (canonical keying would merge)
//! - ShapeMismatch: record missing a first-record metric, or carrying extras
//! - NonFiniteMetric: NaN/±inf raw value
//! - NegativeMetric: warning only; vector normalization is still defined,
//!   but the pipeline's [0,1] contracts assume nonnegative metrics

use std::collections::BTreeSet;

use dm_core::{
    metrics::{MetricSchema, ShapeIssue},
    tokens::{AgentId, MetricName},
};
use dm_io::request::AllocationRequest;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred (kept small & deterministic).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntityRef {
    Root,
    Agent(AgentId),
    Metric(MetricName),
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub where_: EntityRef,
}

/// Deterministic report: pass = (no Error); ordering of issues is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationIssue {
    fn error(code: &'static str, message: String, where_: EntityRef) -> Self {
        Self { severity: Severity::Error, code, message, where_ }
    }

    fn warning(code: &'static str, message: String, where_: EntityRef) -> Self {
        Self { severity: Severity::Warning, code, message, where_ }
    }
}

/// Top-level entry point.
pub fn validate(request: &AllocationRequest, cost_metrics: &BTreeSet<MetricName>) -> ValidationReport {
    let mut issues: Vec<ValidationIssue> = Vec::new();

    if request.kitty <= 0 {
        issues.push(ValidationIssue::error(
            "non_positive_kitty",
            format!("kitty must be positive, got {}", request.kitty),
            EntityRef::Root,
        ));
    }

    if request.agents.is_empty() {
        issues.push(ValidationIssue::error(
            "empty_input",
            "no agent records supplied".to_string(),
            EntityRef::Root,
        ));
        sort_issues_stably(&mut issues);
        return finish(issues);
    }

    issues.extend(check_duplicate_agents(request));

    // Schema from the first record; every other record is checked against it.
    match MetricSchema::from_metric_names(request.agents[0].metrics.keys(), cost_metrics) {
        Ok(schema) => {
            issues.extend(check_shapes(request, &schema));
            issues.extend(check_metric_values(request));
        }
        Err(_) => {
            issues.push(ValidationIssue::error(
                "empty_metric_set",
                "first agent record carries no metrics".to_string(),
                EntityRef::Agent(request.agents[0].id.clone()),
            ));
        }
    }

    sort_issues_stably(&mut issues);
    finish(issues)
}

// ------------------------------------------------------------------------------------------------
// Helpers / checks
// ------------------------------------------------------------------------------------------------

fn check_duplicate_agents(request: &AllocationRequest) -> Vec<ValidationIssue> {
    let mut seen: BTreeSet<&AgentId> = BTreeSet::new();
    let mut issues = Vec::new();
    for agent in &request.agents {
        if !seen.insert(&agent.id) {
            issues.push(ValidationIssue::error(
                "duplicate_agent",
                format!("agent id {} appears more than once", agent.id),
                EntityRef::Agent(agent.id.clone()),
            ));
        }
    }
    issues
}

fn check_shapes(request: &AllocationRequest, schema: &MetricSchema) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for agent in &request.agents {
        for issue in schema.check_shape(agent.metrics.keys()) {
            let message = match issue {
                ShapeIssue::Missing(name) => {
                    format!("agent {} missing metric {name}", agent.id)
                }
                ShapeIssue::Unexpected(name) => {
                    format!("agent {} has unexpected metric {name}", agent.id)
                }
            };
            issues.push(ValidationIssue::error(
                "shape_mismatch",
                message,
                EntityRef::Agent(agent.id.clone()),
            ));
        }
    }
    issues
}

fn check_metric_values(request: &AllocationRequest) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for agent in &request.agents {
        for (name, &value) in &agent.metrics {
            if !value.is_finite() {
                issues.push(ValidationIssue::error(
                    "non_finite_metric",
                    format!("agent {} metric {name} is not finite: {value}", agent.id),
                    EntityRef::Agent(agent.id.clone()),
                ));
            } else if value < 0.0 {
                issues.push(ValidationIssue::warning(
                    "negative_metric",
                    format!("agent {} metric {name} is negative: {value}", agent.id),
                    EntityRef::Agent(agent.id.clone()),
                ));
            }
        }
    }
    issues
}

/// Deterministic sort (by code, then where, then message) for byte-identical runs.
fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.code
            .cmp(b.code)
            .then_with(|| a.where_.cmp(&b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}

fn finish(issues: Vec<ValidationIssue>) -> ValidationReport {
    ValidationReport {
        pass: !issues.iter().any(|i| i.severity == Severity::Error),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_core::entities::AgentRecord;

    fn m(s: &str) -> MetricName { s.parse().unwrap() }

    fn agent(id: &str, pairs: &[(&str, f64)]) -> AgentRecord {
        AgentRecord {
            id: id.parse().unwrap(),
            metrics: pairs.iter().map(|(k, v)| (m(k), *v)).collect(),
        }
    }

    fn request(kitty: i64, agents: Vec<AgentRecord>) -> AllocationRequest {
        AllocationRequest { kitty, agents }
    }

    fn codes(report: &ValidationReport) -> Vec<&'static str> {
        report.issues.iter().map(|i| i.code).collect()
    }

    #[test]
    fn valid_request_passes() {
        let req = request(100, vec![agent("a", &[("m", 1.0)]), agent("b", &[("m", 2.0)])]);
        let report = validate(&req, &BTreeSet::new());
        assert!(report.pass);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn empty_input_fails_fast() {
        let report = validate(&request(100, vec![]), &BTreeSet::new());
        assert!(!report.pass);
        assert_eq!(codes(&report), vec!["empty_input"]);
    }

    #[test]
    fn non_positive_kitty_is_an_error() {
        for kitty in [0, -10] {
            let req = request(kitty, vec![agent("a", &[("m", 1.0)])]);
            let report = validate(&req, &BTreeSet::new());
            assert!(!report.pass);
            assert!(codes(&report).contains(&"non_positive_kitty"));
        }
    }

    #[test]
    fn shape_mismatch_detected_both_ways() {
        let req = request(
            100,
            vec![
                agent("a", &[("m", 1.0), ("n", 2.0)]),
                agent("b", &[("m", 1.0), ("x", 3.0)]),
            ],
        );
        let report = validate(&req, &BTreeSet::new());
        assert!(!report.pass);
        let shape_issues: Vec<_> =
            report.issues.iter().filter(|i| i.code == "shape_mismatch").collect();
        assert_eq!(shape_issues.len(), 2); // missing "n", unexpected "x"
    }

    #[test]
    fn duplicate_agent_is_an_error() {
        let req = request(
            100,
            vec![agent("a", &[("m", 1.0)]), agent("a", &[("m", 2.0)])],
        );
        let report = validate(&req, &BTreeSet::new());
        assert!(codes(&report).contains(&"duplicate_agent"));
    }

    #[test]
    fn non_finite_metric_is_an_error_but_negative_is_a_warning() {
        let req = request(
            100,
            vec![
                agent("a", &[("m", f64::NAN)]),
                agent("b", &[("m", -1.0)]),
            ],
        );
        let report = validate(&req, &BTreeSet::new());
        assert!(!report.pass);
        assert!(codes(&report).contains(&"non_finite_metric"));
        assert!(codes(&report).contains(&"negative_metric"));

        // Warning alone does not fail the run.
        let req = request(100, vec![agent("a", &[("m", -1.0)]), agent("b", &[("m", 2.0)])]);
        let report = validate(&req, &BTreeSet::new());
        assert!(report.pass);
        assert_eq!(codes(&report), vec!["negative_metric"]);
    }
}
