//! End-to-end scenarios over the full pipeline (request → allocations).

use std::collections::BTreeSet;

use dm_io::request::parse_request;
use dm_pipeline::{build_report, run_with_request, EngineConfig, PipelineError};

fn config_no_cost() -> EngineConfig {
    EngineConfig {
        cost_metrics: BTreeSet::new(),
        min_discount: 1,
    }
}

fn total(outputs: &dm_pipeline::PipelineOutputs) -> i64 {
    outputs.allocations.iter().map(|a| a.assigned_discount).sum()
}

#[test]
fn scenario_dominant_agent_gets_strictly_more() {
    // Two agents, one benefit metric; kitty 100.
    let req = parse_request(
        r#"{ "siteKitty": 100, "salesAgents": [
            { "id": 1, "m": 10 },
            { "id": 2, "m": 0 }
        ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &config_no_cost()).unwrap();
    assert_eq!(total(&outputs), 100);
    let a1 = &outputs.allocations[0];
    let a2 = &outputs.allocations[1];
    assert_eq!(a1.id.as_str(), "1");
    assert!(a1.assigned_discount > a2.assigned_discount);
}

#[test]
fn scenario_uniform_agents_split_evenly() {
    // Identical agents score the neutral 0.5 and split the kitty evenly.
    let req = parse_request(
        r#"{ "siteKitty": 30, "salesAgents": [
            { "id": "a", "m": 7 },
            { "id": "b", "m": 7 },
            { "id": "c", "m": 7 }
        ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &config_no_cost()).unwrap();
    assert_eq!(total(&outputs), 30);
    for a in &outputs.allocations {
        assert_eq!(a.assigned_discount, 10);
        assert_eq!(
            a.justification.as_str(),
            "Moderate performance with potential for growth"
        );
    }
}

#[test]
fn scenario_single_agent_takes_full_kitty() {
    let req = parse_request(
        r#"{ "siteKitty": 50, "salesAgents": [ { "id": "solo", "m": 3, "n": 9 } ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &config_no_cost()).unwrap();
    assert_eq!(outputs.allocations.len(), 1);
    assert_eq!(outputs.allocations[0].assigned_discount, 50);
    // Single agent ⇒ entropy carries no signal ⇒ equal-weight fallback.
    assert!(outputs.weights.is_degenerate());
}

#[test]
fn scenario_cost_metric_favors_the_lower_value() {
    // lateDeliveries is a cost metric via the default config.
    let req = parse_request(
        r#"{ "siteKitty": 100, "salesAgents": [
            { "id": "a", "lateDeliveries": 1 },
            { "id": "b", "lateDeliveries": 100 }
        ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &EngineConfig::default()).unwrap();
    assert_eq!(total(&outputs), 100);
    let a = &outputs.allocations[0];
    let b = &outputs.allocations[1];
    assert_eq!(a.id.as_str(), "a");
    assert!(a.assigned_discount > b.assigned_discount);
}

#[test]
fn negative_cost_metric_keeps_weights_and_scores_finite() {
    // Negative values only warn, so this request reaches the stage chain;
    // a cost metric whose max is 0 must not leak inf/NaN into the weights.
    let req = parse_request(
        r#"{ "siteKitty": 100, "salesAgents": [
            { "id": "a", "lateDeliveries": -1, "sales": 10 },
            { "id": "b", "lateDeliveries": 0,  "sales": 5 }
        ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &EngineConfig::default()).unwrap();
    let sum: f64 = outputs.weights.iter().map(|(_, w)| w).sum();
    assert!(sum.is_finite(), "weight sum is not finite: {sum}");
    assert!((sum - 1.0).abs() < 1e-9);
    for (_, score) in &outputs.closeness {
        assert!(score.is_finite());
    }
    assert_eq!(total(&outputs), 100);
}

#[test]
fn scenario_non_positive_kitty_is_rejected() {
    for kitty in ["0", "-20"] {
        let req = parse_request(&format!(
            r#"{{ "siteKitty": {kitty}, "salesAgents": [ {{ "id": "a", "m": 1 }} ] }}"#
        ))
        .unwrap();
        match run_with_request(&req, &config_no_cost()) {
            Err(PipelineError::Validate(report)) => {
                assert!(report.issues.iter().any(|i| i.code == "non_positive_kitty"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}

#[test]
fn scenario_empty_input_is_rejected() {
    let req = parse_request(r#"{ "siteKitty": 100, "salesAgents": [] }"#).unwrap();
    match run_with_request(&req, &config_no_cost()) {
        Err(PipelineError::Validate(report)) => {
            assert!(report.issues.iter().any(|i| i.code == "empty_input"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn scenario_ragged_matrix_is_rejected_before_any_stage() {
    let req = parse_request(
        r#"{ "siteKitty": 100, "salesAgents": [
            { "id": "a", "m": 1, "n": 2 },
            { "id": "b", "m": 1 }
        ] }"#,
    )
    .unwrap();
    match run_with_request(&req, &config_no_cost()) {
        Err(PipelineError::Validate(report)) => {
            assert!(report.issues.iter().any(|i| i.code == "shape_mismatch"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn weights_sum_to_one_on_the_wire_path() {
    let req = parse_request(
        r#"{ "siteKitty": 500, "salesAgents": [
            { "id": "a", "sales": 120, "satisfaction": 4.5 },
            { "id": "b", "sales": 90,  "satisfaction": 4.9 },
            { "id": "c", "sales": 150, "satisfaction": 3.1 }
        ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &config_no_cost()).unwrap();
    let sum: f64 = outputs.weights.iter().map(|(_, w)| w).sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert_eq!(total(&outputs), 500);
}

#[test]
fn run_from_request_path_loads_and_allocates() {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"{{ "siteKitty": 60, "salesAgents": [
            {{ "id": "a", "m": 2 }},
            {{ "id": "b", "m": 1 }}
        ] }}"#
    )
    .unwrap();
    let outputs = dm_pipeline::run_from_request_path(f.path(), &config_no_cost()).unwrap();
    assert_eq!(total(&outputs), 60);
}

#[test]
fn report_projection_keeps_canonical_order_and_tier_strings() {
    let req = parse_request(
        r#"{ "siteKitty": 100, "salesAgents": [
            { "id": "b", "m": 0 },
            { "id": "a", "m": 10 }
        ] }"#,
    )
    .unwrap();
    let outputs = run_with_request(&req, &config_no_cost()).unwrap();
    let report = build_report(&outputs);
    assert_eq!(report.allocations[0].id, "a");
    assert_eq!(report.allocations[1].id, "b");
    assert_eq!(
        report.allocations[0].justification,
        "Consistently high performance and long-term contribution"
    );
    assert_eq!(
        report.allocations[1].justification,
        "Needs support and improvement"
    );
}
