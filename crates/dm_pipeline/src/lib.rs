//! dm_pipeline — deterministic pipeline surface
//! (load → validate → normalize → weigh → weight-apply → ideal → rank → allocate).
//!
//! This crate stays I/O-free apart from delegating JSON loading/writing to
//! `dm_io`; all math lives in `dm_algo`. Each stage is a pure function of
//! the prior stage's full output; nothing here mutates shared state, so
//! every stage is independently testable.
//!
//! Numeric degeneracies (equal-weight fallback, zero total closeness) are
//! recovered inside `dm_algo` with documented fallback values; this layer
//! surfaces them as `tracing` warn events because they usually indicate a
//! modeling problem in the input data, not a bug.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use dm_algo::{
    allocation::discount::allocate_discounts,
    scoring::{apply_weights, closeness_scores, entropy_weights, ideal_bounds, normalize},
    AgentId, AllocError, DiscountAllocation, MetricName, MetricSchema, WeightVector,
};
use dm_io::report::{AllocationLine, AllocationReport};
use dm_io::request::{self, AllocationRequest};

pub mod validate;

pub use validate::{EntityRef, Severity, ValidationIssue, ValidationReport};

/// The two scalar knobs of the engine, plus the cost-metric classification
/// list consumed by the normalizer. Injectable so the scoring engine stays
/// reusable across metric schemas; unlisted metrics default to benefit.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub cost_metrics: BTreeSet<MetricName>,
    pub min_discount: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Default classification list from the upstream producer.
            cost_metrics: ["lateDeliveries".parse().expect("static token")]
                .into_iter()
                .collect(),
            min_discount: 1,
        }
    }
}

/// Top-level pipeline outputs: final allocations plus the intermediate
/// aggregates worth auditing (weights, closeness, fallback flags).
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    /// Canonical (id-ascending) order.
    pub allocations: Vec<DiscountAllocation>,
    pub closeness: BTreeMap<AgentId, f64>,
    pub weights: WeightVector,
    /// Σ closeness was 0 and the kitty was split equally.
    pub equal_split_fallback: bool,
}

/// Single error surface for the pipeline orchestration.
#[derive(Debug)]
pub enum PipelineError {
    Io(String),
    /// Structural/input validation failed; the full report is preserved.
    Validate(ValidationReport),
    Schema(String),
    Allocate(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Io(m) => write!(f, "io: {m}"),
            PipelineError::Validate(report) => {
                write!(f, "validation failed:")?;
                for issue in &report.issues {
                    write!(f, " [{}] {};", issue.code, issue.message)?;
                }
                Ok(())
            }
            PipelineError::Schema(m) => write!(f, "schema: {m}"),
            PipelineError::Allocate(m) => write!(f, "allocate: {m}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<dm_io::IoError> for PipelineError {
    fn from(e: dm_io::IoError) -> Self {
        PipelineError::Io(e.to_string())
    }
}

impl From<AllocError> for PipelineError {
    fn from(e: AllocError) -> Self {
        PipelineError::Allocate(e.to_string())
    }
}

// -------------------------------------- Public API --------------------------------------

/// Orchestrate the pipeline over an already-loaded request.
///
/// Validation runs first and aborts the whole computation on any
/// Error-severity finding, before any stage executes.
pub fn run_with_request(
    request: &AllocationRequest,
    config: &EngineConfig,
) -> Result<PipelineOutputs, PipelineError> {
    let report = validate::validate(request, &config.cost_metrics);
    if !report.pass {
        return Err(PipelineError::Validate(report));
    }

    let schema = MetricSchema::from_metric_names(request.agents[0].metrics.keys(), &config.cost_metrics)
        .map_err(|e| PipelineError::Schema(e.to_string()))?;

    // Stage chain: each output is a fresh derived dataset.
    let normalized = normalize(&request.agents, &schema);
    let weights = entropy_weights(&normalized, &schema);
    if weights.is_degenerate() {
        tracing::warn!(
            agents = request.agents.len(),
            metrics = schema.len(),
            "entropy weighting degenerate; falling back to equal weights"
        );
    }
    let weighted = apply_weights(&normalized, &weights, &schema);
    let bounds = ideal_bounds(&weighted, &schema);
    let closeness = closeness_scores(&weighted, &bounds, &schema);

    let outcome = allocate_discounts(request.kitty, &closeness, config.min_discount)?;
    if outcome.equal_split_fallback {
        tracing::warn!(
            kitty = request.kitty,
            "total closeness is zero; splitting kitty equally"
        );
    }

    tracing::debug!(
        agents = request.agents.len(),
        kitty = request.kitty,
        "allocation complete"
    );

    Ok(PipelineOutputs {
        allocations: outcome.allocations,
        closeness,
        weights,
        equal_split_fallback: outcome.equal_split_fallback,
    })
}

/// Convenience entry: load the request JSON from a local path, then run.
pub fn run_from_request_path<P: AsRef<Path>>(
    path: P,
    config: &EngineConfig,
) -> Result<PipelineOutputs, PipelineError> {
    let request = request::load_request_from_path(path)?;
    run_with_request(&request, config)
}

/// Project pipeline outputs onto the wire-facing report document.
pub fn build_report(outputs: &PipelineOutputs) -> AllocationReport {
    AllocationReport {
        allocations: outputs
            .allocations
            .iter()
            .map(|a| AllocationLine {
                id: a.id.to_string(),
                assigned_discount: a.assigned_discount,
                justification: a.justification.as_str().to_string(),
            })
            .collect(),
    }
}
