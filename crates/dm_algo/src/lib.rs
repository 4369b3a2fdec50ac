// crates/dm_algo/src/lib.rs
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

// Core tokens and domains
pub use dm_core::{
    entities::AgentRecord,
    metrics::{MetricKind, MetricSchema},
    tokens::{AgentId, MetricName},
};

// ----------------------------- Canonical matrix rows -----------------------------

/// One agent's row of per-metric values (normalized or weighted, depending
/// on the stage). Keyed by `MetricName` for deterministic iteration.
pub type MetricRow = BTreeMap<MetricName, f64>;

/// A full agents × metrics matrix, keyed by `AgentId` (canonical order).
pub type Matrix = BTreeMap<AgentId, MetricRow>;

// ----------------------------- Scoring (public surface) ---------------------------

pub mod scoring {
    // File modules (actual implementations)
    pub mod normalize;
    pub mod weights;
    pub mod weighted;
    pub mod ideal;
    pub mod closeness;

    // Re-export entry points so callers don't reach into file modules.
    pub use closeness::closeness_scores;
    pub use ideal::{ideal_bounds, IdealPair};
    pub use normalize::normalize;
    pub use weighted::apply_weights;
    pub use weights::{entropy_weights, WeightVector};
}

// Convenience re-exports (pipeline imports these from crate root)
pub use scoring::{IdealPair, WeightVector};

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    // File modules (actual implementations)
    pub mod discount;

    pub use discount::{
        allocate_discounts, AllocError, AllocationOutcome, DiscountAllocation, Justification,
    };
}

pub use allocation::{AllocError, AllocationOutcome, DiscountAllocation, Justification};
