//! Discount apportionment: closeness scores → integer discounts summing
//! exactly to the kitty, plus a justification tier per agent.
//!
//! Contract:
//! - rawShare = (closeness / Σ closeness) × kitty.
//! - assigned = max(round(rawShare), min_discount); rounding policy is
//!   round-half-away-from-zero (`f64::round`), tested explicitly.
//! - remainder = kitty − Σ assigned is added wholesale to the **last agent
//!   in canonical (id-ascending) order**. Kept verbatim from the reference
//!   behavior; a largest-remainder redistribution would change outputs.
//! - Σ closeness == 0 ⇒ equal-split fallback (flagged for logging), never
//!   a NaN share.
//! - Justification tier from the agent's own closeness, independent of the
//!   remainder correction: ≥0.8 high, ≥0.5 moderate, else needs support.
//!
//! Determinism: input is a `BTreeMap`, so "last agent" is well-defined.

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;

use dm_core::tokens::AgentId;

/// Justification tiers attached to each allocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Justification {
    HighPerformance,
    ModeratePerformance,
    NeedsImprovement,
}

impl Justification {
    /// Tier boundaries are inclusive on the lower bound.
    pub fn from_closeness(score: f64) -> Self {
        if score >= 0.8 {
            Justification::HighPerformance
        } else if score >= 0.5 {
            Justification::ModeratePerformance
        } else {
            Justification::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Justification::HighPerformance => {
                "Consistently high performance and long-term contribution"
            }
            Justification::ModeratePerformance => "Moderate performance with potential for growth",
            Justification::NeedsImprovement => "Needs support and improvement",
        }
    }
}

impl fmt::Display for Justification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent's final allocation.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscountAllocation {
    pub id: AgentId,
    /// Signed: the remainder correction may push the last agent below the
    /// minimum when the kitty is barely above `n × min_discount`.
    pub assigned_discount: i64,
    pub justification: Justification,
}

/// Full apportionment result, in canonical (id-ascending) order.
#[derive(Clone, Debug, PartialEq)]
pub struct AllocationOutcome {
    pub allocations: Vec<DiscountAllocation>,
    /// True when Σ closeness was 0 and the kitty was split equally instead.
    pub equal_split_fallback: bool,
}

#[derive(Debug, Eq, PartialEq)]
pub enum AllocError {
    /// No agents to allocate to while the kitty is positive.
    NoEligibleAgents,
    /// kitty ≤ 0: per-agent allocation is meaningless and is rejected.
    NonPositiveKitty { kitty: i64 },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::NoEligibleAgents => write!(f, "no eligible agents"),
            AllocError::NonPositiveKitty { kitty } => {
                write!(f, "non-positive kitty: {kitty}")
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Apportion `kitty` across agents by closeness share.
///
/// The final sum is forced to equal `kitty` exactly by adding the rounding
/// remainder to the last agent in canonical order.
pub fn allocate_discounts(
    kitty: i64,
    closeness: &BTreeMap<AgentId, f64>,
    min_discount: u32,
) -> Result<AllocationOutcome, AllocError> {
    if kitty <= 0 {
        return Err(AllocError::NonPositiveKitty { kitty });
    }
    if closeness.is_empty() {
        return Err(AllocError::NoEligibleAgents);
    }

    let total: f64 = closeness.values().sum();
    let equal_split_fallback = total <= 0.0;
    let n = closeness.len() as f64;

    let mut allocations: Vec<DiscountAllocation> = closeness
        .iter()
        .map(|(id, &score)| {
            let raw_share = if equal_split_fallback {
                kitty as f64 / n
            } else {
                (score / total) * kitty as f64
            };
            let assigned = (raw_share.round() as i64).max(min_discount as i64);
            DiscountAllocation {
                id: id.clone(),
                assigned_discount: assigned,
                justification: Justification::from_closeness(score),
            }
        })
        .collect();

    let assigned_total: i64 = allocations.iter().map(|a| a.assigned_discount).sum();
    let remainder = kitty - assigned_total;
    if let Some(last) = allocations.last_mut() {
        last.assigned_discount += remainder;
    }

    let sum: i64 = allocations.iter().map(|a| a.assigned_discount).sum();
    debug_assert_eq!(sum, kitty);
    Ok(AllocationOutcome {
        allocations,
        equal_split_fallback,
    })
}
