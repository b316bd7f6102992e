use core::fmt;

use serde::Serialize;

use crate::kind::{ConstraintKind, ConstraintObservation};

/// Insertion-ordered map used for per-kind counts.
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, foldhash::fast::RandomState>;

/// The accumulator for one analysis run.
///
/// The only way to change the counts is [`ConstraintStats::record`], which
/// keeps `total_constraints`, the per-kind counts, and the log in step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConstraintStats {
    total_constraints: usize,
    by_kind: IndexMap<ConstraintKind, usize>,
    log: Vec<ConstraintObservation>,
}

impl ConstraintStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observation` to the log and charge its cost.
    pub fn record(&mut self, observation: ConstraintObservation) {
        self.total_constraints += observation.cost;
        *self.by_kind.entry(observation.kind).or_insert(0) += observation.cost;
        self.log.push(observation);
    }

    /// Sum of the cost of every recorded observation.
    #[inline]
    pub fn total_constraints(&self) -> usize {
        self.total_constraints
    }

    /// Constraints attributed to `kind`; zero when the kind was never seen.
    #[inline]
    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Per-kind counts in first-observed order.
    pub fn by_kind(&self) -> impl ExactSizeIterator<Item = (ConstraintKind, usize)> + '_ {
        self.by_kind.iter().map(|(kind, count)| (*kind, *count))
    }

    /// Recorded observations in call order.
    #[inline]
    pub fn log(&self) -> &[ConstraintObservation] {
        &self.log
    }

    /// Returns `true` when nothing was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Check that the total, the per-kind counts and the log agree.
    pub fn check_invariant(&self) -> Result<(), InvariantViolation> {
        let by_kind_sum = self.by_kind.values().sum();
        let log_cost_sum = self.log.iter().map(|o| o.cost).sum();
        if self.total_constraints == by_kind_sum && self.total_constraints == log_cost_sum {
            Ok(())
        } else {
            Err(InvariantViolation {
                total: self.total_constraints,
                by_kind_sum,
                log_cost_sum,
            })
        }
    }
}

/// The per-kind counts of a [`ConstraintStats`] disagree with its total.
///
/// This can only come from a bookkeeping bug in the instrumentation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvariantViolation {
    /// The recorded total.
    pub total: usize,
    /// Sum over the per-kind counts.
    pub by_kind_sum: usize,
    /// Sum of the cost of every logged observation.
    pub log_cost_sum: usize,
}

impl std::error::Error for InvariantViolation {}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "constraint bookkeeping is inconsistent: total {} but per-kind sum {} and log sum {}",
            self.total, self.by_kind_sum, self.log_cost_sum
        )
    }
}
