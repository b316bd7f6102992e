use core::fmt;

use serde::{Deserialize, Serialize};

use crate::api::Operation;

/// The category a constraint-generating operation is attributed to.
///
/// The set is closed and tracks the [`CircuitApi`](crate::CircuitApi)
/// surface: a new constraint-generating primitive needs a new kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Product of two non-constant values.
    Mul,
    /// Quotient of two values.
    Div,
    /// Multiplicative inverse.
    Inverse,
    /// Ordered comparison producing a bit.
    Cmp,
    /// Conditional selection between two values.
    Select,
    /// Table lookup indexed by bits.
    Lookup,
    /// Bit-width bound on a value.
    Range,
    /// Hash gadget invocation.
    Hash,
    /// `a == b` assertion.
    AssertIsEqual,
    /// `a != b` assertion.
    AssertIsDifferent,
    /// `a ∈ {0, 1}` assertion.
    AssertIsBoolean,
    /// `a <= b` assertion.
    AssertIsLessOrEqual,
}

impl ConstraintKind {
    /// Every kind, in declaration order.
    pub const ALL: [ConstraintKind; 12] = [
        ConstraintKind::Mul,
        ConstraintKind::Div,
        ConstraintKind::Inverse,
        ConstraintKind::Cmp,
        ConstraintKind::Select,
        ConstraintKind::Lookup,
        ConstraintKind::Range,
        ConstraintKind::Hash,
        ConstraintKind::AssertIsEqual,
        ConstraintKind::AssertIsDifferent,
        ConstraintKind::AssertIsBoolean,
        ConstraintKind::AssertIsLessOrEqual,
    ];

    /// Human readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            ConstraintKind::Mul => "Multiplication",
            ConstraintKind::Div => "Division",
            ConstraintKind::Inverse => "Inverse",
            ConstraintKind::Cmp => "Comparison",
            ConstraintKind::Select => "Select",
            ConstraintKind::Lookup => "Lookup",
            ConstraintKind::Range => "Range Check",
            ConstraintKind::Hash => "Hash",
            ConstraintKind::AssertIsEqual => "Assert Equal",
            ConstraintKind::AssertIsDifferent => "Assert Different",
            ConstraintKind::AssertIsBoolean => "Assert Boolean",
            ConstraintKind::AssertIsLessOrEqual => "Assert LessOrEqual",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded constraint-generating call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintObservation {
    /// The kind the call is attributed to.
    pub kind: ConstraintKind,
    /// The operation that was called.
    pub operation: Operation,
    /// Constraint units charged for the call.
    pub cost: usize,
}

impl ConstraintObservation {
    /// Name of the recorded operation.
    pub fn operation_name(&self) -> &'static str {
        self.operation.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let mut labels = ConstraintKind::ALL.map(ConstraintKind::label).to_vec();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), ConstraintKind::ALL.len());
    }

    #[test]
    fn observation_names_its_operation() {
        let observation = ConstraintObservation {
            kind: ConstraintKind::AssertIsBoolean,
            operation: Operation::AssertIsBoolean,
            cost: 1,
        };
        assert_eq!(observation.operation_name(), "AssertIsBoolean");
        assert_eq!(observation.kind.to_string(), "Assert Boolean");
    }
}
