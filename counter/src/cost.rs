use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{api::Operation, kind::ConstraintKind};

/// What one call to an operation is charged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRule {
    /// Kind the call is attributed to.
    pub kind: ConstraintKind,
    /// Constraint units per call. A zero cost means the call is not recorded.
    pub cost: usize,
}

/// Maps each operation of the [`CircuitApi`](crate::CircuitApi) surface to
/// the constraint kind and cost it is charged under a given arithmetization.
///
/// Operations without a rule are forwarded without being recorded. Linear
/// operations are never charged; a serialized model naming one is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCostModel")]
pub struct CostModel {
    /// Name of the arithmetization the model describes.
    pub name: String,
    /// Charged operations.
    pub rules: BTreeMap<Operation, CostRule>,
}

#[derive(Deserialize)]
struct RawCostModel {
    name: String,
    rules: BTreeMap<Operation, CostRule>,
}

/// A cost model charges a linear operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LinearRuleError(pub Operation);

impl std::error::Error for LinearRuleError {}

impl fmt::Display for LinearRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear operation `{}` cannot be charged", self.0)
    }
}

impl TryFrom<RawCostModel> for CostModel {
    type Error = LinearRuleError;

    fn try_from(raw: RawCostModel) -> Result<Self, Self::Error> {
        if let Some(&operation) = raw.rules.keys().find(|op| op.is_linear()) {
            return Err(LinearRuleError(operation));
        }
        Ok(Self {
            name: raw.name,
            rules: raw.rules,
        })
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::r1cs()
    }
}

impl CostModel {
    /// The rank-1 cost model: linear operations are free, every
    /// multiplicative operation and every non-linear assertion costs one
    /// constraint. Equality against a linear combination folds into an
    /// existing row, so `AssertIsEqual` costs nothing.
    pub fn r1cs() -> Self {
        use ConstraintKind as K;
        use Operation as Op;

        let rules = [
            (Op::Mul, K::Mul, 1),
            (Op::Div, K::Div, 1),
            (Op::Inverse, K::Inverse, 1),
            (Op::Select, K::Select, 1),
            (Op::Lookup2, K::Lookup, 1),
            (Op::IsLess, K::Cmp, 1),
            (Op::RangeCheck, K::Range, 1),
            (Op::AssertIsEqual, K::AssertIsEqual, 0),
            (Op::AssertIsDifferent, K::AssertIsDifferent, 1),
            (Op::AssertIsBoolean, K::AssertIsBoolean, 1),
            (Op::AssertIsLessOrEqual, K::AssertIsLessOrEqual, 1),
        ]
        .into_iter()
        .map(|(op, kind, cost)| (op, CostRule { kind, cost }))
        .collect();

        Self {
            name: "r1cs".to_string(),
            rules,
        }
    }

    /// The rule charged for `operation`, if any.
    #[inline]
    pub fn rule(&self, operation: Operation) -> Option<CostRule> {
        self.rules.get(&operation).copied()
    }

    /// The rule for `operation` when it must be recorded, i.e. when it exists,
    /// has a non-zero cost and `operation` is not linear.
    #[inline]
    pub fn charge(&self, operation: Operation) -> Option<CostRule> {
        if operation.is_linear() {
            return None;
        }
        self.rule(operation).filter(|rule| rule.cost > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn r1cs_table() {
        let model = CostModel::r1cs();
        for op in [Operation::Add, Operation::Sub, Operation::Neg] {
            assert_eq!(model.rule(op), None);
        }
        assert_eq!(
            model.rule(Operation::AssertIsEqual),
            Some(CostRule {
                kind: ConstraintKind::AssertIsEqual,
                cost: 0
            })
        );
        assert_eq!(model.charge(Operation::AssertIsEqual), None);

        let expected = [
            (Operation::Mul, ConstraintKind::Mul),
            (Operation::Div, ConstraintKind::Div),
            (Operation::Inverse, ConstraintKind::Inverse),
            (Operation::Select, ConstraintKind::Select),
            (Operation::Lookup2, ConstraintKind::Lookup),
            (Operation::AssertIsDifferent, ConstraintKind::AssertIsDifferent),
            (Operation::AssertIsBoolean, ConstraintKind::AssertIsBoolean),
            (Operation::AssertIsLessOrEqual, ConstraintKind::AssertIsLessOrEqual),
        ];
        for (op, kind) in expected {
            assert_eq!(model.charge(op), Some(CostRule { kind, cost: 1 }), "{op}");
        }
    }

    #[test]
    fn loads_from_json() {
        let json = r#"{
            "name": "weighted",
            "rules": {
                "Mul": { "kind": "Mul", "cost": 1 },
                "Lookup2": { "kind": "Lookup", "cost": 3 }
            }
        }"#;
        let model: CostModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.name, "weighted");
        assert_eq!(model.charge(Operation::Lookup2).map(|r| r.cost), Some(3));
        assert_eq!(model.charge(Operation::Div), None);
    }

    #[test]
    fn linear_operations_are_never_charged() {
        let json = r#"{
            "name": "broken",
            "rules": { "Add": { "kind": "Mul", "cost": 1 } }
        }"#;
        let error = serde_json::from_str::<CostModel>(json).unwrap_err();
        assert!(error.to_string().contains("linear operation `Add`"));

        let mut model = CostModel::r1cs();
        for op in [Operation::Add, Operation::Sub, Operation::Neg] {
            model.rules.insert(
                op,
                CostRule {
                    kind: ConstraintKind::Mul,
                    cost: 1,
                },
            );
            assert!(model.rule(op).is_some());
            assert_eq!(model.charge(op), None);
        }
    }
}
