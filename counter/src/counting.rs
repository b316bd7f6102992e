//! A [`CircuitApi`] that forwards every call to another implementation and
//! records the calls its [`CostModel`] charges for.
//!
//! The proxy never looks at operand values and never alters the result of a
//! forwarded call. A call is recorded only after the wrapped implementation
//! returned successfully; errors are handed back untouched.

use ark_ff::PrimeField;
use ark_relations::r1cs::SynthesisError;
use tracing::debug;

use crate::{
    api::{CircuitApi, Operation},
    cost::CostModel,
    kind::ConstraintObservation,
    stats::ConstraintStats,
};

/// The instrumentation proxy.
///
/// Borrows the wrapped API, the cost model and the run's accumulator for its
/// whole lifetime, so one proxy can only ever feed one set of statistics.
pub struct CountingApi<'a, A> {
    inner: &'a mut A,
    cost_model: &'a CostModel,
    stats: &'a mut ConstraintStats,
}

impl<'a, A> CountingApi<'a, A> {
    /// Wrap `inner`, charging calls per `cost_model` into `stats`.
    pub fn new(
        inner: &'a mut A,
        cost_model: &'a CostModel,
        stats: &'a mut ConstraintStats,
    ) -> Self {
        Self {
            inner,
            cost_model,
            stats,
        }
    }

    /// The statistics recorded so far.
    pub fn stats(&self) -> &ConstraintStats {
        self.stats
    }

    fn record(&mut self, operation: Operation) {
        if let Some(rule) = self.cost_model.charge(operation) {
            debug!(
                target: "constraint_counter",
                %operation,
                kind = %rule.kind,
                cost = rule.cost,
                "recorded constraint"
            );
            self.stats.record(ConstraintObservation {
                kind: rule.kind,
                operation,
                cost: rule.cost,
            });
        }
    }

    fn forward<T>(
        &mut self,
        operation: Operation,
        result: Result<T, SynthesisError>,
    ) -> Result<T, SynthesisError> {
        let value = result?;
        self.record(operation);
        Ok(value)
    }
}

impl<'a, F: PrimeField, A: CircuitApi<F>> CircuitApi<F> for CountingApi<'a, A> {
    type Var = A::Var;

    fn public_input(&mut self, value: Option<F>) -> Result<A::Var, SynthesisError> {
        self.inner.public_input(value)
    }

    fn secret_input(&mut self, value: Option<F>) -> Result<A::Var, SynthesisError> {
        self.inner.secret_input(value)
    }

    fn constant(&mut self, value: F) -> A::Var {
        self.inner.constant(value)
    }

    fn add(&mut self, a: &A::Var, b: &A::Var) -> A::Var {
        self.inner.add(a, b)
    }

    fn sub(&mut self, a: &A::Var, b: &A::Var) -> A::Var {
        self.inner.sub(a, b)
    }

    fn neg(&mut self, a: &A::Var) -> A::Var {
        self.inner.neg(a)
    }

    fn mul(&mut self, a: &A::Var, b: &A::Var) -> Result<A::Var, SynthesisError> {
        let result = self.inner.mul(a, b);
        self.forward(Operation::Mul, result)
    }

    fn div(&mut self, a: &A::Var, b: &A::Var) -> Result<A::Var, SynthesisError> {
        let result = self.inner.div(a, b);
        self.forward(Operation::Div, result)
    }

    fn inverse(&mut self, a: &A::Var) -> Result<A::Var, SynthesisError> {
        let result = self.inner.inverse(a);
        self.forward(Operation::Inverse, result)
    }

    fn select(
        &mut self,
        cond: &A::Var,
        a: &A::Var,
        b: &A::Var,
    ) -> Result<A::Var, SynthesisError> {
        let result = self.inner.select(cond, a, b);
        self.forward(Operation::Select, result)
    }

    fn lookup2(
        &mut self,
        b0: &A::Var,
        b1: &A::Var,
        table: [&A::Var; 4],
    ) -> Result<A::Var, SynthesisError> {
        let result = self.inner.lookup2(b0, b1, table);
        self.forward(Operation::Lookup2, result)
    }

    fn is_less(&mut self, a: &A::Var, b: &A::Var) -> Result<A::Var, SynthesisError> {
        let result = self.inner.is_less(a, b);
        self.forward(Operation::IsLess, result)
    }

    fn range_check(&mut self, a: &A::Var, bits: usize) -> Result<(), SynthesisError> {
        let result = self.inner.range_check(a, bits);
        self.forward(Operation::RangeCheck, result)
    }

    fn assert_is_equal(&mut self, a: &A::Var, b: &A::Var) -> Result<(), SynthesisError> {
        let result = self.inner.assert_is_equal(a, b);
        self.forward(Operation::AssertIsEqual, result)
    }

    fn assert_is_different(&mut self, a: &A::Var, b: &A::Var) -> Result<(), SynthesisError> {
        let result = self.inner.assert_is_different(a, b);
        self.forward(Operation::AssertIsDifferent, result)
    }

    fn assert_is_boolean(&mut self, a: &A::Var) -> Result<(), SynthesisError> {
        let result = self.inner.assert_is_boolean(a);
        self.forward(Operation::AssertIsBoolean, result)
    }

    fn assert_is_less_or_equal(
        &mut self,
        a: &A::Var,
        bound: &A::Var,
    ) -> Result<(), SynthesisError> {
        let result = self.inner.assert_is_less_or_equal(a, bound);
        self.forward(Operation::AssertIsLessOrEqual, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::{R1csBuilder, Wire},
        kind::ConstraintKind,
    };
    use ark_ff::{One, Zero};
    use ark_relations::r1cs::ConstraintSystem;
    use ark_test_curves::bls12_381::Fr;

    fn builder() -> R1csBuilder<Fr> {
        R1csBuilder::new(ConstraintSystem::<Fr>::new_ref())
    }

    fn input<A: CircuitApi<Fr>>(api: &mut A, value: u64) -> A::Var {
        api.secret_input(Some(Fr::from(value))).unwrap()
    }

    #[test]
    fn linear_operations_are_never_recorded() {
        let mut inner = builder();
        let model = CostModel::r1cs();
        let mut stats = ConstraintStats::new();
        let mut api = CountingApi::new(&mut inner, &model, &mut stats);

        let mut acc = input(&mut api, 1);
        let x = input(&mut api, 2);
        for _ in 0..100 {
            acc = api.add(&acc, &x);
            acc = api.sub(&acc, &x);
            acc = api.neg(&acc);
        }
        assert!(api.stats().is_empty());
        assert_eq!(stats.total_constraints(), 0);
        assert_eq!(stats.by_kind().len(), 0);
    }

    #[test]
    fn n_multiplications_count_n() {
        for n in [0usize, 1, 7, 32] {
            let mut inner = builder();
            let model = CostModel::r1cs();
            let mut stats = ConstraintStats::new();
            let mut api = CountingApi::new(&mut inner, &model, &mut stats);

            let x = input(&mut api, 3);
            let mut acc = input(&mut api, 1);
            for _ in 0..n {
                acc = api.mul(&acc, &x).unwrap();
            }
            assert_eq!(stats.count(ConstraintKind::Mul), n);
            assert_eq!(stats.total_constraints(), n);
            assert_eq!(stats.log().len(), n);
            assert!(stats.check_invariant().is_ok());
        }
    }

    #[test]
    fn results_match_the_wrapped_builder() {
        let mut plain = builder();
        let a = input(&mut plain, 6);
        let b = input(&mut plain, 3);
        let expected: Wire<Fr> = plain.div(&a, &b).unwrap();

        let mut inner = builder();
        let model = CostModel::r1cs();
        let mut stats = ConstraintStats::new();
        let mut api = CountingApi::new(&mut inner, &model, &mut stats);
        let a = input(&mut api, 6);
        let b = input(&mut api, 3);
        let quotient = api.div(&a, &b).unwrap();

        assert_eq!(quotient.value(), expected.value());
        assert_eq!(quotient.lc(), expected.lc());
        assert_eq!(stats.count(ConstraintKind::Div), 1);
        assert_eq!(inner.cs().num_constraints(), plain.cs().num_constraints());
    }

    #[test]
    fn every_charged_operation_is_attributed() {
        let mut inner = builder();
        let model = CostModel::r1cs();
        let mut stats = ConstraintStats::new();
        let mut api = CountingApi::new(&mut inner, &model, &mut stats);

        let zero = input(&mut api, 0);
        let one = input(&mut api, 1);
        let five = input(&mut api, 5);
        api.mul(&five, &five).unwrap();
        api.div(&five, &one).unwrap();
        api.inverse(&five).unwrap();
        api.select(&one, &five, &zero).unwrap();
        api.lookup2(&one, &zero, [&zero, &one, &five, &five]).unwrap();
        api.is_less(&one, &five).unwrap();
        api.range_check(&five, 3).unwrap();
        api.assert_is_equal(&five, &five).unwrap();
        api.assert_is_different(&one, &five).unwrap();
        api.assert_is_boolean(&one).unwrap();
        api.assert_is_less_or_equal(&one, &five).unwrap();

        let operations: Vec<_> = stats.log().iter().map(|o| o.operation).collect();
        assert_eq!(
            operations,
            vec![
                Operation::Mul,
                Operation::Div,
                Operation::Inverse,
                Operation::Select,
                Operation::Lookup2,
                Operation::IsLess,
                Operation::RangeCheck,
                Operation::AssertIsDifferent,
                Operation::AssertIsBoolean,
                Operation::AssertIsLessOrEqual,
            ]
        );
        assert_eq!(stats.count(ConstraintKind::AssertIsEqual), 0);
        assert_eq!(stats.total_constraints(), 10);
        assert!(stats.check_invariant().is_ok());
    }

    #[test]
    fn engine_errors_pass_through_unrecorded() {
        let mut inner = builder();
        let model = CostModel::r1cs();
        let mut stats = ConstraintStats::new();
        let mut api = CountingApi::new(&mut inner, &model, &mut stats);

        let x = input(&mut api, 4);
        let zero = api.constant(Fr::zero());
        assert_eq!(api.div(&x, &zero).unwrap_err(), SynthesisError::DivisionByZero);
        let one = api.constant(Fr::one());
        assert_eq!(
            api.assert_is_equal(&one, &zero).unwrap_err(),
            SynthesisError::Unsatisfiable
        );
        assert!(stats.is_empty());
    }

    #[test]
    fn models_naming_linear_operations_still_record_nothing() {
        let mut model = CostModel::r1cs();
        for op in [Operation::Add, Operation::Sub, Operation::Neg] {
            model.rules.insert(
                op,
                crate::cost::CostRule {
                    kind: ConstraintKind::Mul,
                    cost: 1,
                },
            );
        }
        let mut inner = builder();
        let mut stats = ConstraintStats::new();
        let mut api = CountingApi::new(&mut inner, &model, &mut stats);
        let x = input(&mut api, 4);
        let y = api.add(&x, &x);
        let z = api.sub(&y, &x);
        let w = api.neg(&z);
        assert_eq!(w.value(), Some(-Fr::from(4u8)));
        assert!(stats.is_empty());
        assert_eq!(inner.cs().num_constraints(), 0);
    }

    #[test]
    fn custom_models_change_attribution_only() {
        let mut model = CostModel::r1cs();
        model.rules.insert(
            Operation::Lookup2,
            crate::cost::CostRule {
                kind: ConstraintKind::Hash,
                cost: 3,
            },
        );
        let mut inner = builder();
        let mut stats = ConstraintStats::new();
        let mut api = CountingApi::new(&mut inner, &model, &mut stats);
        let table: Vec<_> = [5u8, 6, 7, 9]
            .into_iter()
            .map(|v| api.constant(Fr::from(v)))
            .collect();
        let bit = input(&mut api, 1);
        let r = api
            .lookup2(&bit, &bit, [&table[0], &table[1], &table[2], &table[3]])
            .unwrap();
        assert_eq!(r.value(), Some(Fr::from(9u8)));
        assert_eq!(stats.count(ConstraintKind::Hash), 3);
        assert_eq!(stats.count(ConstraintKind::Lookup), 0);
        inner.flush().unwrap();
        assert_eq!(inner.cs().num_constraints(), 1);
    }
}
