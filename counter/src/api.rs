use core::fmt;

use ark_ff::PrimeField;
use ark_relations::r1cs::SynthesisError;
use serde::{Deserialize, Serialize};

/// Every method of the [`CircuitApi`] surface that manipulates values.
///
/// Allocation (`public_input`, `secret_input`, `constant`) is not listed: it
/// never emits constraints under any arithmetization.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// [`CircuitApi::add`]
    Add,
    /// [`CircuitApi::sub`]
    Sub,
    /// [`CircuitApi::neg`]
    Neg,
    /// [`CircuitApi::mul`]
    Mul,
    /// [`CircuitApi::div`]
    Div,
    /// [`CircuitApi::inverse`]
    Inverse,
    /// [`CircuitApi::select`]
    Select,
    /// [`CircuitApi::lookup2`]
    Lookup2,
    /// [`CircuitApi::is_less`]
    IsLess,
    /// [`CircuitApi::range_check`]
    RangeCheck,
    /// [`CircuitApi::assert_is_equal`]
    AssertIsEqual,
    /// [`CircuitApi::assert_is_different`]
    AssertIsDifferent,
    /// [`CircuitApi::assert_is_boolean`]
    AssertIsBoolean,
    /// [`CircuitApi::assert_is_less_or_equal`]
    AssertIsLessOrEqual,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 14] = [
        Operation::Add,
        Operation::Sub,
        Operation::Neg,
        Operation::Mul,
        Operation::Div,
        Operation::Inverse,
        Operation::Select,
        Operation::Lookup2,
        Operation::IsLess,
        Operation::RangeCheck,
        Operation::AssertIsEqual,
        Operation::AssertIsDifferent,
        Operation::AssertIsBoolean,
        Operation::AssertIsLessOrEqual,
    ];

    /// The method name as it appears in logs and reports.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Sub => "Sub",
            Operation::Neg => "Neg",
            Operation::Mul => "Mul",
            Operation::Div => "Div",
            Operation::Inverse => "Inverse",
            Operation::Select => "Select",
            Operation::Lookup2 => "Lookup2",
            Operation::IsLess => "IsLess",
            Operation::RangeCheck => "RangeCheck",
            Operation::AssertIsEqual => "AssertIsEqual",
            Operation::AssertIsDifferent => "AssertIsDifferent",
            Operation::AssertIsBoolean => "AssertIsBoolean",
            Operation::AssertIsLessOrEqual => "AssertIsLessOrEqual",
        }
    }

    /// Is this one of the linear operations (`add`, `sub`, `neg`)?
    #[inline]
    pub fn is_linear(self) -> bool {
        matches!(self, Operation::Add | Operation::Sub | Operation::Neg)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The operation surface a circuit description is written against.
///
/// Values are opaque handles of type [`CircuitApi::Var`]; implementations
/// decide what a handle is. Linear operations are infallible; everything
/// that may emit constraints returns a [`SynthesisError`] on failure.
pub trait CircuitApi<F: PrimeField> {
    /// Handle to a value inside the circuit.
    type Var: Clone + fmt::Debug;

    /// Allocate a public input. `value` is `None` when only the shape of the
    /// circuit is being compiled.
    fn public_input(&mut self, value: Option<F>) -> Result<Self::Var, SynthesisError>;

    /// Allocate a secret input.
    fn secret_input(&mut self, value: Option<F>) -> Result<Self::Var, SynthesisError>;

    /// A constant known at compile time.
    fn constant(&mut self, value: F) -> Self::Var;

    /// `a + b`
    fn add(&mut self, a: &Self::Var, b: &Self::Var) -> Self::Var;

    /// `a - b`
    fn sub(&mut self, a: &Self::Var, b: &Self::Var) -> Self::Var;

    /// `-a`
    fn neg(&mut self, a: &Self::Var) -> Self::Var;

    /// `a * b`
    fn mul(&mut self, a: &Self::Var, b: &Self::Var) -> Result<Self::Var, SynthesisError>;

    /// `a / b`. The quotient is unconstrained when `b` is zero.
    fn div(&mut self, a: &Self::Var, b: &Self::Var) -> Result<Self::Var, SynthesisError>;

    /// `1 / a`
    fn inverse(&mut self, a: &Self::Var) -> Result<Self::Var, SynthesisError>;

    /// `cond ? a : b`, for a `cond` already known to be boolean.
    fn select(
        &mut self,
        cond: &Self::Var,
        a: &Self::Var,
        b: &Self::Var,
    ) -> Result<Self::Var, SynthesisError>;

    /// `table[b0 + 2 * b1]` for boolean `b0` and `b1`.
    fn lookup2(
        &mut self,
        b0: &Self::Var,
        b1: &Self::Var,
        table: [&Self::Var; 4],
    ) -> Result<Self::Var, SynthesisError>;

    /// Returns the bit `a < b`, for operands below `2^64`.
    fn is_less(&mut self, a: &Self::Var, b: &Self::Var) -> Result<Self::Var, SynthesisError>;

    /// Enforce `a < 2^bits`.
    fn range_check(&mut self, a: &Self::Var, bits: usize) -> Result<(), SynthesisError>;

    /// Enforce `a == b`.
    fn assert_is_equal(&mut self, a: &Self::Var, b: &Self::Var) -> Result<(), SynthesisError>;

    /// Enforce `a != b`.
    fn assert_is_different(&mut self, a: &Self::Var, b: &Self::Var)
        -> Result<(), SynthesisError>;

    /// Enforce `a ∈ {0, 1}`.
    fn assert_is_boolean(&mut self, a: &Self::Var) -> Result<(), SynthesisError>;

    /// Enforce `a <= bound`, for operands below `2^64`.
    fn assert_is_less_or_equal(
        &mut self,
        a: &Self::Var,
        bound: &Self::Var,
    ) -> Result<(), SynthesisError>;
}

/// A circuit description.
///
/// `define` is called once per compilation with whichever [`CircuitApi`] the
/// caller chose; the same description can be compiled plainly or through the
/// instrumentation proxy.
pub trait Circuit<F: PrimeField> {
    /// Describe the circuit's computation against `api`.
    fn define<A: CircuitApi<F>>(&self, api: &mut A) -> Result<(), SynthesisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_add_sub_neg_are_linear() {
        let linear: Vec<_> = Operation::ALL
            .iter()
            .copied()
            .filter(|op| op.is_linear())
            .collect();
        assert_eq!(linear, vec![Operation::Add, Operation::Sub, Operation::Neg]);
    }
}
