//! An implementation of [`CircuitApi`] that emits rank-1 constraints into an
//! `ark-relations` [`ConstraintSystem`].
//!
//! Multiplicative operations with a constant operand are folded and cost
//! nothing. Every other constraint-generating operation allocates its output
//! as a witness and enforces one or more `a * b = c` rows. An equality
//! assertion over a fresh product shares that product's row.

mod wire;

pub use wire::Wire;

use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use ark_relations::{
    lc,
    r1cs::{
        ConstraintSystem, ConstraintSystemRef, LinearCombination, OptimizationGoal, SynthesisError,
        SynthesisMode, Variable,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{Circuit, CircuitApi},
    stats::IndexMap,
};

/// Operands of comparisons are assumed to fit in this many bits.
pub const COMPARISON_BITS: usize = 64;

/// The arithmetization a circuit is compiled to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuilderKind {
    /// Rank-1 constraint systems.
    #[default]
    R1cs,
}

impl BuilderKind {
    /// Short name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            BuilderKind::R1cs => "R1CS",
        }
    }
}

/// The outcome of compiling a circuit.
#[derive(Debug, Clone)]
pub struct CompiledCircuit<F: Field> {
    cs: ConstraintSystemRef<F>,
    builder: BuilderKind,
}

impl<F: Field> CompiledCircuit<F> {
    /// Number of constraints the arithmetizer emitted.
    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.cs.num_constraints()
    }

    /// Number of instance variables, including the constant one.
    #[inline]
    pub fn num_instance_variables(&self) -> usize {
        self.cs.num_instance_variables()
    }

    /// Number of witness variables.
    #[inline]
    pub fn num_witness_variables(&self) -> usize {
        self.cs.num_witness_variables()
    }

    /// The arithmetization the circuit was compiled to.
    #[inline]
    pub fn builder(&self) -> BuilderKind {
        self.builder
    }

    /// Check the assignment against every constraint. Only meaningful for
    /// circuits synthesized by [`prove`].
    pub fn is_satisfied(&self) -> Result<bool, SynthesisError> {
        self.cs.is_satisfied()
    }

    /// Name of the first unsatisfied constraint, if any. The name is the
    /// trace recorded by `ark_relations::r1cs::ConstraintLayer` when one is
    /// installed, and the constraint index otherwise.
    pub fn which_is_unsatisfied(&self) -> Result<Option<String>, SynthesisError> {
        self.cs.which_is_unsatisfied()
    }
}

/// Compile `circuit` without a witness and count its constraints.
pub fn compile<F, C>(
    builder: BuilderKind,
    circuit: &C,
) -> Result<CompiledCircuit<F>, SynthesisError>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    compile_with(builder, |api| circuit.define(api))
}

/// Compile whatever `define` describes against a fresh builder.
///
/// This is the hook used to interpose another [`CircuitApi`] between a
/// circuit and the builder.
pub fn compile_with<F, D>(
    builder: BuilderKind,
    define: D,
) -> Result<CompiledCircuit<F>, SynthesisError>
where
    F: PrimeField,
    D: FnOnce(&mut R1csBuilder<F>) -> Result<(), SynthesisError>,
{
    synthesize(builder, SynthesisMode::Setup, define)
}

/// Synthesize `circuit` together with its assignment so that it can be
/// checked with [`CompiledCircuit::is_satisfied`].
pub fn prove<F, C>(builder: BuilderKind, circuit: &C) -> Result<CompiledCircuit<F>, SynthesisError>
where
    F: PrimeField,
    C: Circuit<F> + ?Sized,
{
    synthesize(
        builder,
        SynthesisMode::Prove {
            construct_matrices: true,
        },
        |api| circuit.define(api),
    )
}

fn synthesize<F, D>(
    builder: BuilderKind,
    mode: SynthesisMode,
    define: D,
) -> Result<CompiledCircuit<F>, SynthesisError>
where
    F: PrimeField,
    D: FnOnce(&mut R1csBuilder<F>) -> Result<(), SynthesisError>,
{
    match builder {
        BuilderKind::R1cs => {
            let cs = ConstraintSystem::<F>::new_ref();
            cs.set_optimization_goal(OptimizationGoal::Constraints);
            cs.set_mode(mode);
            let mut api = R1csBuilder::new(cs.clone());
            define(&mut api)?;
            api.flush()?;
            cs.finalize();
            Ok(CompiledCircuit { cs, builder })
        },
    }
}

/// A product `a * b` whose witness is allocated but whose row is not
/// enforced yet.
#[derive(Debug, Clone)]
struct PendingProduct<F: PrimeField> {
    a: LinearCombination<F>,
    b: LinearCombination<F>,
    /// An equality already consumed this product's row.
    folded: bool,
}

fn witness_index(variable: &Variable) -> Option<usize> {
    match variable {
        Variable::Witness(index) => Some(*index),
        _ => None,
    }
}

/// [`CircuitApi`] over an `ark-relations` constraint system.
///
/// Products of two variables are enforced lazily. A product is enforced as
/// soon as another constraint mentions it, except for an equality assertion,
/// which is folded into the product's own row: `a * b + l = r` costs one
/// constraint `a * b = r - l`. Call [`R1csBuilder::flush`] before reading the
/// constraint count of a system built by hand; [`compile`] and [`prove`] do it.
#[derive(Debug, Clone)]
pub struct R1csBuilder<F: PrimeField> {
    cs: ConstraintSystemRef<F>,
    pending: IndexMap<usize, PendingProduct<F>>,
}

impl<F: PrimeField> R1csBuilder<F> {
    /// Build on top of `cs`.
    pub fn new(cs: ConstraintSystemRef<F>) -> Self {
        Self {
            cs,
            pending: IndexMap::default(),
        }
    }

    /// The underlying constraint system.
    pub fn cs(&self) -> ConstraintSystemRef<F> {
        self.cs.clone()
    }

    /// Enforce every product that is still pending.
    pub fn flush(&mut self) -> Result<(), SynthesisError> {
        for (index, product) in core::mem::take(&mut self.pending) {
            if !product.folded {
                self.cs.enforce_constraint(
                    product.a,
                    product.b,
                    lc!() + Variable::Witness(index),
                )?;
            }
        }
        Ok(())
    }

    fn witness(&self, value: Option<F>) -> Result<Wire<F>, SynthesisError> {
        let variable = self
            .cs
            .new_witness_variable(|| value.ok_or(SynthesisError::AssignmentMissing))?;
        Ok(Wire::variable(variable, value))
    }

    /// Enforce the rows of the pending products `lc` mentions.
    fn materialize(&mut self, lc: &LinearCombination<F>) -> Result<(), SynthesisError> {
        for (coeff, variable) in &lc.0 {
            if coeff.is_zero() {
                continue;
            }
            let Some(product) = witness_index(variable).and_then(|i| self.pending.shift_remove(&i))
            else {
                continue;
            };
            self.cs
                .enforce_constraint(product.a, product.b, lc!() + *variable)?;
        }
        Ok(())
    }

    fn enforce(
        &mut self,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
    ) -> Result<(), SynthesisError> {
        self.materialize(&a)?;
        self.materialize(&b)?;
        self.materialize(&c)?;
        self.cs.enforce_constraint(a, b, c)
    }

    /// `a * b`; free when either side is constant, pending otherwise.
    fn product(&mut self, a: &Wire<F>, b: &Wire<F>) -> Result<Wire<F>, SynthesisError> {
        match (a.constant_value(), b.constant_value()) {
            (Some(c), _) => Ok(b.scale(c)),
            (_, Some(c)) => Ok(a.scale(c)),
            _ => {
                self.materialize(a.lc())?;
                self.materialize(b.lc())?;
                let value = a.value().zip(b.value()).map(|(x, y)| x * y);
                let variable = self
                    .cs
                    .new_witness_variable(|| value.ok_or(SynthesisError::AssignmentMissing))?;
                match witness_index(&variable) {
                    Some(index) => {
                        self.pending.insert(
                            index,
                            PendingProduct {
                                a: a.lc().clone(),
                                b: b.lc().clone(),
                                folded: false,
                            },
                        );
                    },
                    None => self.cs.enforce_constraint(
                        a.lc().clone(),
                        b.lc().clone(),
                        lc!() + variable,
                    )?,
                }
                Ok(Wire::variable(variable, value))
            },
        }
    }

    /// `a = 0`, folded into the row of a pending product when `a` mentions one.
    fn enforce_zero(&mut self, a: &Wire<F>) -> Result<(), SynthesisError> {
        match a.constant_value() {
            Some(c) if c.is_zero() => return Ok(()),
            Some(_) => return Err(SynthesisError::Unsatisfiable),
            None => {},
        }

        let foldable = a.lc().0.iter().find_map(|(coeff, variable)| {
            let index = witness_index(variable)?;
            let product = self.pending.get(&index)?;
            (!coeff.is_zero() && !product.folded).then_some((*coeff, index))
        });
        let Some((coeff, index)) = foldable else {
            return self.enforce(a.lc().clone(), lc!() + Variable::One, lc!());
        };

        // k * w + rest = 0  becomes  x * y = -rest / k
        let scale = -coeff.inverse().ok_or(SynthesisError::DivisionByZero)?;
        let rest = LinearCombination(
            a.lc()
                .0
                .iter()
                .filter(|(_, v)| witness_index(v) != Some(index))
                .map(|(c, v)| (*c * scale, *v))
                .collect(),
        );
        self.materialize(&rest)?;
        let Some(product) = self.pending.get_mut(&index) else {
            return Err(SynthesisError::Unsatisfiable);
        };
        product.folded = true;
        let (x, y) = (product.a.clone(), product.b.clone());
        self.cs.enforce_constraint(x, y, rest)
    }

    fn enforce_boolean(&mut self, a: &Wire<F>) -> Result<(), SynthesisError> {
        match a.constant_value() {
            Some(c) if c.is_zero() || c.is_one() => Ok(()),
            Some(_) => Err(SynthesisError::Unsatisfiable),
            None => {
                let minus_one = a.add_scaled(&Wire::constant(F::one()), -F::one());
                self.enforce(a.lc().clone(), minus_one.lc().clone(), lc!())
            },
        }
    }

    /// Little-endian decomposition of `a` into `n` boolean wires.
    ///
    /// Costs `n + 1` constraints for a variable `a`. The recomposition only
    /// holds when `a < 2^n`.
    fn to_bits(&mut self, a: &Wire<F>, n: usize) -> Result<Vec<Wire<F>>, SynthesisError> {
        if let Some(c) = a.constant_value() {
            let bits = c.into_bigint();
            if bits.num_bits() as usize > n {
                return Err(SynthesisError::Unsatisfiable);
            }
            return Ok((0..n)
                .map(|i| Wire::constant(F::from(bits.get_bit(i))))
                .collect());
        }

        let bit_values: Vec<Option<bool>> = match a.value() {
            Some(v) => {
                let bits = v.into_bigint();
                (0..n).map(|i| Some(bits.get_bit(i))).collect()
            },
            None => vec![None; n],
        };

        let mut bits = Vec::with_capacity(n);
        let mut recomposed = Wire::constant(F::zero());
        let mut coeff = F::one();
        for value in bit_values {
            let bit = self.witness(value.map(F::from))?;
            self.enforce_boolean(&bit)?;
            recomposed = recomposed.add_scaled(&bit, coeff);
            coeff.double_in_place();
            bits.push(bit);
        }
        let difference = recomposed.add_scaled(a, -F::one());
        self.enforce(difference.lc().clone(), lc!() + Variable::One, lc!())?;
        Ok(bits)
    }
}

impl<F: PrimeField> CircuitApi<F> for R1csBuilder<F> {
    type Var = Wire<F>;

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn public_input(&mut self, value: Option<F>) -> Result<Wire<F>, SynthesisError> {
        let variable = self
            .cs
            .new_input_variable(|| value.ok_or(SynthesisError::AssignmentMissing))?;
        Ok(Wire::variable(variable, value))
    }

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn secret_input(&mut self, value: Option<F>) -> Result<Wire<F>, SynthesisError> {
        self.witness(value)
    }

    fn constant(&mut self, value: F) -> Wire<F> {
        Wire::constant(value)
    }

    fn add(&mut self, a: &Wire<F>, b: &Wire<F>) -> Wire<F> {
        a.add_scaled(b, F::one())
    }

    fn sub(&mut self, a: &Wire<F>, b: &Wire<F>) -> Wire<F> {
        a.add_scaled(b, -F::one())
    }

    fn neg(&mut self, a: &Wire<F>) -> Wire<F> {
        a.scale(-F::one())
    }

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn mul(&mut self, a: &Wire<F>, b: &Wire<F>) -> Result<Wire<F>, SynthesisError> {
        self.product(a, b)
    }

    /// Enforces `q * b = a`.
    #[tracing::instrument(target = "r1cs", skip_all)]
    fn div(&mut self, a: &Wire<F>, b: &Wire<F>) -> Result<Wire<F>, SynthesisError> {
        if let Some(d) = b.constant_value() {
            let inverse = d.inverse().ok_or(SynthesisError::DivisionByZero)?;
            return Ok(a.scale(inverse));
        }
        let value = match (a.value(), b.value()) {
            (Some(x), Some(y)) => Some(y.inverse().ok_or(SynthesisError::DivisionByZero)? * x),
            _ => None,
        };
        let quotient = self.witness(value)?;
        self.enforce(quotient.lc().clone(), b.lc().clone(), a.lc().clone())?;
        Ok(quotient)
    }

    /// Enforces `a * a^{-1} = 1`.
    #[tracing::instrument(target = "r1cs", skip_all)]
    fn inverse(&mut self, a: &Wire<F>) -> Result<Wire<F>, SynthesisError> {
        if let Some(c) = a.constant_value() {
            return c
                .inverse()
                .map(Wire::constant)
                .ok_or(SynthesisError::DivisionByZero);
        }
        let value = a
            .value()
            .map(|x| x.inverse().ok_or(SynthesisError::DivisionByZero))
            .transpose()?;
        let inverse = self.witness(value)?;
        self.enforce(
            a.lc().clone(),
            inverse.lc().clone(),
            lc!() + Variable::One,
        )?;
        Ok(inverse)
    }

    /// r = b + cond * (a - b)
    #[tracing::instrument(target = "r1cs", skip_all)]
    fn select(
        &mut self,
        cond: &Wire<F>,
        a: &Wire<F>,
        b: &Wire<F>,
    ) -> Result<Wire<F>, SynthesisError> {
        let difference = a.add_scaled(b, -F::one());
        let chosen = self.product(cond, &difference)?;
        Ok(b.add_scaled(&chosen, F::one()))
    }

    /// t0 + b0 * (t1 - t0 + b1 * (t3 - t2 - t1 + t0)) + b1 * (t2 - t0)
    ///
    /// One constraint for a constant table, three otherwise.
    #[tracing::instrument(target = "r1cs", skip_all)]
    fn lookup2(
        &mut self,
        b0: &Wire<F>,
        b1: &Wire<F>,
        table: [&Wire<F>; 4],
    ) -> Result<Wire<F>, SynthesisError> {
        let [t0, t1, t2, t3] = table;
        let minus_one = -F::one();
        let cross = t3
            .add_scaled(t2, minus_one)
            .add_scaled(t1, minus_one)
            .add_scaled(t0, F::one());
        let high = self
            .product(b1, &cross)?
            .add_scaled(t1, F::one())
            .add_scaled(t0, minus_one);
        let low = self.product(b0, &high)?;
        let rest = self.product(b1, &t2.add_scaled(t0, minus_one))?;
        Ok(t0.add_scaled(&low, F::one()).add_scaled(&rest, F::one()))
    }

    /// The top bit of `a - b + 2^64` is set exactly when `a >= b`.
    #[tracing::instrument(target = "r1cs", skip_all)]
    fn is_less(&mut self, a: &Wire<F>, b: &Wire<F>) -> Result<Wire<F>, SynthesisError> {
        let offset = Wire::constant(F::from(1u128 << COMPARISON_BITS));
        let shifted = a.add_scaled(b, -F::one()).add_scaled(&offset, F::one());
        let bits = self.to_bits(&shifted, COMPARISON_BITS + 1)?;
        let not_less = &bits[COMPARISON_BITS];
        Ok(Wire::constant(F::one()).add_scaled(not_less, -F::one()))
    }

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn range_check(&mut self, a: &Wire<F>, bits: usize) -> Result<(), SynthesisError> {
        self.to_bits(a, bits).map(|_| ())
    }

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn assert_is_equal(&mut self, a: &Wire<F>, b: &Wire<F>) -> Result<(), SynthesisError> {
        self.enforce_zero(&a.add_scaled(b, -F::one()))
    }

    /// Enforces `(a - b) * inv = 1`.
    #[tracing::instrument(target = "r1cs", skip_all)]
    fn assert_is_different(&mut self, a: &Wire<F>, b: &Wire<F>) -> Result<(), SynthesisError> {
        let difference = a.add_scaled(b, -F::one());
        if let Some(c) = difference.constant_value() {
            return if c.is_zero() {
                Err(SynthesisError::Unsatisfiable)
            } else {
                Ok(())
            };
        }
        let inverse = self.witness(
            difference
                .value()
                .map(|d| d.inverse().unwrap_or_else(F::zero)),
        )?;
        self.enforce(
            difference.lc().clone(),
            inverse.lc().clone(),
            lc!() + Variable::One,
        )
    }

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn assert_is_boolean(&mut self, a: &Wire<F>) -> Result<(), SynthesisError> {
        self.enforce_boolean(a)
    }

    #[tracing::instrument(target = "r1cs", skip_all)]
    fn assert_is_less_or_equal(
        &mut self,
        a: &Wire<F>,
        bound: &Wire<F>,
    ) -> Result<(), SynthesisError> {
        let slack = bound.add_scaled(a, -F::one());
        self.to_bits(&slack, COMPARISON_BITS).map(|_| ())
    }
}
