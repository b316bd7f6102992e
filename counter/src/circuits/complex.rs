use ark_ff::{One, PrimeField};
use ark_relations::r1cs::SynthesisError;

use crate::api::{Circuit, CircuitApi};

/// `(x^2 + y^2) / z - 1 ∈ {0, 1}` over three public inputs.
#[derive(Clone, Debug, Default)]
pub struct ComplexCircuit<F: PrimeField> {
    /// Squared.
    pub x: Option<F>,
    /// Squared.
    pub y: Option<F>,
    /// Divisor.
    pub z: Option<F>,
}

impl<F: PrimeField> ComplexCircuit<F> {
    /// `x = y = z = 1`, giving `(1 + 1) / 1 - 1 = 1`.
    pub fn example() -> Self {
        Self {
            x: Some(F::one()),
            y: Some(F::one()),
            z: Some(F::one()),
        }
    }
}

impl<F: PrimeField> Circuit<F> for ComplexCircuit<F> {
    fn define<A: CircuitApi<F>>(&self, api: &mut A) -> Result<(), SynthesisError> {
        let x = api.public_input(self.x)?;
        let y = api.public_input(self.y)?;
        let z = api.public_input(self.z)?;

        let x2 = api.mul(&x, &x)?;
        let y2 = api.mul(&y, &y)?;
        let sum = api.add(&x2, &y2);
        let ratio = api.div(&sum, &z)?;

        let one = api.constant(F::one());
        let is_valid = api.sub(&ratio, &one);
        api.assert_is_boolean(&is_valid)
    }
}
