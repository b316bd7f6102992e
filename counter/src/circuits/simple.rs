use ark_ff::PrimeField;
use ark_relations::r1cs::SynthesisError;

use crate::api::{Circuit, CircuitApi};

/// `a * b + c == 15` over three public inputs.
///
/// One multiplication, one (free) addition and one equality assertion.
#[derive(Clone, Debug, Default)]
pub struct SimpleCircuit<F: PrimeField> {
    /// First factor.
    pub a: Option<F>,
    /// Second factor.
    pub b: Option<F>,
    /// Addend.
    pub c: Option<F>,
}

impl<F: PrimeField> SimpleCircuit<F> {
    /// `3 * 4 + 3`
    pub fn example() -> Self {
        Self {
            a: Some(F::from(3u8)),
            b: Some(F::from(4u8)),
            c: Some(F::from(3u8)),
        }
    }
}

impl<F: PrimeField> Circuit<F> for SimpleCircuit<F> {
    fn define<A: CircuitApi<F>>(&self, api: &mut A) -> Result<(), SynthesisError> {
        let a = api.public_input(self.a)?;
        let b = api.public_input(self.b)?;
        let c = api.public_input(self.c)?;

        let product = api.mul(&a, &b)?;
        let result = api.add(&product, &c);
        let expected = api.constant(F::from(15u8));
        api.assert_is_equal(&result, &expected)
    }
}
