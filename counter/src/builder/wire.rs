use ark_ff::{PrimeField, Zero};
use ark_relations::{
    lc,
    r1cs::{LinearCombination, Variable},
};

/// A value inside an [`R1csBuilder`](super::R1csBuilder) circuit: a linear
/// combination of allocated variables, plus its assignment when known.
#[derive(Clone, Debug)]
pub struct Wire<F: PrimeField> {
    lc: LinearCombination<F>,
    value: Option<F>,
}

impl<F: PrimeField> Wire<F> {
    pub(crate) fn constant(value: F) -> Self {
        Self {
            lc: lc!() + (value, Variable::One),
            value: Some(value),
        }
    }

    pub(crate) fn variable(variable: Variable, value: Option<F>) -> Self {
        Self {
            lc: lc!() + variable,
            value,
        }
    }

    /// The linear combination this wire stands for.
    #[inline]
    pub fn lc(&self) -> &LinearCombination<F> {
        &self.lc
    }

    /// The assigned value, if the circuit is being synthesized with a witness.
    #[inline]
    pub fn value(&self) -> Option<F> {
        self.value
    }

    /// Returns the value if the wire depends only on the constant one.
    pub fn constant_value(&self) -> Option<F> {
        self.lc
            .0
            .iter()
            .all(|(c, v)| c.is_zero() || matches!(v, Variable::One))
            .then(|| {
                self.lc
                    .0
                    .iter()
                    .filter(|(_, v)| matches!(v, Variable::One))
                    .map(|(c, _)| *c)
                    .sum()
            })
    }

    /// `self + coeff * other`. Never creates a constraint.
    pub(crate) fn add_scaled(&self, other: &Self, coeff: F) -> Self {
        let mut lc = self.lc.clone();
        lc.0.extend(other.lc.0.iter().map(|(c, v)| (*c * coeff, *v)));
        lc.compactify();
        Self {
            lc,
            value: self.value.zip(other.value).map(|(a, b)| a + b * coeff),
        }
    }

    /// `coeff * self`. Never creates a constraint.
    pub(crate) fn scale(&self, coeff: F) -> Self {
        if coeff.is_zero() {
            return Self::constant(F::zero());
        }
        Self {
            lc: LinearCombination(self.lc.0.iter().map(|(c, v)| (*c * coeff, *v)).collect()),
            value: self.value.map(|v| v * coeff),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};
    use ark_test_curves::bls12_381::Fr;

    #[test]
    fn constants_fold() {
        let a = Wire::constant(Fr::from(3u8));
        let b = Wire::constant(Fr::from(5u8));
        let sum = a.add_scaled(&b, Fr::one());
        assert_eq!(sum.constant_value(), Some(Fr::from(8u8)));
        assert_eq!(sum.value(), Some(Fr::from(8u8)));
        assert_eq!(a.scale(Fr::zero()).constant_value(), Some(Fr::zero()));
    }

    #[test]
    fn variables_are_not_constant() {
        let x = Wire::variable(Variable::Witness(0), None);
        let shifted = x.add_scaled(&Wire::constant(Fr::one()), Fr::one());
        assert_eq!(shifted.constant_value(), None);
        assert_eq!(shifted.value(), None);

        let cancelled = x.add_scaled(&x, -Fr::one());
        assert_eq!(cancelled.constant_value(), Some(Fr::zero()));
    }
}
