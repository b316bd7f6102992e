mod complex;
mod simple;

pub use complex::ComplexCircuit;
pub use simple::SimpleCircuit;

use core::{fmt, str::FromStr};

use ark_ff::PrimeField;
use ark_relations::r1cs::SynthesisError;

use crate::{
    api::{Circuit, CircuitApi},
    error::ConfigurationError,
};

/// The fixture circuits that can be selected by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FixtureCircuit {
    /// [`SimpleCircuit`]
    Simple,
    /// [`ComplexCircuit`]
    Complex,
}

impl FixtureCircuit {
    /// Every registered fixture.
    pub const ALL: [FixtureCircuit; 2] = [FixtureCircuit::Simple, FixtureCircuit::Complex];

    /// The selector name.
    pub fn name(self) -> &'static str {
        match self {
            FixtureCircuit::Simple => "simple",
            FixtureCircuit::Complex => "complex",
        }
    }

    /// The circuit with no assignment, for compilation.
    pub fn blank<F: PrimeField>(self) -> FixtureInstance<F> {
        match self {
            FixtureCircuit::Simple => FixtureInstance::Simple(SimpleCircuit::default()),
            FixtureCircuit::Complex => FixtureInstance::Complex(ComplexCircuit::default()),
        }
    }

    /// The circuit with an assignment that satisfies it.
    pub fn example<F: PrimeField>(self) -> FixtureInstance<F> {
        match self {
            FixtureCircuit::Simple => FixtureInstance::Simple(SimpleCircuit::example()),
            FixtureCircuit::Complex => FixtureInstance::Complex(ComplexCircuit::example()),
        }
    }
}

impl fmt::Display for FixtureCircuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FixtureCircuit {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fixture| fixture.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownCircuit(s.to_string()))
    }
}

/// A fixture circuit together with its (optional) assignment.
#[derive(Clone, Debug)]
pub enum FixtureInstance<F: PrimeField> {
    /// See [`SimpleCircuit`].
    Simple(SimpleCircuit<F>),
    /// See [`ComplexCircuit`].
    Complex(ComplexCircuit<F>),
}

impl<F: PrimeField> Circuit<F> for FixtureInstance<F> {
    fn define<A: CircuitApi<F>>(&self, api: &mut A) -> Result<(), SynthesisError> {
        match self {
            FixtureInstance::Simple(circuit) => circuit.define(api),
            FixtureInstance::Complex(circuit) => circuit.define(api),
        }
    }
}
