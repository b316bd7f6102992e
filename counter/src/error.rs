use core::fmt;

use ark_relations::r1cs::SynthesisError;

use crate::stats::InvariantViolation;

/// The analysis was asked for something that does not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No fixture circuit is registered under this name.
    UnknownCircuit(String),
}

impl std::error::Error for ConfigurationError {}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::UnknownCircuit(name) => {
                write!(f, "unknown circuit type `{name}` (expected one of: simple, complex)")
            },
        }
    }
}

/// Why an analysis run produced no [`Analysis`](crate::Analysis).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    /// Rejected before any analysis began.
    Configuration(ConfigurationError),
    /// The arithmetizer rejected the circuit.
    Compilation {
        /// Circuit being analyzed.
        circuit: String,
        /// The error returned by the arithmetizer, as is.
        cause: SynthesisError,
    },
    /// The circuit compiled, but its example assignment violates a constraint.
    Unsatisfied {
        /// Circuit being checked.
        circuit: String,
        /// Trace or index of the first failing constraint.
        constraint: String,
    },
    /// The instrumentation's bookkeeping is inconsistent.
    Invariant {
        /// Circuit being analyzed.
        circuit: String,
        /// The mismatch that was detected.
        violation: InvariantViolation,
    },
}

impl AnalysisError {
    /// The circuit the error refers to, when the run got that far.
    pub fn circuit(&self) -> Option<&str> {
        match self {
            AnalysisError::Configuration(_) => None,
            AnalysisError::Compilation { circuit, .. }
            | AnalysisError::Unsatisfied { circuit, .. }
            | AnalysisError::Invariant { circuit, .. } => Some(circuit),
        }
    }
}

impl From<ConfigurationError> for AnalysisError {
    fn from(error: ConfigurationError) -> Self {
        AnalysisError::Configuration(error)
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalysisError::Configuration(error) => Some(error),
            AnalysisError::Compilation { cause, .. } => Some(cause),
            AnalysisError::Unsatisfied { .. } => None,
            AnalysisError::Invariant { violation, .. } => Some(violation),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Configuration(error) => write!(f, "configuration error: {error}"),
            AnalysisError::Compilation { circuit, cause } => {
                write!(f, "failed to compile circuit `{circuit}`: {cause}")
            },
            AnalysisError::Unsatisfied {
                circuit,
                constraint,
            } => write!(
                f,
                "assignment for circuit `{circuit}` violates constraint {constraint}"
            ),
            AnalysisError::Invariant { circuit, violation } => {
                write!(f, "analysis of circuit `{circuit}` is inconsistent: {violation}")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn compilation_errors_keep_their_cause() {
        let error = AnalysisError::Compilation {
            circuit: "simple".to_string(),
            cause: SynthesisError::DivisionByZero,
        };
        assert_eq!(error.circuit(), Some("simple"));
        assert_eq!(
            error.to_string(),
            "failed to compile circuit `simple`: division by zero"
        );
        assert_eq!(
            error.source().map(|e| e.to_string()),
            Some(SynthesisError::DivisionByZero.to_string())
        );
    }

    #[test]
    fn configuration_errors_name_the_selector() {
        let error = AnalysisError::from(ConfigurationError::UnknownCircuit("huge".into()));
        assert_eq!(error.circuit(), None);
        assert!(error.to_string().contains("`huge`"));
    }
}
