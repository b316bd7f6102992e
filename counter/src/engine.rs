//! Drives an analysis run: compile a circuit through the instrumentation
//! proxy and package the compiled count with the proxy's attribution.

use core::fmt;
use std::time::{Duration, Instant};

use ark_relations::r1cs::SynthesisError;
use ark_std::cfg_iter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    api::Circuit,
    builder::{self, BuilderKind, CompiledCircuit},
    circuits::FixtureCircuit,
    cost::CostModel,
    counting::CountingApi,
    error::AnalysisError,
    stats::ConstraintStats,
};

/// The field every analysis is run over.
pub type ScalarField = ark_bn254::Fr;

/// How [`ScalarField`] is named in reports.
pub const SCALAR_FIELD_NAME: &str = "BN254";

/// Whether the circuit is compiled through the instrumentation proxy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountingMode {
    /// Compile through [`CountingApi`] and attribute constraints per kind.
    #[default]
    Instrumented,
    /// Compile directly; only the compiled count is reported.
    CompileOnly,
}

/// Analysis settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// The arithmetization to compile to.
    pub builder: BuilderKind,
    /// Whether to attribute constraints per kind.
    pub mode: CountingMode,
    /// The operation to kind table used by the proxy.
    pub cost_model: CostModel,
}

/// The compiled count and the proxy's count disagree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    /// Constraints emitted by the arithmetizer.
    pub compiled: usize,
    /// Constraints attributed by the proxy.
    pub instrumented: usize,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compiled {} constraints but attributed {}",
            self.compiled, self.instrumented
        )
    }
}

/// The result of one analysis run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Analysis {
    circuit_name: String,
    builder: BuilderKind,
    mode: CountingMode,
    cost_model: String,
    compiled_constraints: usize,
    num_instance_variables: usize,
    num_witness_variables: usize,
    instrumented: Option<ConstraintStats>,
    elapsed: Duration,
}

impl Analysis {
    pub(crate) fn new<F: ark_ff::Field>(
        circuit_name: &str,
        config: &CounterConfig,
        compiled: &CompiledCircuit<F>,
        instrumented: Option<ConstraintStats>,
        elapsed: Duration,
    ) -> Self {
        Self {
            circuit_name: circuit_name.to_string(),
            builder: compiled.builder(),
            mode: config.mode,
            cost_model: config.cost_model.name.clone(),
            compiled_constraints: compiled.constraint_count(),
            num_instance_variables: compiled.num_instance_variables(),
            num_witness_variables: compiled.num_witness_variables(),
            instrumented,
            elapsed,
        }
    }

    /// Name of the analyzed circuit.
    pub fn circuit_name(&self) -> &str {
        &self.circuit_name
    }

    /// The arithmetization the circuit was compiled to.
    pub fn builder(&self) -> BuilderKind {
        self.builder
    }

    /// How the run was performed.
    pub fn mode(&self) -> CountingMode {
        self.mode
    }

    /// Name of the cost model the proxy charged with.
    pub fn cost_model(&self) -> &str {
        &self.cost_model
    }

    /// The authoritative constraint count, as emitted by the arithmetizer.
    pub fn total_constraints(&self) -> usize {
        self.compiled_constraints
    }

    /// Instance variables, including the constant one.
    pub fn num_instance_variables(&self) -> usize {
        self.num_instance_variables
    }

    /// Witness variables.
    pub fn num_witness_variables(&self) -> usize {
        self.num_witness_variables
    }

    /// The per-kind attribution, absent in [`CountingMode::CompileOnly`].
    pub fn instrumented(&self) -> Option<&ConstraintStats> {
        self.instrumented.as_ref()
    }

    /// Wall-clock time spent compiling.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// `Some` when the attributed total differs from the compiled count.
    pub fn discrepancy(&self) -> Option<Discrepancy> {
        let instrumented = self.instrumented.as_ref()?.total_constraints();
        (instrumented != self.compiled_constraints).then_some(Discrepancy {
            compiled: self.compiled_constraints,
            instrumented,
        })
    }
}

/// Runs analyses with a fixed [`CounterConfig`].
///
/// Every call starts from fresh statistics, so one engine can be reused
/// (and shared between threads) without counts leaking between runs.
#[derive(Clone, Debug, Default)]
pub struct CountingEngine {
    config: CounterConfig,
}

impl CountingEngine {
    /// An engine with the given settings.
    pub fn new(config: CounterConfig) -> Self {
        Self { config }
    }

    /// The settings every run uses.
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Compile `circuit` and count its constraints.
    pub fn analyze<C>(&self, name: &str, circuit: &C) -> Result<Analysis, AnalysisError>
    where
        C: Circuit<ScalarField> + ?Sized,
    {
        let span = info_span!(target: "constraint_counter", "analyze", circuit = name);
        let _enter = span.enter();

        let compilation_error = |cause: SynthesisError| AnalysisError::Compilation {
            circuit: name.to_string(),
            cause,
        };

        let start = Instant::now();
        let (compiled, instrumented) = match self.config.mode {
            CountingMode::Instrumented => {
                let mut stats = ConstraintStats::new();
                let compiled = builder::compile_with::<ScalarField, _>(self.config.builder, |api| {
                    let mut proxy = CountingApi::new(api, &self.config.cost_model, &mut stats);
                    circuit.define(&mut proxy)
                })
                .map_err(compilation_error)?;
                stats
                    .check_invariant()
                    .map_err(|violation| AnalysisError::Invariant {
                        circuit: name.to_string(),
                        violation,
                    })?;
                (compiled, Some(stats))
            },
            CountingMode::CompileOnly => {
                let compiled = builder::compile::<ScalarField, _>(self.config.builder, circuit)
                    .map_err(compilation_error)?;
                (compiled, None)
            },
        };
        let elapsed = start.elapsed();

        let analysis = Analysis::new(name, &self.config, &compiled, instrumented, elapsed);
        if let Some(discrepancy) = analysis.discrepancy() {
            warn!(
                target: "constraint_counter",
                compiled = discrepancy.compiled,
                instrumented = discrepancy.instrumented,
                "attributed constraints differ from the compiled count"
            );
        }
        info!(
            target: "constraint_counter",
            builder = analysis.builder().name(),
            constraints = analysis.total_constraints(),
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            "analysis finished"
        );
        Ok(analysis)
    }

    /// Analyze the fixture registered under `selector`.
    pub fn analyze_fixture(&self, selector: &str) -> Result<Analysis, AnalysisError> {
        let fixture: FixtureCircuit = selector.parse()?;
        self.analyze(fixture.name(), &fixture.blank::<ScalarField>())
    }

    /// Analyze several fixtures, in parallel with the `parallel` feature.
    /// Results come back in input order.
    pub fn analyze_batch(
        &self,
        fixtures: &[FixtureCircuit],
    ) -> Vec<Result<Analysis, AnalysisError>> {
        cfg_iter!(fixtures)
            .map(|fixture| self.analyze(fixture.name(), &fixture.blank::<ScalarField>()))
            .collect()
    }

    /// Synthesize `circuit` with its assignment and check every constraint.
    pub fn check_witness<C>(&self, name: &str, circuit: &C) -> Result<(), AnalysisError>
    where
        C: Circuit<ScalarField> + ?Sized,
    {
        let compilation_error = |cause: SynthesisError| AnalysisError::Compilation {
            circuit: name.to_string(),
            cause,
        };
        let proved = builder::prove::<ScalarField, _>(self.config.builder, circuit)
            .map_err(compilation_error)?;
        if proved.is_satisfied().map_err(compilation_error)? {
            debug!(
                target: "constraint_counter",
                circuit = name,
                "assignment satisfies every constraint"
            );
            return Ok(());
        }
        let constraint = proved
            .which_is_unsatisfied()
            .map_err(compilation_error)?
            .unwrap_or_else(|| "<unknown>".to_string());
        Err(AnalysisError::Unsatisfied {
            circuit: name.to_string(),
            constraint,
        })
    }

    /// Check the example assignment of the fixture registered under `selector`.
    pub fn check_fixture(&self, selector: &str) -> Result<(), AnalysisError> {
        let fixture: FixtureCircuit = selector.parse()?;
        self.check_witness(fixture.name(), &fixture.example::<ScalarField>())
    }
}
