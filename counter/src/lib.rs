//! Constraint accounting for circuits built against an R1CS backend.
//!
//! A circuit is written once against the [`CircuitApi`] operation surface.
//! It can then be compiled directly by the [`R1csBuilder`] adapter over
//! `ark-relations`, or compiled through a [`CountingApi`] proxy that forwards
//! every call to the builder while attributing each constraint-generating call
//! to a [`ConstraintKind`].
//!
//! The [`CountingEngine`] drives one analysis run and returns an [`Analysis`]
//! carrying both the compiled constraint count (ground truth) and the
//! per-kind attribution collected by the proxy. The [`Reporter`] renders it.
//!
//! # Example
//!
//! ```rust
//! use ark_constraint_counter::{CounterConfig, CountingEngine};
//!
//! let engine = CountingEngine::new(CounterConfig::default());
//! let analysis = engine.analyze_fixture("complex").unwrap();
//! assert_eq!(analysis.total_constraints(), 4);
//! ```

#![warn(
    unused,
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]
#![allow(
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::redundant_closure_for_method_calls
)]
#![deny(unsafe_code)]

/// The operation surface circuits are written against.
pub mod api;

/// The `ark-relations` backed R1CS builder.
pub mod builder;

/// Fixture circuits and the selector used by the command line.
pub mod circuits;

/// The operation to constraint-kind cost table.
pub mod cost;

/// The instrumentation proxy.
pub mod counting;

/// The analysis driver.
pub mod engine;

/// Errors surfaced by an analysis run.
pub mod error;

/// The closed set of constraint kinds and the observation record.
pub mod kind;

/// Text rendering of an analysis.
pub mod report;

/// The per-run constraint accumulator.
pub mod stats;

#[cfg(test)]
mod tests;

pub use crate::{
    api::{Circuit, CircuitApi, Operation},
    builder::{BuilderKind, CompiledCircuit, R1csBuilder, Wire},
    circuits::{ComplexCircuit, FixtureCircuit, FixtureInstance, SimpleCircuit},
    cost::{CostModel, CostRule, LinearRuleError},
    counting::CountingApi,
    engine::{Analysis, CounterConfig, CountingEngine, CountingMode, Discrepancy, ScalarField},
    error::{AnalysisError, ConfigurationError},
    kind::{ConstraintKind, ConstraintObservation},
    report::{Insight, KindShare, Reporter},
    stats::{ConstraintStats, InvariantViolation},
};
