use ark_relations::r1cs::SynthesisError;

use crate::{
    AnalysisError, Circuit, CircuitApi, ComplexCircuit, ConfigurationError, ConstraintKind,
    CounterConfig, CountingEngine, CountingMode, FixtureCircuit, ScalarField, SimpleCircuit,
};

fn engine() -> CountingEngine {
    CountingEngine::new(CounterConfig::default())
}

#[test]
fn simple_circuit() {
    let analysis = engine().analyze_fixture("simple").unwrap();
    assert_eq!(analysis.circuit_name(), "simple");

    let stats = analysis.instrumented().unwrap();
    assert_eq!(stats.total_constraints(), 1);
    assert_eq!(stats.by_kind().collect::<Vec<_>>(), vec![(ConstraintKind::Mul, 1)]);
    assert_eq!(stats.count(ConstraintKind::AssertIsEqual), 0);
    assert_eq!(stats.log().len(), 1);

    // The equality shares the multiplication's row.
    assert_eq!(analysis.total_constraints(), 1);
    assert_eq!(analysis.discrepancy(), None);
    // Three public inputs plus the constant one.
    assert_eq!(analysis.num_instance_variables(), 4);
}

#[test]
fn complex_circuit() {
    let analysis = engine().analyze_fixture("complex").unwrap();
    let stats = analysis.instrumented().unwrap();

    assert_eq!(
        stats.by_kind().collect::<Vec<_>>(),
        vec![
            (ConstraintKind::Mul, 2),
            (ConstraintKind::Div, 1),
            (ConstraintKind::AssertIsBoolean, 1),
        ]
    );
    assert_eq!(stats.total_constraints(), 4);
    assert_eq!(analysis.total_constraints(), 4);
    assert_eq!(analysis.discrepancy(), None);
    stats.check_invariant().unwrap();
}

#[test]
fn unknown_selector_is_a_configuration_error() {
    let error = engine().analyze_fixture("huge").unwrap_err();
    assert_eq!(
        error,
        AnalysisError::Configuration(ConfigurationError::UnknownCircuit("huge".to_string()))
    );
}

#[test]
fn compile_only_skips_attribution() {
    let engine = CountingEngine::new(CounterConfig {
        mode: CountingMode::CompileOnly,
        ..CounterConfig::default()
    });
    for (fixture, expected) in [(FixtureCircuit::Simple, 1), (FixtureCircuit::Complex, 4)] {
        let analysis = engine.analyze_fixture(fixture.name()).unwrap();
        assert!(analysis.instrumented().is_none());
        assert!(analysis.discrepancy().is_none());
        assert_eq!(analysis.total_constraints(), expected);
    }
}

#[test]
fn runs_do_not_share_counts() {
    let engine = engine();
    let first = engine.analyze_fixture("complex").unwrap();
    let second = engine.analyze_fixture("complex").unwrap();
    assert_eq!(first.instrumented(), second.instrumented());
    assert_eq!(second.instrumented().unwrap().total_constraints(), 4);
}

#[test]
fn batch_preserves_order() {
    let results = engine().analyze_batch(&FixtureCircuit::ALL);
    let totals = results
        .into_iter()
        .map(|result| {
            result.map(|analysis| {
                (
                    analysis.circuit_name().to_string(),
                    analysis.total_constraints(),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(
        totals,
        vec![("simple".to_string(), 1), ("complex".to_string(), 4)]
    );
}

#[test]
fn example_assignments_satisfy_their_circuits() {
    let engine = engine();
    for fixture in FixtureCircuit::ALL {
        engine.check_fixture(fixture.name()).unwrap();
    }
}

#[test]
fn wrong_assignment_is_reported() {
    let circuit = SimpleCircuit::<ScalarField> {
        a: Some(2u8.into()),
        ..SimpleCircuit::example()
    };
    let error = engine().check_witness("simple", &circuit).unwrap_err();
    assert!(matches!(
        error,
        AnalysisError::Unsatisfied { ref circuit, .. } if circuit == "simple"
    ));
}

#[test]
fn engine_errors_surface_as_compilation_errors() {
    let circuit = ComplexCircuit::<ScalarField> {
        z: Some(0u8.into()),
        ..ComplexCircuit::example()
    };
    let error = engine().check_witness("complex", &circuit).unwrap_err();
    assert_eq!(
        error,
        AnalysisError::Compilation {
            circuit: "complex".to_string(),
            cause: SynthesisError::DivisionByZero,
        }
    );
}

/// Exercises every charged operation once.
struct Kitchen;

impl Circuit<ScalarField> for Kitchen {
    fn define<A: CircuitApi<ScalarField>>(&self, api: &mut A) -> Result<(), SynthesisError> {
        let a = api.secret_input(None)?;
        let b = api.secret_input(None)?;
        let bit = api.secret_input(None)?;

        let product = api.mul(&a, &b)?;
        let _ = api.div(&product, &b)?;
        let _ = api.inverse(&a)?;
        let _ = api.select(&bit, &a, &b)?;
        let _ = api.lookup2(&bit, &bit, [&a, &b, &a, &b])?;
        let _ = api.is_less(&a, &b)?;
        api.range_check(&a, 8)?;
        api.assert_is_equal(&a, &a)?;
        api.assert_is_different(&a, &b)?;
        api.assert_is_boolean(&bit)?;
        api.assert_is_less_or_equal(&a, &b)
    }
}

#[test]
fn every_kind_is_attributed_once() {
    let analysis = engine().analyze("kitchen", &Kitchen).unwrap();
    let stats = analysis.instrumented().unwrap();
    stats.check_invariant().unwrap();

    let kinds = stats.by_kind().map(|(kind, _)| kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            ConstraintKind::Mul,
            ConstraintKind::Div,
            ConstraintKind::Inverse,
            ConstraintKind::Select,
            ConstraintKind::Lookup,
            ConstraintKind::Cmp,
            ConstraintKind::Range,
            ConstraintKind::AssertIsDifferent,
            ConstraintKind::AssertIsBoolean,
            ConstraintKind::AssertIsLessOrEqual,
        ]
    );
    assert!(stats.by_kind().all(|(_, count)| count == 1));
}

#[test]
fn bit_decompositions_diverge_from_attribution() {
    let analysis = engine().analyze("kitchen", &Kitchen).unwrap();
    let attributed = analysis.instrumented().unwrap().total_constraints();
    assert_eq!(attributed, 10);

    let discrepancy = analysis.discrepancy().unwrap();
    assert_eq!(discrepancy.instrumented, attributed);
    assert_eq!(discrepancy.compiled, analysis.total_constraints());
    assert!(discrepancy.compiled > attributed);
}
