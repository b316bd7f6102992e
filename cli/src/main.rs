use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use ark_constraint_counter::{
    report, Analysis, CostModel, CounterConfig, CountingEngine, CountingMode, FixtureCircuit,
    Reporter,
};
use ark_relations::r1cs::{ConstraintLayer, TracingMode};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Count the constraints a circuit compiles to, broken down by operation kind.
#[derive(Parser, Debug)]
#[command(name = "constraint-counter", version, about)]
struct Args {
    /// Circuit to analyze: `simple`, `complex` or `all`.
    #[arg(short, long, default_value = "simple")]
    circuit: String,

    /// List every recorded operation and log each one as it is recorded.
    #[arg(short, long)]
    verbose: bool,

    /// Whether to attribute constraints per kind.
    #[arg(long, value_enum, default_value_t = Mode::Instrumented)]
    mode: Mode,

    /// JSON file with a custom operation to kind cost table.
    #[arg(long, value_name = "FILE")]
    cost_model: Option<PathBuf>,

    /// Print the analysis as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Also check that the example assignment satisfies the circuit.
    #[arg(long)]
    check_witness: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Instrumented,
    CompileOnly,
}

impl From<Mode> for CountingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Instrumented => CountingMode::Instrumented,
            Mode::CompileOnly => CountingMode::CompileOnly,
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log filter")?;
    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .with(ConstraintLayer::new(TracingMode::OnlyConstraints));
    tracing::subscriber::set_global_default(subscriber).context("failed to install logger")
}

fn load_cost_model(path: &Path) -> Result<CostModel> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read cost model `{}`", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse cost model `{}`", path.display()))
}

fn selected_fixtures(selector: &str) -> Result<Vec<FixtureCircuit>> {
    if selector == "all" {
        return Ok(FixtureCircuit::ALL.to_vec());
    }
    Ok(vec![selector.parse()?])
}

fn print_json(analyses: &[Analysis]) -> Result<()> {
    let entries = analyses
        .iter()
        .map(|analysis| {
            serde_json::json!({
                "analysis": analysis,
                "breakdown": report::breakdown(analysis),
                "insights": report::insights(analysis),
            })
        })
        .collect::<Vec<_>>();
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &entries)?;
    writeln!(stdout)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let cost_model = match &args.cost_model {
        Some(path) => load_cost_model(path)?,
        None => CostModel::default(),
    };
    let engine = CountingEngine::new(CounterConfig {
        mode: args.mode.into(),
        cost_model,
        ..CounterConfig::default()
    });

    let fixtures = selected_fixtures(&args.circuit)?;
    let analyses = engine
        .analyze_batch(&fixtures)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    if args.check_witness {
        for fixture in &fixtures {
            engine.check_fixture(fixture.name())?;
        }
    }

    if args.json {
        return print_json(&analyses);
    }

    let reporter = Reporter::new(args.verbose);
    let mut stdout = io::stdout().lock();
    for analysis in &analyses {
        reporter.report(analysis, &mut stdout)?;
    }
    if args.check_witness {
        writeln!(stdout, "Example assignments satisfy every constraint.")?;
    }
    Ok(())
}
