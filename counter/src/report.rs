use core::fmt::{self, Write as _};
use std::io;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    engine::{Analysis, CountingMode, SCALAR_FIELD_NAME},
    kind::ConstraintKind,
};

const WIDE_RULE: usize = 60;
const NARROW_RULE: usize = 40;

/// Circuits below this many constraints are considered efficient.
pub const EFFICIENT_BELOW: usize = 100;
/// Circuits at or above this many constraints should be optimized.
pub const OPTIMIZE_FROM: usize = 1000;

/// One row of the per-kind breakdown.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct KindShare {
    /// The kind.
    pub kind: ConstraintKind,
    /// Constraints attributed to it.
    pub count: usize,
    /// `count` as a percentage of the compiled constraint count.
    pub percentage: f64,
}

/// A qualitative hint derived from the counts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Insight {
    /// The circuit emitted no constraints at all.
    NoConstraints,
    /// Fewer than [`EFFICIENT_BELOW`] constraints.
    Efficient,
    /// Between [`EFFICIENT_BELOW`] and [`OPTIMIZE_FROM`] constraints.
    Moderate,
    /// At least [`OPTIMIZE_FROM`] constraints.
    ConsiderOptimization,
    /// More than half of all constraints are multiplications.
    MultiplicationHeavy,
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Insight::NoConstraints => {
                "No constraints detected - circuit may use only linear operations"
            },
            Insight::Efficient => "Low constraint count - efficient circuit",
            Insight::Moderate => "Moderate constraint count - reasonable complexity",
            Insight::ConsiderOptimization => "High constraint count - consider optimization",
            Insight::MultiplicationHeavy => {
                "Multiplication-heavy circuit - consider reducing Mul operations"
            },
        })
    }
}

/// The hints for `analysis`, judged against the compiled count.
pub fn insights(analysis: &Analysis) -> Vec<Insight> {
    let total = analysis.total_constraints();
    let mut insights = vec![match total {
        0 => Insight::NoConstraints,
        t if t < EFFICIENT_BELOW => Insight::Efficient,
        t if t < OPTIMIZE_FROM => Insight::Moderate,
        _ => Insight::ConsiderOptimization,
    }];
    let multiplications = analysis
        .instrumented()
        .map_or(0, |stats| stats.count(ConstraintKind::Mul));
    if multiplications > total / 2 {
        insights.push(Insight::MultiplicationHeavy);
    }
    insights
}

/// The per-kind breakdown, largest first, as shares of the compiled count.
/// Kinds with equal counts keep the order in which they were first observed.
/// Empty when nothing was attributed or nothing was compiled.
#[allow(clippy::cast_precision_loss)]
pub fn breakdown(analysis: &Analysis) -> Vec<KindShare> {
    let Some(stats) = analysis.instrumented() else {
        return Vec::new();
    };
    let total = analysis.total_constraints();
    if total == 0 {
        return Vec::new();
    }
    stats
        .by_kind()
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .map(|(kind, count)| KindShare {
            kind,
            count,
            percentage: count as f64 / total as f64 * 100.0,
        })
        .collect()
}

/// Renders an [`Analysis`] as a plain-text report.
#[derive(Copy, Clone, Debug, Default)]
pub struct Reporter {
    /// Also list every recorded observation.
    pub verbose: bool,
}

impl Reporter {
    /// A reporter, listing observations when `verbose` is set.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Write the report for `analysis` to `out`.
    pub fn report<W: io::Write>(&self, analysis: &Analysis, out: &mut W) -> io::Result<()> {
        out.write_all(self.render(analysis).as_bytes())
    }

    /// The report for `analysis`.
    pub fn render(&self, analysis: &Analysis) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.write_report(analysis, &mut out);
        out
    }

    fn write_report(&self, analysis: &Analysis, out: &mut String) -> fmt::Result {
        let wide = "=".repeat(WIDE_RULE);
        let narrow = "-".repeat(NARROW_RULE);

        writeln!(out, "\n{wide}")?;
        writeln!(out, "CONSTRAINT ANALYSIS REPORT")?;
        writeln!(out, "{wide}")?;
        writeln!(out, "Circuit Name: {}", analysis.circuit_name())?;
        writeln!(
            out,
            "Builder: {} over {SCALAR_FIELD_NAME}",
            analysis.builder().name()
        )?;
        writeln!(out, "Total Constraints: {}", analysis.total_constraints())?;
        writeln!(
            out,
            "Variables: {} instance, {} witness",
            analysis.num_instance_variables(),
            analysis.num_witness_variables()
        )?;
        writeln!(out, "Analysis Time: {:?}", analysis.elapsed())?;
        writeln!(out)?;

        writeln!(out, "CONSTRAINTS BY TYPE:")?;
        writeln!(out, "{narrow}")?;
        match (analysis.mode(), analysis.instrumented()) {
            (CountingMode::Instrumented, Some(stats)) => {
                writeln!(
                    out,
                    "Attributed: {} (cost model `{}`)",
                    stats.total_constraints(),
                    analysis.cost_model()
                )?;
                if analysis.total_constraints() == 0 {
                    writeln!(out, "No constraints were generated.")?;
                } else if stats.total_constraints() == 0 {
                    writeln!(out, "No constraints were attributed to any operation.")?;
                }
                for share in breakdown(analysis) {
                    writeln!(
                        out,
                        "{:<20}: {:>6} ({:>5.1}%)",
                        share.kind.label(),
                        share.count,
                        share.percentage
                    )?;
                }
            },
            _ => writeln!(out, "Not available in compile-only mode.")?,
        }
        writeln!(out)?;

        if let Some(discrepancy) = analysis.discrepancy() {
            writeln!(
                out,
                "NOTE: {discrepancy}; the compiled count is authoritative."
            )?;
            writeln!(out)?;
        }

        if self.verbose {
            if let Some(stats) = analysis.instrumented() {
                writeln!(out, "DETAILED OPERATIONS:")?;
                writeln!(out, "{narrow}")?;
                for (i, observation) in stats.log().iter().enumerate() {
                    writeln!(
                        out,
                        "{:>3}. {:<20} {:<20} (cost: {})",
                        i + 1,
                        observation.operation_name(),
                        observation.kind.label(),
                        observation.cost
                    )?;
                }
                writeln!(out)?;
            }
        }

        writeln!(out, "PERFORMANCE INSIGHTS:")?;
        writeln!(out, "{narrow}")?;
        for insight in insights(analysis) {
            writeln!(out, "\u{2022} {insight}")?;
        }
        writeln!(out, "{wide}")
    }
}
