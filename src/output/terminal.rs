//! Terminal output formatting with colors and box drawing.

use colored::Colorize;
use gcmc_sampler_core::adaptive::{Evaluation, StepResult};
use gcmc_sampler_core::{ConditionResult, Isotherm, ReplicaStatus};

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v))
}

fn colored_status(result: &ConditionResult) -> String {
    let label = result.status_label();
    if result.finished {
        label.green().to_string()
    } else if result.equilibrated {
        label.yellow().to_string()
    } else {
        label.red().to_string()
    }
}

/// Format an isotherm as a table, one row per condition.
///
/// # Example output
///
/// ```text
///   Isotherm (3 points, 2 converged)
/// ──────────────────────────────────────────────────────────────
///         T [K]        P [Pa]          mean           std       g  status
///         300.0        1000.0        2.5000        0.1000     7.5  converged
/// ```
pub fn format_isotherm(isotherm: &Isotherm) -> String {
    let mut out = String::new();
    let sep = "\u{2500}".repeat(62);

    out.push_str(&format!(
        "  {} ({} points, {} converged)\n",
        "Isotherm".bold(),
        isotherm.len(),
        isotherm.converged()
    ));
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format!(
        "{:>12}  {:>12}  {:>12}  {:>12}  {:>6}  status\n",
        "T [K]", "P [Pa]", "mean", "std", "g"
    ));

    for point in isotherm.points() {
        out.push_str(&format!(
            "{:>12.1}  {:>12.1}  {:>12}  {:>12}  {:>6.1}  {}\n",
            point.condition.temperature,
            point.condition.pressure,
            format_optional(point.result.mean),
            format_optional(point.result.std),
            point.result.g,
            colored_status(&point.result)
        ));
    }
    out
}

/// Format one controller evaluation with its per-replica diagnostics.
pub fn format_evaluation(evaluation: &Evaluation) -> String {
    let mut out = String::new();
    let sep = "\u{2500}".repeat(62);

    out.push_str(&format!(
        "  {} iteration {}  g = {:.2}\n",
        evaluation.condition.to_string().bold(),
        evaluation.iteration,
        evaluation.verdict.g_total
    ));
    out.push_str(&sep);
    out.push('\n');

    for report in &evaluation.reports {
        let status = match report.status {
            ReplicaStatus::Equilibrated => report.status.to_string().green(),
            ReplicaStatus::InsufficientData => report.status.to_string().yellow(),
            ReplicaStatus::NotEquilibrated => report.status.to_string().red(),
        };
        out.push_str(&format!(
            "    replica {:<3} {:<20} eq = {:<10} g = {:<8} credit = {:.2}  mean = {}\n",
            report.replica,
            status,
            report
                .equilibration_step
                .map_or_else(|| "-".to_string(), |s| s.to_string()),
            report.g.map_or_else(|| "-".to_string(), |g| g.to_string()),
            report.credit,
            format_optional(report.mean)
        ));
    }

    match &evaluation.outcome {
        StepResult::Decision(result) => {
            out.push_str(&format!("\n  \u{2192} {}\n", colored_status(result)));
        }
        StepResult::Continue(request) => {
            out.push_str(&format!(
                "\n  \u{2192} continue ({}): {} steps over {} replicas\n",
                request.reason,
                request.total_steps,
                request.replicas.len()
            ));
        }
    }
    out
}
