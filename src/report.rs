use std::fmt::Write;

use crate::models::{EvaluationReport, IssueCategory, Metric, MetricSummary};
use crate::query::QueryOutcome;

fn percentile_label(pct: Option<u8>) -> String {
    match pct {
        Some(p) => format!("{p}%ile"),
        None => "n/a".to_string(),
    }
}

fn tile_title(metric: Metric) -> String {
    format!("{} ({})", metric.column_prefix(), metric.unit())
}

fn write_tiles(
    output: &mut String,
    report: &EvaluationReport,
    pick: impl Fn(&MetricSummary) -> (f64, Option<u8>),
) {
    for metric in Metric::SCORED {
        if let Some(summary) = report.summary(metric) {
            let (value, pct) = pick(summary);
            let _ = writeln!(
                output,
                "- {}: {:.1} ({})",
                tile_title(metric),
                value,
                percentile_label(pct)
            );
        }
    }
}

pub fn build_dashboard(report: &EvaluationReport) -> String {
    let mut output = String::new();
    let player = &report.player;

    let _ = writeln!(
        output,
        "# {} ({})",
        player.full_name(),
        player.bracket_label
    );
    let cohort_label = match report.bracket {
        Some(bracket) => format!("{bracket}u peers"),
        None => "the full roster".to_string(),
    };
    let _ = writeln!(
        output,
        "Ranked against {} ({} athletes)",
        cohort_label, report.cohort_size
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Avg Metrics");
    write_tiles(&mut output, report, |s| (s.avg, s.avg_percentile));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Max Metrics");
    write_tiles(&mut output, report, |s| (s.max, s.max_percentile));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Swing Issues");
    let issues = &report.issues;
    match issues.category {
        IssueCategory::Vba => {
            let _ = writeln!(
                output,
                "{}: {} swings >{}°, {} swings <{}°",
                issues.category.label(),
                issues.vba_high,
                issues.vba_high_deg,
                issues.vba_low,
                issues.vba_low_deg
            );
        }
        IssueCategory::RotAcc => {
            let _ = writeln!(
                output,
                "{}: Avg {:.1}g",
                issues.category.label(),
                report.rot_acc.avg
            );
        }
        IssueCategory::Decel => {
            let _ = writeln!(output, "{}", issues.category.label());
        }
    }
    let _ = writeln!(output, "Average VBA: {:.1}°", issues.avg_vba);

    output
}

/// Console rendering of any query outcome.
pub fn build_outcome(outcome: &QueryOutcome) -> String {
    let mut output = String::new();
    match outcome {
        QueryOutcome::NoPlayerFound { query } => {
            let _ = writeln!(output, "No player found for \"{query}\".");
        }
        QueryOutcome::Evaluated { matches, report } => {
            write_matches(&mut output, matches);
            output.push_str(&build_dashboard(report));
        }
        QueryOutcome::Failed {
            matches, message, ..
        } => {
            write_matches(&mut output, matches);
            let _ = writeln!(output, "Unable to calculate stats: {message}");
        }
    }
    output
}

fn write_matches(output: &mut String, matches: &[String]) {
    if matches.len() < 2 {
        return;
    }
    let _ = writeln!(output, "{} players matched:", matches.len());
    for (idx, label) in matches.iter().enumerate() {
        let _ = writeln!(output, "  {}. {}", idx + 1, label);
    }
    let _ = writeln!(output);
}
