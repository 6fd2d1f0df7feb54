// Athlete evaluation: per-metric averages and maxima ranked against the
// cohort, plus the ordered swing-issue classification.

use tracing::{debug, warn};

use crate::cohort::{percentile, CohortScope, CohortStatistics};
use crate::config::{IssueThresholds, MissingTrialPolicy, Settings};
use crate::models::{
    AthleteRecord, EvaluationReport, IssueCategory, Metric, MetricSummary, Roster, SwingIssues,
    Trials,
};
use crate::roster::{parse_bracket, MalformedBracket};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("{athlete} has no valid {metric} trials")]
    MissingData { athlete: String, metric: Metric },

    #[error("{athlete} is missing {missing} {metric} trial(s)")]
    IncompleteTrials {
        athlete: String,
        metric: Metric,
        missing: usize,
    },

    #[error(transparent)]
    MalformedBracket(#[from] MalformedBracket),
}

/// Evaluates one athlete against a prebuilt cohort.
pub fn evaluate(
    athlete: &AthleteRecord,
    cohort: &CohortStatistics,
    thresholds: &IssueThresholds,
    policy: MissingTrialPolicy,
) -> Result<EvaluationReport, EvaluationError> {
    check_trials(athlete, policy)?;

    let bat_speed = summarize(athlete, cohort, Metric::BatSpeed)?;
    let rot_acc = summarize(athlete, cohort, Metric::RotAcc)?;
    let exit_velo = summarize(athlete, cohort, Metric::ExitVelo)?;
    let issues = classify(athlete, &athlete.swings.vba, rot_acc.avg, thresholds)?;

    debug!(
        "{} classified as {:?} (vba_high={}, vba_low={}, rot_acc_avg={:.2})",
        athlete.full_name(),
        issues.category,
        issues.vba_high,
        issues.vba_low,
        rot_acc.avg
    );

    Ok(EvaluationReport {
        player: athlete.identity(),
        bracket: cohort.scope.bracket(),
        cohort_size: cohort.size(),
        bat_speed,
        rot_acc,
        exit_velo,
        issues,
    })
}

/// Builds the athlete's cohort from the roster snapshot per `settings`, then
/// evaluates.
pub fn evaluate_in_roster(
    roster: &Roster,
    athlete: &AthleteRecord,
    settings: &Settings,
) -> Result<EvaluationReport, EvaluationError> {
    let scope = if settings.cohort.group_by_age {
        CohortScope::Bracket(parse_bracket(&athlete.bracket_label)?)
    } else {
        CohortScope::Roster
    };
    let cohort = CohortStatistics::build(roster, scope);
    evaluate(athlete, &cohort, &settings.issues, settings.trials.missing)
}

fn check_trials(athlete: &AthleteRecord, policy: MissingTrialPolicy) -> Result<(), EvaluationError> {
    for metric in Metric::ALL {
        let trials = athlete.swings.trials(metric);
        if trials.valid_count() == 0 {
            return Err(EvaluationError::MissingData {
                athlete: athlete.full_name(),
                metric,
            });
        }
        if policy == MissingTrialPolicy::Strict && trials.missing_count() > 0 {
            return Err(EvaluationError::IncompleteTrials {
                athlete: athlete.full_name(),
                metric,
                missing: trials.missing_count(),
            });
        }
    }
    Ok(())
}

fn summarize(
    athlete: &AthleteRecord,
    cohort: &CohortStatistics,
    metric: Metric,
) -> Result<MetricSummary, EvaluationError> {
    let trials = athlete.swings.trials(metric);
    let missing = || EvaluationError::MissingData {
        athlete: athlete.full_name(),
        metric,
    };
    let avg = trials.mean().ok_or_else(missing)?;
    let max = trials.max().ok_or_else(missing)?;

    let (avg_percentile, max_percentile) = match cohort.distribution(metric) {
        Some(dist) => (percentile(avg, &dist.means), percentile(max, &dist.maxes)),
        None => (None, None),
    };
    if avg_percentile.is_none() {
        warn!(
            "no {} peers for {}; percentile unavailable",
            metric,
            athlete.full_name()
        );
    }

    Ok(MetricSummary {
        avg,
        avg_percentile,
        max,
        max_percentile,
    })
}

/// First match wins: VBA outside the window, then low rotational
/// acceleration, then deceleration as the fallback.
fn classify(
    athlete: &AthleteRecord,
    vba: &Trials,
    rot_acc_avg: f64,
    thresholds: &IssueThresholds,
) -> Result<SwingIssues, EvaluationError> {
    let avg_vba = vba.mean().ok_or_else(|| EvaluationError::MissingData {
        athlete: athlete.full_name(),
        metric: Metric::Vba,
    })?;
    let vba_high = vba.count_above(thresholds.vba_high_deg);
    let vba_low = vba.count_below(thresholds.vba_low_deg);

    let category = if vba_high >= thresholds.vba_trigger_count
        || vba_low >= thresholds.vba_trigger_count
    {
        IssueCategory::Vba
    } else if rot_acc_avg < thresholds.rot_acc_min_g {
        IssueCategory::RotAcc
    } else {
        IssueCategory::Decel
    };

    Ok(SwingIssues {
        vba_high,
        vba_low,
        vba_high_deg: thresholds.vba_high_deg,
        vba_low_deg: thresholds.vba_low_deg,
        avg_vba,
        category,
    })
}
