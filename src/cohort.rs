// Peer-comparison baselines: per-athlete mean and max distributions for a
// bracket, and percentile rank against them.

use tracing::{debug, warn};

use crate::models::{AthleteRecord, Metric, Roster};
use crate::roster::parse_bracket;

/// Which athletes count as peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CohortScope {
    Bracket(u32),
    Roster,
}

impl CohortScope {
    fn contains(self, athlete: &AthleteRecord) -> bool {
        match self {
            CohortScope::Roster => true,
            CohortScope::Bracket(target) => match parse_bracket(&athlete.bracket_label) {
                Ok(bracket) => bracket == target,
                Err(e) => {
                    debug!("{} left out of bracket {}: {}", athlete.full_name(), target, e);
                    false
                }
            },
        }
    }

    pub fn bracket(self) -> Option<u32> {
        match self {
            CohortScope::Bracket(b) => Some(b),
            CohortScope::Roster => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortDistribution {
    pub means: Vec<f64>,
    pub maxes: Vec<f64>,
}

/// Collects one mean-of-trials and one max-of-trials entry per athlete in
/// scope. Athletes with no valid trials for `metric` contribute nothing,
/// not even to the denominator, so they never pull percentiles down.
pub fn build_cohort(roster: &Roster, scope: CohortScope, metric: Metric) -> CohortDistribution {
    let mut dist = CohortDistribution::default();
    for athlete in roster.athletes.iter().filter(|a| scope.contains(a)) {
        let trials = athlete.swings.trials(metric);
        match (trials.mean(), trials.max()) {
            (Some(mean), Some(max)) => {
                dist.means.push(mean);
                dist.maxes.push(max);
            }
            _ => debug!(
                "{} has no valid {} trials; excluded from cohort",
                athlete.full_name(),
                metric
            ),
        }
    }
    dist
}

/// Share of `distribution` at or below `value`, as a whole percentage.
/// Halves round to even. `None` for an empty distribution.
pub fn percentile(value: f64, distribution: &[f64]) -> Option<u8> {
    if distribution.is_empty() {
        return None;
    }
    let at_or_below = distribution.iter().filter(|v| **v <= value).count();
    let pct = 100.0 * at_or_below as f64 / distribution.len() as f64;
    Some(pct.round_ties_even() as u8)
}

/// Baselines for the three scored metrics of one cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortStatistics {
    pub scope: CohortScope,
    pub bat_speed: CohortDistribution,
    pub rot_acc: CohortDistribution,
    pub exit_velo: CohortDistribution,
}

impl CohortStatistics {
    pub fn build(roster: &Roster, scope: CohortScope) -> Self {
        let stats = Self {
            scope,
            bat_speed: build_cohort(roster, scope, Metric::BatSpeed),
            rot_acc: build_cohort(roster, scope, Metric::RotAcc),
            exit_velo: build_cohort(roster, scope, Metric::ExitVelo),
        };
        if stats.size() == 0 {
            warn!("cohort {:?} is empty; percentiles will be unavailable", scope);
        }
        stats
    }

    /// `None` for VBA, which is not ranked.
    pub fn distribution(&self, metric: Metric) -> Option<&CohortDistribution> {
        match metric {
            Metric::BatSpeed => Some(&self.bat_speed),
            Metric::RotAcc => Some(&self.rot_acc),
            Metric::ExitVelo => Some(&self.exit_velo),
            Metric::Vba => None,
        }
    }

    /// Largest per-metric membership; metrics can differ when some athletes
    /// lack valid trials for one of them.
    pub fn size(&self) -> usize {
        Metric::SCORED
            .iter()
            .filter_map(|m| self.distribution(*m))
            .map(|d| d.means.len())
            .max()
            .unwrap_or(0)
    }
}
