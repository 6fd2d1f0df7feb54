use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Number of swing-test trials recorded per metric.
pub const TRIALS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BatSpeed,
    RotAcc,
    ExitVelo,
    Vba,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::BatSpeed,
        Metric::RotAcc,
        Metric::ExitVelo,
        Metric::Vba,
    ];

    /// Metrics that are percentile-ranked against the cohort.
    pub const SCORED: [Metric; 3] = [Metric::BatSpeed, Metric::RotAcc, Metric::ExitVelo];

    /// Column prefix used by the roster sheet, e.g. `"Rot. Acc. 3"`.
    pub fn column_prefix(self) -> &'static str {
        match self {
            Metric::BatSpeed => "Bat Speed",
            Metric::RotAcc => "Rot. Acc.",
            Metric::ExitVelo => "Exit Velo",
            Metric::Vba => "VBA",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::BatSpeed | Metric::ExitVelo => "mph",
            Metric::RotAcc => "g",
            Metric::Vba => "°",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_prefix())
    }
}

/// Five ordered readings for one metric. `None` marks a missing or
/// unparseable reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trials(pub [Option<f64>; TRIALS]);

impl Trials {
    pub fn complete(values: [f64; TRIALS]) -> Self {
        Trials(values.map(Some))
    }

    pub fn valid(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().filter_map(|v| *v)
    }

    pub fn valid_count(&self) -> usize {
        self.valid().count()
    }

    pub fn missing_count(&self) -> usize {
        TRIALS - self.valid_count()
    }

    pub fn mean(&self) -> Option<f64> {
        let count = self.valid_count();
        if count == 0 {
            return None;
        }
        Some(self.valid().sum::<f64>() / count as f64)
    }

    pub fn max(&self) -> Option<f64> {
        self.valid().reduce(f64::max)
    }

    pub fn count_above(&self, threshold: f64) -> usize {
        self.valid().filter(|v| *v > threshold).count()
    }

    pub fn count_below(&self, threshold: f64) -> usize {
        self.valid().filter(|v| *v < threshold).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwingTest {
    pub bat_speed: Trials,
    pub rot_acc: Trials,
    pub exit_velo: Trials,
    pub vba: Trials,
}

impl SwingTest {
    pub fn trials(&self, metric: Metric) -> &Trials {
        match metric {
            Metric::BatSpeed => &self.bat_speed,
            Metric::RotAcc => &self.rot_acc,
            Metric::ExitVelo => &self.exit_velo,
            Metric::Vba => &self.vba,
        }
    }

    pub fn trials_mut(&mut self, metric: Metric) -> &mut Trials {
        match metric {
            Metric::BatSpeed => &mut self.bat_speed,
            Metric::RotAcc => &mut self.rot_acc,
            Metric::ExitVelo => &mut self.exit_velo,
            Metric::Vba => &mut self.vba,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AthleteRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Raw bracket label as it appears in the sheet, e.g. `"12u"`.
    pub bracket_label: String,
    pub swings: SwingTest,
}

impl AthleteRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            bracket_label: self.bracket_label.clone(),
        }
    }
}

/// Read-only snapshot of the roster for one session.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub athletes: Vec<AthleteRecord>,
}

impl Roster {
    pub fn new(athletes: Vec<AthleteRecord>) -> Self {
        Self { athletes }
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerIdentity {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub bracket_label: String,
}

impl PlayerIdentity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One tile pair for a scored metric. Percentiles are `None` when the
/// cohort distribution was empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub avg: f64,
    pub avg_percentile: Option<u8>,
    pub max: f64,
    pub max_percentile: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Vba,
    RotAcc,
    Decel,
}

impl IssueCategory {
    pub fn label(self) -> &'static str {
        match self {
            IssueCategory::Vba => "VBA Issue",
            IssueCategory::RotAcc => "Rot. Acc. Issue",
            IssueCategory::Decel => "Decel. Pattern",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwingIssues {
    pub vba_high: usize,
    pub vba_low: usize,
    /// Thresholds the counts were taken against, in degrees.
    pub vba_high_deg: f64,
    pub vba_low_deg: f64,
    pub avg_vba: f64,
    pub category: IssueCategory,
}

impl SwingIssues {
    pub fn vba_issue(&self) -> bool {
        self.category == IssueCategory::Vba
    }

    pub fn rot_issue(&self) -> bool {
        self.category == IssueCategory::RotAcc
    }

    pub fn decel_pattern(&self) -> bool {
        self.category == IssueCategory::Decel
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub player: PlayerIdentity,
    /// Bracket the athlete was ranked in; `None` when ranked against the
    /// whole roster.
    pub bracket: Option<u32>,
    pub cohort_size: usize,
    pub bat_speed: MetricSummary,
    pub rot_acc: MetricSummary,
    pub exit_velo: MetricSummary,
    pub issues: SwingIssues,
}

impl EvaluationReport {
    pub fn summary(&self, metric: Metric) -> Option<&MetricSummary> {
        match metric {
            Metric::BatSpeed => Some(&self.bat_speed),
            Metric::RotAcc => Some(&self.rot_acc),
            Metric::ExitVelo => Some(&self.exit_velo),
            Metric::Vba => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trials_skip_missing_readings() {
        let trials = Trials([Some(60.0), None, Some(64.0), Some(62.0), Some(66.0)]);
        assert_eq!(trials.valid_count(), 4);
        assert_eq!(trials.missing_count(), 1);
        assert_eq!(trials.mean(), Some(63.0));
        assert_eq!(trials.max(), Some(66.0));
    }

    #[test]
    fn single_valid_trial_is_its_own_mean() {
        let trials = Trials([None, None, Some(71.5), None, None]);
        assert_eq!(trials.mean(), Some(71.5));
        assert_eq!(trials.max(), Some(71.5));
    }

    #[test]
    fn empty_trials_have_no_mean_or_max() {
        let trials = Trials::default();
        assert_eq!(trials.mean(), None);
        assert_eq!(trials.max(), None);
    }

    #[test]
    fn threshold_counts_are_strict() {
        let trials = Trials::complete([-24.0, -23.9, -45.0, -45.1, -30.0]);
        assert_eq!(trials.count_above(-24.0), 1);
        assert_eq!(trials.count_below(-45.0), 1);
    }
}
