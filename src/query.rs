// One search -> select -> evaluate cycle. Evaluation failures stop here and
// come back as a structured outcome.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::evaluate::{evaluate_in_roster, EvaluationError};
use crate::models::{EvaluationReport, PlayerIdentity, Roster};
use crate::roster::{match_label, search};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingData,
    IncompleteTrials,
    MalformedBracket,
    InvalidSelection,
}

impl From<&EvaluationError> for FailureKind {
    fn from(err: &EvaluationError) -> Self {
        match err {
            EvaluationError::MissingData { .. } => FailureKind::MissingData,
            EvaluationError::IncompleteTrials { .. } => FailureKind::IncompleteTrials,
            EvaluationError::MalformedBracket(_) => FailureKind::MalformedBracket,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Evaluated {
        /// Labels of every match, in roster order.
        matches: Vec<String>,
        report: EvaluationReport,
    },
    NoPlayerFound {
        query: String,
    },
    Failed {
        matches: Vec<String>,
        player: Option<PlayerIdentity>,
        kind: FailureKind,
        message: String,
    },
}

/// Searches the roster and evaluates the `pick`-th match (1-based).
pub fn run_query(roster: &Roster, query: &str, pick: usize, settings: &Settings) -> QueryOutcome {
    let hits = search(roster, query);
    if hits.is_empty() {
        info!("no player found for {:?}", query);
        return QueryOutcome::NoPlayerFound {
            query: query.to_string(),
        };
    }
    let matches: Vec<String> = hits.iter().map(|a| match_label(a)).collect();

    let Some(athlete) = pick.checked_sub(1).and_then(|idx| hits.get(idx)) else {
        return QueryOutcome::Failed {
            message: format!("pick {} is out of range; {} player(s) matched", pick, hits.len()),
            matches,
            player: None,
            kind: FailureKind::InvalidSelection,
        };
    };

    info!("evaluating {} ({} match(es))", match_label(athlete), hits.len());
    match evaluate_in_roster(roster, athlete, settings) {
        Ok(report) => QueryOutcome::Evaluated { matches, report },
        Err(err) => {
            warn!("unable to calculate stats: {}", err);
            QueryOutcome::Failed {
                matches,
                player: Some(athlete.identity()),
                kind: FailureKind::from(&err),
                message: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueCategory;
    use crate::roster::load_from_reader;
    use crate::roster::tests::SHEET;

    fn roster() -> Roster {
        load_from_reader(SHEET.as_bytes()).unwrap()
    }

    #[test]
    fn unknown_name_is_no_player_found() {
        let outcome = run_query(&roster(), "zed", 1, &Settings::default());
        assert_eq!(
            outcome,
            QueryOutcome::NoPlayerFound {
                query: "zed".to_string()
            }
        );
    }

    #[test]
    fn picks_among_several_matches() {
        let roster = roster();
        let QueryOutcome::Evaluated { matches, report } =
            run_query(&roster, "sam", 2, &Settings::default())
        else {
            panic!("expected an evaluation");
        };
        assert_eq!(matches, vec!["Sam Ortiz (12u)", "Jordan Samuels (12u)"]);
        assert_eq!(report.player.full_name(), "Jordan Samuels");
        assert_eq!(report.bracket, Some(12));
        assert_eq!(report.issues.category, IssueCategory::RotAcc);
        assert_eq!(report.bat_speed.avg_percentile, Some(50));
    }

    #[test]
    fn out_of_range_pick_is_invalid_selection() {
        for pick in [0, 3] {
            let outcome = run_query(&roster(), "sam", pick, &Settings::default());
            assert!(matches!(
                outcome,
                QueryOutcome::Failed {
                    kind: FailureKind::InvalidSelection,
                    player: None,
                    ..
                }
            ));
        }
    }

    #[test]
    fn malformed_bracket_surfaces_as_failure() {
        let QueryOutcome::Failed { kind, player, message, .. } =
            run_query(&roster(), "casey", 1, &Settings::default())
        else {
            panic!("expected a failure");
        };
        assert_eq!(kind, FailureKind::MalformedBracket);
        assert_eq!(player.map(|p| p.first_name), Some("Casey".to_string()));
        assert_eq!(message, "malformed age bracket label `1Xu`");
    }

    #[test]
    fn vba_scenario_from_sheet() {
        let QueryOutcome::Evaluated { report, .. } =
            run_query(&roster(), "riley", 1, &Settings::default())
        else {
            panic!("expected an evaluation");
        };
        assert_eq!(report.issues.category, IssueCategory::Vba);
        assert_eq!(report.issues.vba_high, 3);
        assert_eq!(report.issues.vba_low, 2);
        assert_eq!(report.cohort_size, 1);
        assert_eq!(report.exit_velo.max_percentile, Some(100));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome = run_query(&roster(), "zed", 1, &Settings::default());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "no_player_found");
        assert_eq!(value["query"], "zed");
    }
}
