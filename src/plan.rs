// Training-plan selection: the issue category picks one of three templates
// and fills a flat placeholder map from the evaluation report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{EvaluationReport, IssueCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateId {
    Vba,
    RotAcc,
    Decel,
}

impl TemplateId {
    pub fn for_category(category: IssueCategory) -> Self {
        match category {
            IssueCategory::Vba => TemplateId::Vba,
            IssueCategory::RotAcc => TemplateId::RotAcc,
            IssueCategory::Decel => TemplateId::Decel,
        }
    }

    /// Base name of the template file, e.g. `RotAcc_template`.
    pub fn file_stem(self) -> &'static str {
        match self {
            TemplateId::Vba => "VBA_template",
            TemplateId::RotAcc => "RotAcc_template",
            TemplateId::Decel => "Decel_template",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TemplateId::Vba => "VBA",
            TemplateId::RotAcc => "ROT_ACC",
            TemplateId::Decel => "DECEL",
        })
    }
}

pub type Substitutions = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingPlan {
    pub template: TemplateId,
    pub substitutions: Substitutions,
}

pub fn training_plan(report: &EvaluationReport, generated_on: NaiveDate) -> TrainingPlan {
    let template = TemplateId::for_category(report.issues.category);
    let first = &report.player.first_name;
    let exit_velo = format!("{:.1}", report.exit_velo.avg);

    let mut subs = Substitutions::new();
    subs.insert("PLAYER_NAME".into(), report.player.full_name());
    subs.insert("FIRST_NAME".into(), first.clone());
    subs.insert("EXIT_VELO_AVG".into(), exit_velo.clone());
    subs.insert(
        "REPORT_DATE".into(),
        generated_on.format("%B %-d, %Y").to_string(),
    );

    let summary = match template {
        TemplateId::Vba => {
            let vba_high = report.issues.vba_high.to_string();
            let avg_vba = format!("{:.1}", report.issues.avg_vba);
            let high_deg = report.issues.vba_high_deg;
            let summary = format!(
                "{first}'s exit velocity average was {exit_velo}mph and their swing test \
                 showed {vba_high} swings above {high_deg}°. Their average VBA was {avg_vba}°. \
                 Ideally, we want to see their bat more vertical. Once achieved, it will \
                 allow them to stay \"on plane\" with the ball longer, which enables them \
                 to hit the ball hard when their timing is off. The drills below will help, \
                 I recommend 3 sets of 8 reps of each."
            );
            subs.insert("VBA_HIGH".into(), vba_high);
            subs.insert("AVG_VBA".into(), avg_vba);
            summary
        }
        TemplateId::RotAcc => {
            let rot_acc = format!("{:.1}", report.rot_acc.avg);
            let summary = format!(
                "{first}'s exit velocity average was {exit_velo}mph. They were placed in \
                 this program because their Rotational Acceleration results averaged \
                 {rot_acc}g's (Ideally, we want this 15+). What this means is that they are \
                 rotating out of order (sequence), which will reduce their barrel accuracy \
                 & rotational speed. The drills listed below will help, I recommend 3 sets \
                 of 8 reps of each."
            );
            subs.insert("ROT_ACC_AVG".into(), rot_acc);
            summary
        }
        TemplateId::Decel => format!(
            "{first}'s exit velocity average was {exit_velo}mph. Based on the swing test \
             results, an area they need to focus on is deceleration. In order for one body \
             part to speed up the other needs to hit the brakes. Once achieved, their body \
             will rotate faster and more efficiently. The drills listed below will help, I \
             recommend 3 sets of 8-10 reps each."
        ),
    };
    subs.insert("SUMMARY".into(), summary);

    TrainingPlan {
        template,
        substitutions: subs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetricSummary, PlayerIdentity, SwingIssues};
    use uuid::Uuid;

    fn report(category: IssueCategory) -> EvaluationReport {
        let tile = |avg: f64| MetricSummary {
            avg,
            avg_percentile: Some(50),
            max: avg + 2.0,
            max_percentile: Some(50),
        };
        EvaluationReport {
            player: PlayerIdentity {
                id: Uuid::nil(),
                first_name: "Sam".into(),
                last_name: "Ortiz".into(),
                bracket_label: "12u".into(),
            },
            bracket: Some(12),
            cohort_size: 8,
            bat_speed: tile(61.25),
            rot_acc: tile(5.84),
            exit_velo: tile(71.96),
            issues: SwingIssues {
                vba_high: 3,
                vba_low: 1,
                vba_high_deg: -24.0,
                vba_low_deg: -45.0,
                avg_vba: -27.44,
                category,
            },
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    #[test]
    fn category_selects_template() {
        assert_eq!(training_plan(&report(IssueCategory::Vba), date()).template, TemplateId::Vba);
        assert_eq!(
            training_plan(&report(IssueCategory::RotAcc), date()).template,
            TemplateId::RotAcc
        );
        assert_eq!(
            training_plan(&report(IssueCategory::Decel), date()).template,
            TemplateId::Decel
        );
    }

    #[test]
    fn vba_plan_carries_vba_fields() {
        let plan = training_plan(&report(IssueCategory::Vba), date());
        let subs = &plan.substitutions;
        assert_eq!(subs["PLAYER_NAME"], "Sam Ortiz");
        assert_eq!(subs["EXIT_VELO_AVG"], "72.0");
        assert_eq!(subs["VBA_HIGH"], "3");
        assert_eq!(subs["AVG_VBA"], "-27.4");
        assert_eq!(subs["REPORT_DATE"], "March 7, 2026");
        assert!(!subs.contains_key("ROT_ACC_AVG"));
        assert!(subs["SUMMARY"].starts_with("Sam's exit velocity average was 72.0mph"));
        assert!(subs["SUMMARY"].contains("showed 3 swings above -24°"));
    }

    #[test]
    fn rotational_plan_carries_rot_acc_average() {
        let plan = training_plan(&report(IssueCategory::RotAcc), date());
        assert_eq!(plan.substitutions["ROT_ACC_AVG"], "5.8");
        assert!(plan.substitutions["SUMMARY"].contains("averaged 5.8g's"));
        assert!(!plan.substitutions.contains_key("VBA_HIGH"));
    }

    #[test]
    fn decel_plan_has_only_common_fields() {
        let plan = training_plan(&report(IssueCategory::Decel), date());
        let keys: Vec<&str> = plan.substitutions.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["EXIT_VELO_AVG", "FIRST_NAME", "PLAYER_NAME", "REPORT_DATE", "SUMMARY"]
        );
        assert!(plan.substitutions["SUMMARY"].contains("deceleration"));
    }

    #[test]
    fn template_ids_match_renderer_names() {
        assert_eq!(TemplateId::RotAcc.to_string(), "ROT_ACC");
        assert_eq!(TemplateId::Decel.file_stem(), "Decel_template");
        let json = serde_json::to_string(&TemplateId::RotAcc).unwrap();
        assert_eq!(json, "\"ROT_ACC\"");
    }
}
