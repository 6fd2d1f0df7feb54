// Roster loading from the swing-test sheet, bracket parsing and name search.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{AthleteRecord, Metric, Roster, SwingTest, Trials, TRIALS};

const FIRST_NAME: &str = "First Name";
const LAST_NAME: &str = "Last Name";
const AGE: &str = "age";

/// Cell values treated as a missing reading.
const MISSING_MARKERS: &[&str] = &["", "nan", "na", "n/a", "-", "null"];

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster is missing required column `{column}`")]
    MissingColumn { column: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed age bracket label `{label}`")]
pub struct MalformedBracket {
    pub label: String,
}

/// Supplies the roster snapshot for a session.
pub trait DataSource {
    fn load(&self) -> Result<Roster, RosterError>;
}

pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for CsvDataSource {
    fn load(&self) -> Result<Roster, RosterError> {
        let file = std::fs::File::open(&self.path).map_err(|source| RosterError::Io {
            path: self.path.clone(),
            source,
        })?;
        load_from_reader(file)
    }
}

/// Parses a roster sheet. Rows with a blank name are skipped; unparseable
/// readings become missing trials, as do cells cut off a short row.
pub fn load_from_reader<R: Read>(rdr: R) -> Result<Roster, RosterError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers = reader.headers()?.clone();
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();

    let column = |name: &str| -> Result<usize, RosterError> {
        columns
            .get(name)
            .or_else(|| {
                columns
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, idx)| idx)
            })
            .copied()
            .ok_or_else(|| RosterError::MissingColumn {
                column: name.to_string(),
            })
    };

    let first_idx = column(FIRST_NAME)?;
    let last_idx = column(LAST_NAME)?;
    let age_idx = column(AGE)?;

    let mut trial_columns = Vec::with_capacity(Metric::ALL.len() * TRIALS);
    for metric in Metric::ALL {
        for trial in 0..TRIALS {
            let idx = column(&format!("{} {}", metric.column_prefix(), trial + 1))?;
            trial_columns.push((metric, trial, idx));
        }
    }

    let mut athletes = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed roster row {}: {}", row + 1, e);
                continue;
            }
        };
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let first_name = cell(first_idx).to_string();
        let last_name = cell(last_idx).to_string();
        if first_name.is_empty() && last_name.is_empty() {
            debug!("skipping roster row {} with no name", row + 1);
            continue;
        }

        let bracket_label = cell(age_idx).to_string();
        if let Err(e) = parse_bracket(&bracket_label) {
            warn!("{} {}: {}", first_name, last_name, e);
        }

        let mut swings = SwingTest::default();
        for &(metric, trial, idx) in &trial_columns {
            swings.trials_mut(metric).0[trial] = parse_reading(cell(idx));
        }

        athletes.push(AthleteRecord {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            bracket_label,
            swings,
        });
    }

    Ok(Roster::new(athletes))
}

/// Parses an "under-N" bracket label such as `"12u"` into `12`.
pub fn parse_bracket(label: &str) -> Result<u32, MalformedBracket> {
    let trimmed = label.trim();
    let digits = trimmed
        .strip_suffix(['u', 'U'])
        .unwrap_or(trimmed)
        .trim();
    digits.parse::<u32>().map_err(|_| MalformedBracket {
        label: label.to_string(),
    })
}

fn parse_reading(raw: &str) -> Option<f64> {
    if MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Case-insensitive substring match on first or last name, in roster order.
pub fn search<'a>(roster: &'a Roster, query: &str) -> Vec<&'a AthleteRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    roster
        .athletes
        .iter()
        .filter(|a| {
            a.first_name.to_lowercase().contains(&needle)
                || a.last_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Option label shown when several athletes match, e.g. `"Sam Ortiz (12u)"`.
pub fn match_label(athlete: &AthleteRecord) -> String {
    format!("{} ({})", athlete.full_name(), athlete.bracket_label)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SHEET: &str = "\
First Name,Last Name,age,Bat Speed 1,Bat Speed 2,Bat Speed 3,Bat Speed 4,Bat Speed 5,Rot. Acc. 1,Rot. Acc. 2,Rot. Acc. 3,Rot. Acc. 4,Rot. Acc. 5,Exit Velo 1,Exit Velo 2,Exit Velo 3,Exit Velo 4,Exit Velo 5,VBA 1,VBA 2,VBA 3,VBA 4,VBA 5
Sam,Ortiz,12u,60,62,61,,63,8,9,10,11,12,70,72,71,73,74,-30,-32,-35,-38,-40
Jordan,Samuels,12u,55,56,57,58,59,5,6,6.5,5.5,6,65,66,67,68,69,-31,-33,-36,-34,-35
Riley,Chen,14u,70,71,72,73,74,12,13,14,15,16,80,81,82,83,84,-10,-15,-22,-50,-60
Casey,Brooks,1Xu,50,51,52,53,54,7,7,7,7,7,60,61,62,63,64,-30,-30,-30,-30,-30
";

    #[test]
    fn loads_every_named_row() {
        let roster = load_from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(roster.len(), 4);
        let sam = &roster.athletes[0];
        assert_eq!(sam.first_name, "Sam");
        assert_eq!(sam.bracket_label, "12u");
        assert_eq!(sam.swings.bat_speed.0[3], None);
        assert_eq!(sam.swings.bat_speed.valid_count(), 4);
        assert_eq!(sam.swings.vba.0[4], Some(-40.0));
    }

    #[test]
    fn short_row_keeps_athlete_with_trailing_readings_missing() {
        let header = SHEET.lines().next().unwrap();
        let sheet = format!(
            "{header}\nDrew,Park,10u,50,51,52,53,54,7,7,7,7,7,60,61,62,63,64,-30,-31,-32,-33\n"
        );
        let roster = load_from_reader(sheet.as_bytes()).unwrap();
        assert_eq!(roster.len(), 1);
        let drew = &roster.athletes[0];
        assert_eq!(drew.swings.vba.0[3], Some(-33.0));
        assert_eq!(drew.swings.vba.0[4], None);
        assert_eq!(drew.swings.vba.valid_count(), 4);
    }

    #[test]
    fn missing_column_is_reported() {
        let sheet = "First Name,Last Name,age\nSam,Ortiz,12u\n";
        let err = load_from_reader(sheet.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            RosterError::MissingColumn { ref column } if column == "Bat Speed 1"
        ));
    }

    #[test]
    fn missing_markers_and_garbage_become_none() {
        assert_eq!(parse_reading("NaN"), None);
        assert_eq!(parse_reading("N/A"), None);
        assert_eq!(parse_reading(""), None);
        assert_eq!(parse_reading("fast"), None);
        assert_eq!(parse_reading("inf"), None);
        assert_eq!(parse_reading("-42.5"), Some(-42.5));
    }

    #[test]
    fn bracket_labels_parse_to_integers() {
        assert_eq!(parse_bracket("12u"), Ok(12));
        assert_eq!(parse_bracket(" 9U "), Ok(9));
        assert_eq!(parse_bracket("14"), Ok(14));
        assert_eq!(
            parse_bracket("1Xu"),
            Err(MalformedBracket {
                label: "1Xu".to_string()
            })
        );
        assert!(parse_bracket("u").is_err());
    }

    #[test]
    fn search_matches_first_or_last_name_case_insensitively() {
        let roster = load_from_reader(SHEET.as_bytes()).unwrap();

        let hits = search(&roster, "sam");
        let names: Vec<String> = hits.iter().map(|a| a.full_name()).collect();
        assert_eq!(names, vec!["Sam Ortiz", "Jordan Samuels"]);

        assert_eq!(search(&roster, "CHEN").len(), 1);
        assert!(search(&roster, "zed").is_empty());
        assert!(search(&roster, "  ").is_empty());
    }

    #[test]
    fn match_label_includes_bracket() {
        let roster = load_from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(match_label(&roster.athletes[2]), "Riley Chen (14u)");
    }

    #[test]
    fn csv_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvDataSource::new(dir.path().join("absent.csv"))
            .load()
            .unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }
}
