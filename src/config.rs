// Settings loading (swing-report.toml): cohort grouping, issue thresholds,
// missing-trial policy and export options.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "swing-report.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub cohort: CohortSettings,
    pub issues: IssueThresholds,
    pub trials: TrialSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CohortSettings {
    /// Rank against same-bracket peers; when false, against the whole roster.
    pub group_by_age: bool,
}

impl Default for CohortSettings {
    fn default() -> Self {
        Self { group_by_age: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IssueThresholds {
    pub vba_high_deg: f64,
    pub vba_low_deg: f64,
    pub vba_trigger_count: usize,
    pub rot_acc_min_g: f64,
}

impl Default for IssueThresholds {
    fn default() -> Self {
        Self {
            vba_high_deg: -24.0,
            vba_low_deg: -45.0,
            vba_trigger_count: 3,
            rot_acc_min_g: 7.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTrialPolicy {
    /// Use whatever valid trials exist; fail only when a metric has none.
    #[default]
    Filter,
    /// Fail when any reading is missing.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrialSettings {
    pub missing: MissingTrialPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub template_dir: Option<PathBuf>,
}

/// Loads settings from an explicit path, which must exist.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let settings: Settings = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&settings)?;
    Ok(settings)
}

/// Explicit path if given, otherwise `swing-report.toml` in `base_dir` if it
/// exists, otherwise defaults.
pub fn load_settings(explicit: Option<&Path>, base_dir: &Path) -> Result<Settings, ConfigError> {
    if let Some(path) = explicit {
        return load_settings_from(path);
    }
    let candidate = base_dir.join(DEFAULT_CONFIG_FILE);
    if candidate.exists() {
        load_settings_from(&candidate)
    } else {
        Ok(Settings::default())
    }
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let issues = &settings.issues;

    let finite_fields: &[(&str, f64)] = &[
        ("issues.vba_high_deg", issues.vba_high_deg),
        ("issues.vba_low_deg", issues.vba_low_deg),
        ("issues.rot_acc_min_g", issues.rot_acc_min_g),
    ];
    for (name, val) in finite_fields {
        if !val.is_finite() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be a finite number, got {val}"),
            });
        }
    }

    if issues.vba_low_deg >= issues.vba_high_deg {
        return Err(ConfigError::ValidationError {
            field: "issues.vba_low_deg".into(),
            message: format!(
                "must be below issues.vba_high_deg ({}), got {}",
                issues.vba_high_deg, issues.vba_low_deg
            ),
        });
    }

    if !(1..=crate::models::TRIALS).contains(&issues.vba_trigger_count) {
        return Err(ConfigError::ValidationError {
            field: "issues.vba_trigger_count".into(),
            message: format!(
                "must be between 1 and {} inclusive, got {}",
                crate::models::TRIALS,
                issues.vba_trigger_count
            ),
        });
    }

    Ok(())
}
