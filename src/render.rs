// Training-plan rendering. Templates use `{{KEY}}` placeholders filled from
// the plan's substitution map.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::config::ExportFormat;
use crate::plan::{Substitutions, TemplateId, TrainingPlan};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template {template} uses `{{{{{placeholder}}}}}` but no value was supplied")]
    UnresolvedPlaceholder {
        template: TemplateId,
        placeholder: String,
    },

    #[error("failed to serialize render request: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait ReportRenderer {
    fn render(&self, template: TemplateId, substitutions: &Substitutions)
        -> Result<Vec<u8>, RenderError>;
}

const VBA_TEMPLATE: &str = "\
# Hitting Development Plan: {{PLAYER_NAME}}
_{{REPORT_DATE}}_

## Focus: Vertical Bat Angle

{{SUMMARY}}

## Drills

1. Top-hand tee work with a high tee, bat angle held below the hands.
2. Walk-through swings against an angled barrier.
3. Low-inside tee, finish with the barrel below the ball.
";

const ROT_ACC_TEMPLATE: &str = "\
# Hitting Development Plan: {{PLAYER_NAME}}
_{{REPORT_DATE}}_

## Focus: Rotational Acceleration

{{SUMMARY}}

## Drills

1. Step-back swings: load, step, rotate hips before shoulders.
2. Connection-ball swings to keep the arms tied to the torso.
3. Med-ball scoop tosses from a hitting stance.
";

const DECEL_TEMPLATE: &str = "\
# Hitting Development Plan: {{PLAYER_NAME}}
_{{REPORT_DATE}}_

## Focus: Deceleration

{{SUMMARY}}

## Drills

1. Front-leg block swings: land and post up into a firm front side.
2. Stop-at-contact swings, holding the finish for two seconds.
3. Rapid-fire hip turns with a hard stop.
";

fn builtin(template: TemplateId) -> &'static str {
    match template {
        TemplateId::Vba => VBA_TEMPLATE,
        TemplateId::RotAcc => ROT_ACC_TEMPLATE,
        TemplateId::Decel => DECEL_TEMPLATE,
    }
}

/// Replaces every `{{KEY}}` in `source`. A placeholder without a value is an
/// error; unmatched `{{` is copied through.
pub fn fill(
    template: TemplateId,
    source: &str,
    substitutions: &Substitutions,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let key = after[..end].trim();
        match substitutions.get(key) {
            Some(value) => out.push_str(value),
            None => {
                return Err(RenderError::UnresolvedPlaceholder {
                    template,
                    placeholder: key.to_string(),
                })
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Markdown templates read from `template_dir` (`<stem>.md`), falling back to
/// the builtin set when no directory is configured.
pub struct MarkdownRenderer {
    template_dir: Option<PathBuf>,
}

impl MarkdownRenderer {
    pub fn new(template_dir: Option<PathBuf>) -> Self {
        Self { template_dir }
    }

    fn source(&self, template: TemplateId) -> Result<String, RenderError> {
        match &self.template_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.md", template.file_stem()));
                debug!("loading template {}", path.display());
                std::fs::read_to_string(&path).map_err(|source| RenderError::Io { path, source })
            }
            None => Ok(builtin(template).to_string()),
        }
    }
}

impl ReportRenderer for MarkdownRenderer {
    fn render(
        &self,
        template: TemplateId,
        substitutions: &Substitutions,
    ) -> Result<Vec<u8>, RenderError> {
        let source = self.source(template)?;
        Ok(fill(template, &source, substitutions)?.into_bytes())
    }
}

/// Emits the render request itself so an external document renderer can
/// produce the word-processor or PDF output.
pub struct JsonRenderer;

#[derive(Serialize)]
struct RenderRequest<'a> {
    template: TemplateId,
    substitutions: &'a Substitutions,
}

impl ReportRenderer for JsonRenderer {
    fn render(
        &self,
        template: TemplateId,
        substitutions: &Substitutions,
    ) -> Result<Vec<u8>, RenderError> {
        let mut bytes = serde_json::to_vec_pretty(&RenderRequest {
            template,
            substitutions,
        })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

pub fn renderer_for(format: ExportFormat, template_dir: Option<PathBuf>) -> Box<dyn ReportRenderer> {
    match format {
        ExportFormat::Markdown => Box::new(MarkdownRenderer::new(template_dir)),
        ExportFormat::Json => Box::new(JsonRenderer),
    }
}

pub fn render_plan(renderer: &dyn ReportRenderer, plan: &TrainingPlan) -> Result<Vec<u8>, RenderError> {
    renderer.render(plan.template, &plan.substitutions)
}
