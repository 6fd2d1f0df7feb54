use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use swing_report::config::{self, ExportFormat};
use swing_report::query::{self, QueryOutcome};
use swing_report::roster::{self, DataSource};
use swing_report::{plan, render, report};

#[derive(Parser)]
#[command(name = "swing-report")]
#[command(about = "Swing-test lookup and training-plan export for hitting programs", long_about = None)]
struct Cli {
    /// Swing-test roster sheet (CSV)
    #[arg(long, env = "SWING_ROSTER", default_value = "Testing Metrics.csv")]
    roster: PathBuf,

    /// Settings file; defaults to ./swing-report.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List athletes whose first or last name contains the query
    Search { query: String },
    /// Show metrics, peer percentiles and the swing issue for one athlete
    Evaluate {
        query: String,
        /// Which match to evaluate when several athletes match (1-based)
        #[arg(long, default_value_t = 1)]
        pick: usize,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the athlete's training plan
    Export {
        query: String,
        #[arg(long, default_value_t = 1)]
        pick: usize,
        /// Overrides the configured export format
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,
        /// Output file; defaults to "<First>_<Last>_plan.<ext>"
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let settings = config::load_settings(cli.config.as_deref(), &cwd)
        .context("failed to load settings")?;

    let roster = roster::CsvDataSource::new(&cli.roster)
        .load()
        .with_context(|| format!("failed to load roster {}", cli.roster.display()))?;
    if roster.is_empty() {
        warn!("roster {} has no athletes", cli.roster.display());
    }
    info!("loaded {} athletes from {}", roster.len(), cli.roster.display());

    match cli.command {
        Commands::Search { query } => {
            let hits = roster::search(&roster, &query);
            if hits.is_empty() {
                println!("No player found.");
                return Ok(());
            }
            for (idx, athlete) in hits.iter().enumerate() {
                println!("{}. {}", idx + 1, roster::match_label(athlete));
            }
        }
        Commands::Evaluate { query, pick, json } => {
            let outcome = query::run_query(&roster, &query, pick, &settings);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", report::build_outcome(&outcome));
            }
            if matches!(outcome, QueryOutcome::Failed { .. }) {
                std::process::exit(2);
            }
        }
        Commands::Export {
            query,
            pick,
            format,
            out,
        } => {
            let outcome = query::run_query(&roster, &query, pick, &settings);
            let QueryOutcome::Evaluated {
                report: evaluation, ..
            } = &outcome
            else {
                print!("{}", report::build_outcome(&outcome));
                std::process::exit(2);
            };

            let format = format.unwrap_or(settings.export.format);
            let plan = plan::training_plan(evaluation, chrono::Local::now().date_naive());
            let renderer = render::renderer_for(format, settings.export.template_dir.clone());
            let bytes = render::render_plan(renderer.as_ref(), &plan)
                .with_context(|| format!("failed to render {} plan", plan.template))?;

            let out = out.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "{}_{}_plan.{}",
                    evaluation.player.first_name,
                    evaluation.player.last_name,
                    format.extension()
                ))
            });
            std::fs::write(&out, bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!(
                "{} plan for {} written to {}.",
                plan.template,
                evaluation.player.full_name(),
                out.display()
            );
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for reports and JSON.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swing_report=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
