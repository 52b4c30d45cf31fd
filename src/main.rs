use chrono::Utc;
use clap::{Parser, Subcommand};
use rolescope::core::aggregate::{aggregate, derive_minimal_actions};
use rolescope::core::config::{Overrides, Settings};
use rolescope::core::role::{render_role_definition, subscription_scope, RoleError};
use rolescope::core::traits::{ActivityLogSource, ActivityQuery};
use rolescope::formats::csv::render_csv;
use rolescope::formats::json::{AnalysisReport, ArtifactWriter};
use rolescope::formats::summary::render_summary;
use rolescope::sources::ExportFileSource;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rolescope")]
#[command(about = "Derive a minimal Azure custom role from captured activity", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a captured activity-log export and emit the artifact set.
    Analyze {
        /// Activity-log export file (az CLI JSON array or Log Analytics JSONL).
        #[arg(short, long)]
        input: PathBuf,
        /// Optional TOML config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output directory for the artifact set.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Principal whose calls are analyzed.
        #[arg(long)]
        caller: Option<String>,
        /// Capture window start (RFC3339).
        #[arg(long)]
        start: Option<String>,
        /// Capture window end (RFC3339).
        #[arg(long)]
        end: Option<String>,
        /// Name for the generated role.
        #[arg(long)]
        role_name: Option<String>,
        /// Number of operations in the summary ranking.
        #[arg(long)]
        top: Option<usize>,
        /// Print the merged settings and exit.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Analyze {
            input,
            config,
            output,
            caller,
            start,
            end,
            role_name,
            top,
            dry_run,
        } => {
            let overrides = Overrides {
                caller,
                start,
                end,
                role_name,
                output_dir: output.map(|dir| dir.to_string_lossy().to_string()),
                top,
            };
            let settings = Settings::load(config.as_deref(), std::env::vars(), overrides)?;

            if dry_run {
                println!("settings loaded: {settings:#?}");
                return Ok(());
            }

            let (window_start, window_end) = settings.window(Utc::now());
            let query = ActivityQuery {
                caller: settings.caller.clone(),
                start: window_start,
                end: window_end,
            };

            let mut source = ExportFileSource::new(&input);
            let events = source.fetch(&query)?;
            if source.skipped() > 0 {
                eprintln!(
                    "warning: skipped {} export records without a usable timestamp",
                    source.skipped()
                );
            }

            let analysis = aggregate(&events);
            println!(
                "aggregated {} events into {} operations (dropped: {} not succeeded, {} missing operation name)",
                events.len(),
                analysis.aggregates.len(),
                analysis.dropped.not_succeeded,
                analysis.dropped.missing_operation
            );

            if analysis.aggregates.is_empty() {
                eprintln!(
                    "warning: no successful operations captured for {} in {} .. {}",
                    query.caller,
                    query.start.to_rfc3339(),
                    query.end.to_rfc3339()
                );
                eprintln!(
                    "the capture is inconclusive, not evidence that zero permissions are needed"
                );
                return Err(Box::new(RoleError::EmptyActions));
            }

            let actions = derive_minimal_actions(&analysis.aggregates, &settings.denylist_prefixes);
            let scopes = match settings.subscription_id.as_deref() {
                Some(subscription_id) => vec![subscription_scope(subscription_id)],
                None => Vec::new(),
            };
            let role = render_role_definition(
                &actions,
                &scopes,
                &settings.role_name,
                &settings.role_description,
            )?;

            let writer = ArtifactWriter::new(&settings.output_dir)?;
            let report = AnalysisReport::new(&analysis, &query, Utc::now());
            let analysis_path = writer.write_analysis(&report)?;
            let csv_path = writer.write_csv(&render_csv(&analysis.aggregates))?;
            let summary_path =
                writer.write_summary(&render_summary(&analysis, &query, settings.top))?;
            let role_path = writer.write_role(&role)?;
            let events_path = writer.write_events(&events, settings.audit_compression)?;

            println!("analysis written to {}", analysis_path.display());
            println!("csv written to {}", csv_path.display());
            println!("summary written to {}", summary_path.display());
            println!("role definition written to {}", role_path.display());
            println!("events audit copy written to {}", events_path.display());
        }
    }

    Ok(())
}
