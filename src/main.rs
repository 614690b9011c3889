use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use perfpulse::client::{AnalysisInput, UploadedFile};
use perfpulse::config::{init_tracing, PerfpulseConfig};
use perfpulse::export::{self, ExportFormat};
use perfpulse::model::AnalysisResult;
use perfpulse::state::Session;
use perfpulse::views::{InsightsView, PreAnalysisView};

#[derive(Parser)]
#[command(
    name = "perfpulse",
    about = "Performance telemetry dashboard: analyze logs, browse insights, export reports",
    version,
    long_about = None
)]
struct Cli {
    /// Config file (defaults to $PERFPULSE_CONFIG, then ./perfpulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Analysis service base URL, overrides the config file
    #[arg(long, global = true, env = "PERFPULSE_BACKEND")]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard server
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<String>,

        /// Answer analysis requests with synthetic data instead of calling the service
        #[arg(long)]
        offline: bool,
    },

    /// Send logs to the analysis service and print the result
    Analyze {
        /// Log text to analyze
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Log, text, JSON or CSV file(s) to upload
        #[arg(long)]
        file: Vec<PathBuf>,

        /// Use synthetic data instead of calling the service
        #[arg(long)]
        offline: bool,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Print synthetic demo data
    Demo {
        /// Print raw log lines instead of an analysis result
        #[arg(long)]
        raw: bool,

        /// JSON output for machine parsing
        #[arg(long, conflicts_with = "raw")]
        json: bool,
    },

    /// Write a JSON snapshot or HTML report
    Export {
        /// Artifact to produce
        #[arg(long, value_enum)]
        format: ExportFormat,

        /// Analysis result JSON to export
        #[arg(long, conflicts_with = "demo")]
        input: Option<PathBuf>,

        /// Export synthetic demo data
        #[arg(long)]
        demo: bool,

        /// Output directory (defaults to export.output_dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PerfpulseConfig::load(path)?,
        None => PerfpulseConfig::load_or_default(),
    };
    if let Some(url) = cli.backend {
        config.backend.base_url = url;
    }
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { bind, offline } => {
            if let Some(bind) = bind {
                config.dashboard.bind = bind;
            }
            tracing::info!(bind = %config.dashboard.bind, "Starting perfpulse dashboard");
            perfpulse::serve(config, offline).await?;
        }
        Commands::Analyze {
            text,
            file,
            offline,
            json,
        } => {
            let input = if file.is_empty() {
                AnalysisInput::paste(text.unwrap_or_default())
            } else {
                let mut files = Vec::with_capacity(file.len());
                for path in &file {
                    let upload = UploadedFile::read(path)
                        .await
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    if !upload.is_accepted() {
                        tracing::warn!(file = %upload.name, "Unusual extension, sending anyway");
                    }
                    files.push(upload);
                }
                AnalysisInput::upload(files)
            };

            let session = Session::new(
                perfpulse::backend(&config, offline)?,
                config.dashboard.race_policy,
                config.dashboard.demo_delay(),
            );
            if let Err(e) = session.analyze(input).await {
                bail!(e.user_message());
            }
            let Some(result) = session.result().await else {
                bail!("analysis finished without a result");
            };
            print_result(&result, json)?;
        }
        Commands::Demo { raw, json } => {
            if raw {
                print!("{}", perfpulse::mock::generate_raw_logs());
            } else {
                print_result(&perfpulse::mock::generate_analysis(), json)?;
            }
        }
        Commands::Export {
            format,
            input,
            demo,
            out_dir,
        } => {
            let result = match (input, demo) {
                (Some(path), _) => {
                    let body = std::fs::read(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    AnalysisResult::from_json(&body)
                        .with_context(|| format!("{} is not an analysis result", path.display()))?
                }
                (None, true) => perfpulse::mock::generate_analysis(),
                (None, false) => bail!("nothing to export: pass --input <result.json> or --demo"),
            };
            let dir = out_dir.unwrap_or_else(|| config.export.output_dir.clone());
            let artifact = export::export(&result, format, Utc::now())?;
            let path = artifact.write_to(&dir)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn print_result(result: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    print_pre_analysis(&PreAnalysisView::build(Some(result)));
    print_insights(&InsightsView::build(Some(result)));
    Ok(())
}

fn print_pre_analysis(view: &PreAnalysisView) {
    println!("\n=== Pre-Analysis ===");
    println!("Health:         {} ({})", view.health.display, view.health.band.label());
    println!("Log entries:    {}", view.total_entries);
    if let Some(peak) = view.aggregates.peak_cpu {
        println!("Peak CPU:       {}%", peak);
    }
    if let Some(peak) = view.aggregates.peak_latency {
        println!("Peak latency:   {}ms", peak);
    }

    println!("\n{:<12} | {:>8} | Share", "Level", "Count");
    println!("{:-<12}-|-{:->8}-|-{:-<7}", "", "", "");
    for level in &view.log_levels.items {
        println!("{:<12} | {:>8} | {:.1}%", level.level, level.count, level.share);
    }
    if let Some(msg) = view.log_levels.empty_message {
        println!("{}", msg);
    }

    if !view.components.is_empty() {
        println!("\nComponents: {}", view.components.items.join(", "));
    }

    println!("\nAnomalies:");
    for anomaly in &view.anomalies.items {
        println!(" - {}", anomaly);
    }
    if let Some(msg) = view.anomalies.empty_message {
        println!(" {}", msg);
    }

    println!("\nCorrelations:");
    for correlation in &view.correlations.items {
        println!(" - {}", correlation);
    }
    if let Some(msg) = view.correlations.empty_message {
        println!(" {}", msg);
    }
}

fn print_insights(view: &InsightsView) {
    println!("\n=== LLM Insights ===");
    println!("Health:   {} ({})", view.health.display, view.health.band.label());
    if let Some(summary) = &view.summary {
        println!("Summary:  {}", summary);
    }

    if !view.bottlenecks.is_empty() {
        println!("\n{:<3} | {:<8} | {:<16} | Title", "#", "Severity", "Component");
        println!("{:-<3}-|-{:-<8}-|-{:-<16}-|-{:-<40}", "", "", "", "");
        for card in &view.bottlenecks.items {
            println!(
                "{:<3} | {:<8} | {:<16} | {}",
                card.index, card.severity, card.affected_component, card.title
            );
            for line in &card.recommendation_lines {
                println!("{:<3} | {:<8} | {:<16} |   -> {}", "", "", "", line);
            }
        }
    } else if let Some(msg) = view.bottlenecks.empty_message {
        println!("\n{}", msg);
    }

    if let Some(rc) = &view.root_cause {
        println!("\nRoot cause: {}", rc.root_cause.as_deref().unwrap_or("not identified"));
        for action in &rc.immediate_actions.items {
            println!(" [now]  {}", action);
        }
        for fix in &rc.short_term_fixes.items {
            println!(" [soon] {}", fix);
        }
    }
    println!();
}
