//! Engauge CLI - engagement reports from observation files
//!
//! Commands:
//! - report: run the scoring pipeline over a dataset and record its timing
//! - metrics: show recorded session timings per backend
//! - generate: write a synthetic observation dataset

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::warn;

use engauge::generator::generate_dataset;
use engauge::metrics::{record_session, MetricsStore};
use engauge::pipeline::{ChunkMode, EngagementPipeline, DEFAULT_CHUNK_SIZE};
use engauge::types::AggregateReport;
use engauge::{ColumnarBackend, EngineError, RowwiseBackend, ENGINE_VERSION, PRODUCER_NAME};

/// Engauge - engagement scoring engine for classroom observation data
#[derive(Parser)]
#[command(name = "engauge")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score and aggregate classroom engagement observations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scoring pipeline over a dataset and record its timing
    Report {
        /// Input observation CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Execution backend
        #[arg(long, default_value = "rowwise")]
        backend: BackendKind,

        /// Records per chunk in chunked mode
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Process the whole dataset as one estimation scope
        #[arg(long, conflicts_with = "chunk_size")]
        whole: bool,

        /// Session store for run timings
        #[arg(long, default_value = "metrics_history.json")]
        metrics_file: PathBuf,

        /// Skip timing recording entirely
        #[arg(long)]
        no_record: bool,

        /// Force JSON output
        #[arg(long)]
        json: bool,
    },

    /// Show recorded session timings per backend
    Metrics {
        /// Session store to read
        #[arg(long, default_value = "metrics_history.json")]
        metrics_file: PathBuf,

        /// Only show this backend
        #[arg(long)]
        backend: Option<String>,

        /// Force JSON output
        #[arg(long)]
        json: bool,
    },

    /// Write a synthetic observation dataset
    Generate {
        /// Output CSV path
        #[arg(short, long)]
        output: PathBuf,

        /// Number of records to generate
        #[arg(long, default_value_t = 500_000)]
        records: u64,

        /// RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendKind {
    /// Score record by record with sort-based medians
    Rowwise,
    /// Score by materialized columns with selection-based medians
    Columnar,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: error: {}", PRODUCER_NAME, e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EngineError> {
    match cli.command {
        Commands::Report {
            input,
            backend,
            chunk_size,
            whole,
            metrics_file,
            no_record,
            json,
        } => {
            let mode = if whole {
                ChunkMode::WholeDataset
            } else {
                ChunkMode::Chunked(chunk_size)
            };

            let report = match backend {
                BackendKind::Rowwise => {
                    EngagementPipeline::with_backend(RowwiseBackend, mode).generate_report(&input)?
                }
                BackendKind::Columnar => {
                    EngagementPipeline::with_backend(ColumnarBackend, mode)
                        .generate_report(&input)?
                }
            };

            print_report(&report, json)?;

            // The report survives a store failure; recording is best-effort.
            if !no_record {
                if let Err(e) = record_session(&metrics_file, &report.backend, report.elapsed_seconds)
                {
                    warn!("failed to record run timing: {}", e);
                    eprintln!("{}: warning: timing not recorded: {}", PRODUCER_NAME, e);
                }
            }

            Ok(())
        }

        Commands::Metrics {
            metrics_file,
            backend,
            json,
        } => cmd_metrics(&metrics_file, backend.as_deref(), json),

        Commands::Generate {
            output,
            records,
            seed,
        } => {
            generate_dataset(&output, records, seed)?;
            println!("wrote {} records to {}", records, output.display());
            Ok(())
        }
    }
}

fn print_report(report: &AggregateReport, force_json: bool) -> Result<(), EngineError> {
    if force_json || !atty::is(atty::Stream::Stdout) {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Engagement Report ({} backend, run {})", report.backend, report.run_id);
    println!("{}", "=".repeat(60));
    println!("Overall score: {:>8.2}", report.overall_score);

    println!("\nRegions:");
    for group in &report.region_scores {
        println!("  {:<40} {:>8.2}", group.key, group.mean_engagement);
    }

    println!("\nInstitutions:");
    for group in &report.institution_scores {
        println!("  {:<40} {:>8.2}", group.key, group.mean_engagement);
    }

    let d = &report.diagnostics;
    println!(
        "\n{} rows read, {} scored, {} unscored, {} malformed, {} chunk(s)",
        d.rows_read, d.scored_records, d.unscored_records, d.malformed_rows, d.chunks
    );
    println!("Completed in {:.3}s", report.elapsed_seconds);

    Ok(())
}

fn cmd_metrics(path: &Path, only: Option<&str>, json: bool) -> Result<(), EngineError> {
    let store = MetricsStore::load(path)?;

    let backends: Vec<String> = match only {
        Some(name) => vec![name.to_string()],
        None => store.backend_names(),
    };

    if json || !atty::is(atty::Stream::Stdout) {
        let payload: serde_json::Map<String, serde_json::Value> = backends
            .iter()
            .map(|name| {
                let sessions: Vec<serde_json::Value> = store
                    .sessions(name)
                    .into_iter()
                    .map(|(key, metrics)| {
                        serde_json::json!({
                            "session": key,
                            "processing_time": metrics.processing_time,
                        })
                    })
                    .collect();
                (name.clone(), serde_json::Value::Array(sessions))
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    for name in &backends {
        let sessions = store.sessions(name);
        println!("{} ({} session(s))", name, sessions.len());
        for (key, metrics) in sessions {
            println!("  {:<14} {:>10.3}s", key, metrics.processing_time);
        }
    }

    Ok(())
}
