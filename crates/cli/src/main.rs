//! idguard CLI
//!
//! A command-line reporting tool over identity verification records:
//! KPI summaries, suspicious activity reports, spike detection and
//! rule-based alerts.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{alerts, dataset, spikes, RunContext};
use idguard_lib::StructuredLogger;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set to any value to emit JSON log lines
const LOG_JSON_ENV: &str = "IDGUARD_LOG_JSON";

/// Identity analytics CLI
#[derive(Parser)]
#[command(name = "idguard")]
#[command(author, version, about = "Identity analytics: KPIs, suspicious activity reports, spikes and alerts", long_about = None)]
pub struct Cli {
    /// Identity dataset CSV (Age, Gender, Region, Score)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Configuration file (defaults to ~/.config/idguard/config.json)
    #[arg(long, global = true, env = "IDGUARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the regions present in the dataset
    Regions,

    /// Show KPI metrics for the selected regions
    Summary {
        /// Region to include (repeatable; all regions if omitted)
        #[arg(long = "region", short)]
        regions: Vec<String>,
    },

    /// List identities scoring below the passing threshold
    Suspicious {
        /// Region to include (repeatable; all regions if omitted)
        #[arg(long = "region", short)]
        regions: Vec<String>,

        /// Passing score threshold, 0 to 100
        #[arg(long, short)]
        threshold: Option<f64>,

        /// Write the suspicious activity report to this CSV file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },

    /// Detect spikes in a numeric CSV column
    Spikes {
        /// CSV file holding the series
        #[arg(long, short)]
        input: PathBuf,

        /// Column to scan
        #[arg(long, short)]
        column: String,

        /// Rolling window length
        #[arg(long, short)]
        window: Option<usize>,

        /// Standard deviations above the rolling mean that count as a spike
        #[arg(short = 'k', long = "k")]
        k: Option<f64>,

        /// Exclude each observation from its own baseline
        #[arg(long)]
        preceding: bool,

        /// Only print rows flagged as spikes
        #[arg(long)]
        only_spikes: bool,
    },

    /// Generate alerts from aggregate summaries
    Alerts {
        /// CSV of biometric update events (one per row)
        #[arg(long, value_name = "CSV")]
        biometric: Option<PathBuf>,

        /// Biometric update event count
        #[arg(long, conflicts_with = "biometric")]
        biometric_count: Option<usize>,

        /// CSV of demographic update totals
        #[arg(long, value_name = "CSV")]
        demographic: Option<PathBuf>,

        /// Column holding demographic update totals
        #[arg(long, default_value = "total_updates")]
        column: String,

        /// JSON object of precomputed summary fields
        #[arg(long, value_name = "JSON")]
        summary: Option<PathBuf>,

        /// Count low-score identities in the dataset
        #[arg(long)]
        with_dataset: bool,

        /// Fail when a rule's input field is missing
        #[arg(long)]
        strict: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Regions => "regions",
            Commands::Summary { .. } => "summary",
            Commands::Suspicious { .. } => "suspicious",
            Commands::Spikes { .. } => "spikes",
            Commands::Alerts { .. } => "alerts",
        }
    }
}

/// Install the tracing subscriber; logs go to stderr so stdout stays parseable
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var_os(LOG_JSON_ENV).is_some() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::Config::load(cli.config.as_deref())?;
    debug!(?config, "Configuration loaded");
    let logger = StructuredLogger::new("idguard-cli");
    logger.log_startup(CLI_VERSION, cli.command.name());

    let ctx = RunContext {
        data_path: cli.data.or_else(|| config.data_path.clone()),
        config,
        format: cli.format,
        logger,
    };

    match cli.command {
        Commands::Regions => dataset::show_regions(&ctx)?,
        Commands::Summary { regions } => dataset::show_summary(&ctx, &regions)?,
        Commands::Suspicious {
            regions,
            threshold,
            export,
        } => dataset::show_suspicious(&ctx, &regions, threshold, export.as_deref())?,
        Commands::Spikes {
            input,
            column,
            window,
            k,
            preceding,
            only_spikes,
        } => spikes::show_spikes(
            &ctx,
            spikes::SpikeOptions {
                input: &input,
                column: &column,
                window,
                k,
                preceding,
                only_spikes,
            },
        )?,
        Commands::Alerts {
            biometric,
            biometric_count,
            demographic,
            column,
            summary,
            with_dataset,
            strict,
        } => alerts::show_alerts(
            &ctx,
            alerts::AlertSources {
                biometric,
                biometric_count,
                demographic,
                column,
                summary,
                with_dataset,
                strict,
            },
        )?,
    }

    Ok(())
}
