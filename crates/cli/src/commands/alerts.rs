//! Rule-based alerts over aggregate summaries

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use idguard_lib::anomaly::{Alert, AlertAggregator, MissingFieldPolicy};
use idguard_lib::data::{count_rows, load_series};
use idguard_lib::{AggregateSummary, SummaryBuilder};
use serde::Serialize;
use tabled::Tabled;

use super::RunContext;
use crate::output::{
    color_severity, format_count, print_heading, print_json, print_success, print_table,
    print_warning, OutputFormat,
};

/// Row for the alerts table
#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Count")]
    count: String,
}

#[derive(Serialize)]
struct AlertsOutput<'a> {
    generated_at: String,
    summary: &'a AggregateSummary,
    alerts: &'a [Alert],
}

/// Inputs for the aggregation layer
pub struct AlertSources {
    /// CSV of biometric update events, one per row
    pub biometric: Option<PathBuf>,
    /// Biometric event count given directly
    pub biometric_count: Option<usize>,
    /// CSV with per-row demographic update totals
    pub demographic: Option<PathBuf>,
    /// Column holding the totals in `demographic`
    pub column: String,
    /// JSON object of precomputed summary fields
    pub summary: Option<PathBuf>,
    /// Count low-score identities in the loaded dataset
    pub with_dataset: bool,
    /// Fail when a rule's input is missing instead of skipping the rule
    pub strict: bool,
}

fn read_summary_file(path: &Path) -> Result<AggregateSummary> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read summary file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse summary file {}", path.display()))
}

/// Assemble the aggregate summary from whichever sources were given
fn build_summary(ctx: &RunContext, sources: &AlertSources) -> Result<AggregateSummary> {
    let mut builder = SummaryBuilder::new();

    if let Some(path) = &sources.biometric {
        let events = count_rows(path)
            .with_context(|| format!("Failed to read biometric events from {}", path.display()))?;
        builder = builder.biometric_events(events);
    }
    if let Some(count) = sources.biometric_count {
        builder = builder.biometric_events(count);
    }

    if let Some(path) = &sources.demographic {
        let totals = load_series(path, &sources.column).with_context(|| {
            format!(
                "Failed to read column `{}` from {}",
                sources.column,
                path.display()
            )
        })?;
        builder = builder.demographic_totals(&totals);
    }

    if sources.with_dataset {
        let dataset = ctx.load_dataset()?;
        builder = builder.high_risk_identities(&dataset, ctx.config.risk_cutoff);
    }

    if let Some(path) = &sources.summary {
        builder = builder.merge(read_summary_file(path)?);
    }

    Ok(builder.build())
}

/// Generate and print alerts
pub fn show_alerts(ctx: &RunContext, sources: AlertSources) -> Result<()> {
    let summary = build_summary(ctx, &sources)?;

    let policy = if sources.strict {
        MissingFieldPolicy::Require
    } else {
        MissingFieldPolicy::Skip
    };
    let alerts = AlertAggregator::new()
        .with_policy(policy)
        .generate(&summary)?;
    ctx.logger.log_alerts(&alerts);

    match ctx.format {
        OutputFormat::Json => print_json(&AlertsOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            summary: &summary,
            alerts: &alerts,
        })?,
        OutputFormat::Table => {
            print_heading("Alerts", 60);
            if summary.is_empty() {
                print_warning("No summary inputs given; every rule was skipped");
            }

            if alerts.is_empty() {
                print_success("No alerts raised");
                return Ok(());
            }

            let rows: Vec<AlertRow> = alerts
                .iter()
                .map(|a| AlertRow {
                    severity: color_severity(a.severity),
                    reason: a.reason.clone(),
                    count: format_count(a.count),
                })
                .collect();
            print_table(rows, "No alerts raised");
        }
    }

    Ok(())
}
