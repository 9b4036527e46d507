//! Dataset commands: regions, KPI summary and the suspicious activity report

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use idguard_lib::data::{DataSource, Dataset, KpiSummary};
use serde::Serialize;
use tabled::Tabled;

use super::RunContext;
use crate::output::{
    color_score, format_delta, format_optional, print_error, print_heading, print_info,
    print_json, print_success, print_table, print_warning, OutputFormat,
};

/// Row for the identity records table
#[derive(Tabled)]
struct IdentityRow {
    #[tabled(rename = "Age")]
    age: u32,
    #[tabled(rename = "Gender")]
    gender: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "Score")]
    score: String,
}

#[derive(Serialize)]
struct RegionsOutput<'a> {
    source: String,
    regions: &'a [String],
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    source: String,
    regions: &'a [String],
    kpis: KpiSummary,
}

#[derive(Serialize)]
struct SuspiciousOutput<'a> {
    source: String,
    threshold: f64,
    count: usize,
    records: &'a [idguard_lib::IdentityRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    exported_to: Option<String>,
}

fn note_source(dataset: &Dataset) {
    match dataset.source() {
        DataSource::Sample => print_warning("No CSV found, using built-in sample data"),
        DataSource::File(path) => print_info(&format!("Loaded {}", path.display())),
    }
}

/// List the regions present in the dataset
pub fn show_regions(ctx: &RunContext) -> Result<()> {
    let dataset = ctx.load_dataset()?;
    let regions = dataset.regions();

    match ctx.format {
        OutputFormat::Json => print_json(&RegionsOutput {
            source: dataset.source().to_string(),
            regions: &regions,
        })?,
        OutputFormat::Table => {
            note_source(&dataset);
            print_heading("Regions", 30);
            if regions.is_empty() {
                print_warning("Dataset has no records");
            }
            for region in &regions {
                println!("  {}", region.cyan());
            }
        }
    }

    Ok(())
}

/// Show the KPI row for the selected regions
pub fn show_summary(ctx: &RunContext, regions: &[String]) -> Result<()> {
    let selection = ctx.load_selection(regions)?;
    let kpis = selection.kpis(ctx.config.kpi_target, ctx.config.risk_cutoff);

    match ctx.format {
        OutputFormat::Json => print_json(&SummaryOutput {
            source: selection.source().to_string(),
            regions,
            kpis,
        })?,
        OutputFormat::Table => {
            note_source(&selection);
            print_heading("Identity Dashboard", 50);
            if !regions.is_empty() {
                println!("Regions:                     {}", regions.join(", ").cyan());
            }
            println!("Total Identities Verified:   {}", kpis.total);

            let average = format_optional(kpis.average_score, 2);
            match kpis.delta_vs_target {
                Some(delta) => println!(
                    "Avg Biometric Match Score:   {} ({} vs target {})",
                    average,
                    format_delta(delta),
                    kpis.target
                ),
                None => println!("Avg Biometric Match Score:   {}", average),
            }

            let risk = kpis.high_risk_count.to_string();
            println!(
                "High Risk Alerts:            {} (score < {})",
                if kpis.high_risk_count > 0 {
                    risk.red().bold().to_string()
                } else {
                    risk.green().to_string()
                },
                kpis.risk_cutoff
            );
        }
    }

    Ok(())
}

/// List records below the passing threshold and optionally export them
pub fn show_suspicious(
    ctx: &RunContext,
    regions: &[String],
    threshold: Option<f64>,
    export: Option<&Path>,
) -> Result<()> {
    let threshold = threshold.unwrap_or(ctx.config.threshold);
    let selection = ctx.load_selection(regions)?;
    let flagged = selection.below_threshold(threshold)?;

    let exported_to = match export {
        Some(path) => {
            let rows = flagged
                .export_report(path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            let shown = path.display().to_string();
            ctx.logger.log_report_exported(&shown, rows, threshold);
            Some(shown)
        }
        None => None,
    };

    match ctx.format {
        OutputFormat::Json => print_json(&SuspiciousOutput {
            source: flagged.source().to_string(),
            threshold,
            count: flagged.len(),
            records: flagged.records(),
            exported_to,
        })?,
        OutputFormat::Table => {
            note_source(&selection);
            if flagged.is_empty() {
                print_success("System secure: no suspicious activity found");
            } else {
                print_error(&format!(
                    "SECURITY ALERT: {} suspicious identities detected (score < {})",
                    flagged.len(),
                    threshold
                ));

                let rows: Vec<IdentityRow> = flagged
                    .records()
                    .iter()
                    .map(|r| IdentityRow {
                        age: r.age,
                        gender: r.gender.clone(),
                        region: r.region.clone(),
                        score: color_score(r.score, threshold),
                    })
                    .collect();
                print_table(rows, "No records");
            }

            if let Some(path) = exported_to {
                print_success(&format!("Report written to {}", path));
            }
        }
    }

    Ok(())
}
