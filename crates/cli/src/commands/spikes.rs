//! Spike detection over one numeric CSV column

use std::path::Path;

use anyhow::{Context, Result};
use idguard_lib::anomaly::{Baseline, RollingWindowResult, SpikeDetector};
use idguard_lib::data::load_series;
use serde::Serialize;
use tabled::Tabled;

use super::RunContext;
use crate::output::{
    format_optional, format_spike, print_heading, print_json, print_success, print_table,
    print_warning, OutputFormat,
};

/// Row for the rolling statistics table
#[derive(Tabled)]
struct SpikeRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Std Dev")]
    std_dev: String,
    #[tabled(rename = "Threshold")]
    threshold: String,
    #[tabled(rename = "Z")]
    z_score: String,
    #[tabled(rename = "Spike")]
    spike: String,
}

#[derive(Serialize)]
struct SpikesOutput<'a> {
    input: String,
    column: &'a str,
    spike_indices: Vec<usize>,
    #[serde(flatten)]
    result: &'a RollingWindowResult,
}

/// Options for a spike scan; unset values come from the config
pub struct SpikeOptions<'a> {
    pub input: &'a Path,
    pub column: &'a str,
    pub window: Option<usize>,
    pub k: Option<f64>,
    pub preceding: bool,
    pub only_spikes: bool,
}

fn build_rows(result: &RollingWindowResult, only_spikes: bool) -> Vec<SpikeRow> {
    result
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| !only_spikes || p.stats.map(|s| s.is_spike).unwrap_or(false))
        .map(|(i, p)| SpikeRow {
            position: i,
            value: format_optional(Some(p.value).filter(|v| v.is_finite()), 2),
            mean: format_optional(p.stats.map(|s| s.mean), 2),
            std_dev: format_optional(p.stats.map(|s| s.std_dev), 2),
            threshold: format_optional(p.stats.map(|s| s.threshold), 2),
            z_score: format_optional(p.stats.and_then(|s| s.z_score(p.value)), 2),
            spike: format_spike(p.stats.map(|s| s.is_spike)),
        })
        .collect()
}

/// Run the spike detector over a CSV column and print the rolling statistics
pub fn show_spikes(ctx: &RunContext, opts: SpikeOptions<'_>) -> Result<()> {
    let window = opts.window.unwrap_or(ctx.config.window);
    let k = opts.k.unwrap_or(ctx.config.k);
    let baseline = if opts.preceding {
        Baseline::Preceding
    } else {
        Baseline::Inclusive
    };

    let series = load_series(opts.input, opts.column).with_context(|| {
        format!(
            "Failed to read column `{}` from {}",
            opts.column,
            opts.input.display()
        )
    })?;

    let result = SpikeDetector::new(window, k)?
        .with_baseline(baseline)?
        .detect(&series);
    ctx.logger.log_spike_scan(opts.column, &result);

    match ctx.format {
        OutputFormat::Json => print_json(&SpikesOutput {
            input: opts.input.display().to_string(),
            column: opts.column,
            spike_indices: result.spike_indices(),
            result: &result,
        })?,
        OutputFormat::Table => {
            print_heading(&format!("Spike scan: {}", opts.column), 60);
            println!(
                "Window: {}   k: {}   Observations: {}   Evaluated: {}",
                window,
                k,
                result.len(),
                result.defined_count()
            );
            println!();

            if result.defined_count() == 0 {
                print_warning(&format!(
                    "Not enough data: need at least {} observations",
                    window
                ));
            }

            print_table(
                build_rows(&result, opts.only_spikes),
                "No rows to show",
            );

            match result.spike_count() {
                0 => print_success("No spikes detected"),
                n => print_warning(&format!(
                    "{} spike(s) at positions {:?}",
                    n,
                    result.spike_indices()
                )),
            }
        }
    }

    Ok(())
}
