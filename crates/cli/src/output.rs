//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use idguard_lib::AlertSeverity;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Placeholder for values that were not computed
const ABSENT: &str = "-";

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a rounded table, or a notice when there are no rows
pub fn print_table<T: Tabled>(rows: Vec<T>, empty_message: &str) {
    if rows.is_empty() {
        println!("{}", empty_message.yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a section heading with an underline
pub fn print_heading(title: &str, width: usize) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(width));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format an optional number with fixed precision
pub fn format_optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => ABSENT.to_string(),
    }
}

/// Format a count, dropping the fraction when it is whole
pub fn format_count(count: f64) -> String {
    if count.fract() == 0.0 && count.abs() < 1e15 {
        format!("{}", count as i64)
    } else {
        format!("{:.2}", count)
    }
}

/// Format a signed delta with an explicit sign
pub fn format_delta(delta: f64) -> String {
    format!("{:+.1}", delta)
}

/// Color a severity label by urgency
pub fn color_severity(severity: AlertSeverity) -> String {
    let label = severity.to_string();
    match severity {
        AlertSeverity::Critical => label.red().bold().to_string(),
        AlertSeverity::Warning => label.yellow().to_string(),
        AlertSeverity::Info => label.blue().to_string(),
    }
}

/// Color a match score against the passing threshold
pub fn color_score(score: f64, threshold: f64) -> String {
    let formatted = format_count(score);
    if score < threshold {
        formatted.red().to_string()
    } else {
        formatted.green().to_string()
    }
}

/// Spike flag column value
pub fn format_spike(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "SPIKE".red().bold().to_string(),
        Some(false) => "no".to_string(),
        None => ABSENT.to_string(),
    }
}
