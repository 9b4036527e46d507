//! Structured logging for reporting runs
//!
//! The engine itself never logs. Callers report what they fed it and what
//! came back through [`StructuredLogger`], which emits `tracing` events with
//! a stable `event` field so JSON output can be filtered downstream.

use tracing::{debug, info, warn};

use crate::anomaly::{Alert, AlertSeverity, RollingWindowResult};
use crate::data::{DataSource, Dataset};

/// Structured logger for reporting events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log startup of a command
    pub fn log_startup(&self, version: &str, command: &str) {
        info!(
            event = "run_started",
            component = %self.component,
            version = %version,
            command = %command,
            "idguard run started"
        );
    }

    /// Log a loaded dataset; falling back to the sample data is a warning
    pub fn log_dataset_loaded(&self, dataset: &Dataset) {
        match dataset.source() {
            DataSource::Sample => {
                warn!(
                    event = "dataset_loaded",
                    component = %self.component,
                    source = "sample",
                    rows = dataset.len(),
                    "No CSV found, using built-in sample data"
                );
            }
            DataSource::File(path) => {
                info!(
                    event = "dataset_loaded",
                    component = %self.component,
                    source = %path.display(),
                    rows = dataset.len(),
                    "Loaded identity dataset"
                );
            }
        }
    }

    /// Log a region filter
    pub fn log_region_filter(&self, selected: &[String], before: usize, after: usize) {
        debug!(
            event = "region_filter",
            component = %self.component,
            regions = ?selected,
            rows_before = before,
            rows_after = after,
            "Applied region filter"
        );
    }

    /// Log the outcome of a spike scan
    pub fn log_spike_scan(&self, column: &str, result: &RollingWindowResult) {
        let spikes = result.spike_count();
        if spikes > 0 {
            warn!(
                event = "spike_scan",
                component = %self.component,
                column = %column,
                window = result.window,
                k = result.std_dev_threshold,
                observations = result.len(),
                evaluated = result.defined_count(),
                spikes = spikes,
                "Spikes detected"
            );
        } else {
            info!(
                event = "spike_scan",
                component = %self.component,
                column = %column,
                window = result.window,
                k = result.std_dev_threshold,
                observations = result.len(),
                evaluated = result.defined_count(),
                "No spikes detected"
            );
        }
    }

    /// Log generated alerts, one event each
    pub fn log_alerts(&self, alerts: &[Alert]) {
        if alerts.is_empty() {
            info!(
                event = "alerts_generated",
                component = %self.component,
                count = 0,
                "No alerts raised"
            );
            return;
        }

        for alert in alerts {
            match alert.severity {
                AlertSeverity::Critical | AlertSeverity::Warning => {
                    warn!(
                        event = "alert_raised",
                        component = %self.component,
                        severity = %alert.severity,
                        reason = %alert.reason,
                        count = alert.count,
                        "Alert raised"
                    );
                }
                AlertSeverity::Info => {
                    info!(
                        event = "alert_raised",
                        component = %self.component,
                        severity = %alert.severity,
                        reason = %alert.reason,
                        count = alert.count,
                        "Alert raised"
                    );
                }
            }
        }
    }

    /// Log a written suspicious activity report
    pub fn log_report_exported(&self, path: &str, rows: usize, threshold: f64) {
        info!(
            event = "report_exported",
            component = %self.component,
            path = %path,
            rows = rows,
            threshold = threshold,
            "Suspicious activity report written"
        );
    }
}
