//! Anomaly detection and alerting engine
//!
//! This module provides:
//! - Spike detection (values exceeding a rolling standard deviation threshold)
//! - Rule-based alert generation over aggregate summaries
//!
//! Both entry points are pure functions with no I/O and no logging.

mod alerts;
mod spike_detector;

#[cfg(test)]
mod tests;

pub use alerts::{
    generate_alerts, Alert, AlertAggregator, AlertRule, AlertSeverity, BiometricActivityRule,
    DemographicBurstRule, FnRule, LowScoreRule, MissingFieldPolicy,
};
pub use spike_detector::{
    detect_spikes, Baseline, RollingWindowResult, SpikeDetector, WindowPoint,
    WindowStats, DEFAULT_STD_DEV_THRESHOLD, DEFAULT_WINDOW,
};
