//! Integration tests for the anomaly engine
//!
//! These tests drive both components from raw tables the way the CLI does:
//! CSV columns into the spike detector, dataset aggregates into the rules.

use super::*;
use crate::data::{read_series, Dataset, DEFAULT_RISK_CUTOFF};
use crate::models::fields;
use crate::summary::SummaryBuilder;

const DAILY_UPDATES: &str = "day,total_updates
1,12
2,14
3,11
4,13
5,12
6,15
7,13
8,12
9,14
10,96
11,13
12,12
";

#[test]
fn test_daily_updates_burst() {
    let series = read_series(DAILY_UPDATES.as_bytes(), "total_updates").unwrap();

    let result = SpikeDetector::new(DEFAULT_WINDOW, DEFAULT_STD_DEV_THRESHOLD)
        .unwrap()
        .with_baseline(Baseline::Preceding)
        .unwrap()
        .detect(&series);

    assert_eq!(result.len(), 12);
    assert_eq!(result.defined_count(), 12 - DEFAULT_WINDOW + 1);
    assert_eq!(result.spike_indices(), vec![9]);

    let summary = SummaryBuilder::new().demographic_totals(&series).build();
    let alerts = generate_alerts(&summary).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    assert_eq!(alerts[0].count, 96.0);
}

#[test]
fn test_full_summary_ordering() {
    let dataset = Dataset::sample();
    let summary = SummaryBuilder::new()
        .high_risk_identities(&dataset, DEFAULT_RISK_CUTOFF)
        .demographic_totals(&[10.0, 10.0, 100.0, 5.0])
        .biometric_events(7)
        .build();

    let alerts = generate_alerts(&summary).unwrap();
    let severities: Vec<_> = alerts.iter().map(|a| a.severity).collect();
    assert_eq!(
        severities,
        vec![
            AlertSeverity::Critical,
            AlertSeverity::Warning,
            AlertSeverity::Info
        ]
    );
    assert_eq!(alerts[0].count, 7.0);
    assert_eq!(alerts[1].count, 100.0);
    assert_eq!(alerts[2].count, 3.0);
}

#[test]
fn test_partial_sources_feed_different_rules() {
    let biometric_only = SummaryBuilder::new().biometric_events(0).build();
    assert!(generate_alerts(&biometric_only).unwrap().is_empty());

    let strict = AlertAggregator::new().with_policy(MissingFieldPolicy::Require);
    let err = strict.generate(&biometric_only).unwrap_err();
    assert_eq!(
        err,
        crate::error::EngineError::MissingField {
            rule: "demographic_burst".to_string(),
            field: fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX.to_string(),
        }
    );
}

#[test]
fn test_blank_cells_leave_gaps() {
    let data = "v\n1\n2\n3\n\"\"\n5\n6\n7\n";
    let series = read_series(data.as_bytes(), "v").unwrap();
    let result = detect_spikes(&series, 3, DEFAULT_STD_DEV_THRESHOLD).unwrap();

    let defined: Vec<usize> = result
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.stats.is_some())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(defined, vec![2, 6]);
}
