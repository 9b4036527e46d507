//! Aggregation layer: turns raw tables into an [`AggregateSummary`]

use crate::data::Dataset;
use crate::models::{fields, AggregateSummary};

/// Builds the summary consumed by the alert rules
///
/// Each source contributes only its own fields, so a summary built from a
/// subset of sources simply leaves the other rules unevaluated.
#[derive(Debug, Clone, Default)]
pub struct SummaryBuilder {
    summary: AggregateSummary,
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of biometric update events
    pub fn biometric_events(mut self, count: usize) -> Self {
        self.summary
            .insert(fields::BIOMETRIC_EVENT_COUNT, count as f64);
        self
    }

    /// Maximum and mean of per-row demographic update totals
    ///
    /// Non-finite totals are ignored; with no finite totals neither field is
    /// set.
    pub fn demographic_totals(mut self, totals: &[f64]) -> Self {
        let finite: Vec<f64> = totals.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return self;
        }

        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;

        self.summary
            .insert(fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX, max);
        self.summary
            .insert(fields::DEMOGRAPHIC_UPDATE_TOTAL_MEAN, mean);
        self
    }

    /// Identities scoring strictly below `risk_cutoff`
    pub fn high_risk_identities(mut self, dataset: &Dataset, risk_cutoff: f64) -> Self {
        self.summary.insert(
            fields::HIGH_RISK_IDENTITY_COUNT,
            dataset.count_below(risk_cutoff) as f64,
        );
        self
    }

    /// Merge precomputed fields; later sources override earlier ones
    pub fn merge(mut self, other: AggregateSummary) -> Self {
        self.summary.extend(other);
        self
    }

    pub fn build(self) -> AggregateSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demographic_totals() {
        let summary = SummaryBuilder::new()
            .demographic_totals(&[10.0, 20.0, 90.0])
            .build();

        assert_eq!(summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX), Some(90.0));
        assert_eq!(summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MEAN), Some(40.0));
        assert!(!summary.contains(fields::BIOMETRIC_EVENT_COUNT));
    }

    #[test]
    fn test_empty_totals_add_nothing() {
        let summary = SummaryBuilder::new()
            .demographic_totals(&[])
            .demographic_totals(&[f64::NAN])
            .build();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_all_sources() {
        let summary = SummaryBuilder::new()
            .biometric_events(4)
            .demographic_totals(&[1.0, f64::NAN, 3.0])
            .high_risk_identities(&Dataset::sample(), 75.0)
            .build();

        assert_eq!(summary.get(fields::BIOMETRIC_EVENT_COUNT), Some(4.0));
        assert_eq!(summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX), Some(3.0));
        assert_eq!(summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MEAN), Some(2.0));
        assert_eq!(summary.get(fields::HIGH_RISK_IDENTITY_COUNT), Some(3.0));
    }

    #[test]
    fn test_merge_overrides() {
        let summary = SummaryBuilder::new()
            .biometric_events(4)
            .merge(AggregateSummary::new().with(fields::BIOMETRIC_EVENT_COUNT, 0.0))
            .build();
        assert_eq!(summary.get(fields::BIOMETRIC_EVENT_COUNT), Some(0.0));
    }
}
