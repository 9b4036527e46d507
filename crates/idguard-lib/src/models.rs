//! Core data models shared by the engine, the loaders and the CLI

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known aggregate summary field names
pub mod fields {
    /// Number of biometric update events in the period
    pub const BIOMETRIC_EVENT_COUNT: &str = "biometric_event_count";
    /// Largest per-row demographic update total
    pub const DEMOGRAPHIC_UPDATE_TOTAL_MAX: &str = "demographic_update_total_max";
    /// Average per-row demographic update total
    pub const DEMOGRAPHIC_UPDATE_TOTAL_MEAN: &str = "demographic_update_total_mean";
    /// Identities whose match score is under the risk cutoff
    pub const HIGH_RISK_IDENTITY_COUNT: &str = "high_risk_identity_count";
}

/// One identity verification record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Region")]
    pub region: String,
    /// Biometric match score, 0 to 100
    #[serde(rename = "Score")]
    pub score: f64,
}

/// Named aggregate metrics handed to the alert rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateSummary {
    values: BTreeMap<String, f64>,
}

impl AggregateSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Merge `other` into `self`; values in `other` win
    pub fn extend(&mut self, other: AggregateSummary) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_from_json() {
        let summary: AggregateSummary = serde_json::from_str(
            r#"{"biometric_event_count": 5, "demographic_update_total_max": 12.5}"#,
        )
        .unwrap();

        assert_eq!(summary.get(fields::BIOMETRIC_EVENT_COUNT), Some(5.0));
        assert_eq!(summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX), Some(12.5));
        assert!(!summary.contains(fields::DEMOGRAPHIC_UPDATE_TOTAL_MEAN));
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_summary_extend_overrides() {
        let mut base = AggregateSummary::new().with("a", 1.0).with("b", 2.0);
        base.extend(AggregateSummary::new().with("b", 3.0));

        let pairs: Vec<_> = base.iter().collect();
        assert_eq!(pairs, vec![("a", 1.0), ("b", 3.0)]);
    }
}
