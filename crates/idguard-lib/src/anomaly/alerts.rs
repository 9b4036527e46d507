//! Rule-based alert generation
//!
//! Handles:
//! - Evaluating an ordered list of rules against an aggregate summary
//! - Skipping or failing on rules whose input fields are absent
//! - Ordering alerts by severity, keeping rule order within a severity

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{fields, AggregateSummary};

/// Default burst factor: a maximum above three times the mean is a burst
const DEFAULT_BURST_FACTOR: f64 = 3.0;

/// Alert severity levels, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "CRITICAL"),
            AlertSeverity::Warning => write!(f, "WARNING"),
            AlertSeverity::Info => write!(f, "INFO"),
        }
    }
}

/// A single alert produced by a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: AlertSeverity,
    pub reason: String,
    pub count: f64,
}

impl Alert {
    pub fn new(severity: AlertSeverity, reason: impl Into<String>, count: f64) -> Self {
        Self {
            severity,
            reason: reason.into(),
            count,
        }
    }
}

/// A rule evaluated against an aggregate summary
///
/// `evaluate` is only called once every field listed by `required_fields`
/// is present in the summary with a finite value.
pub trait AlertRule: Send + Sync {
    /// Stable identifier used in error messages
    fn name(&self) -> &str;

    /// Summary fields the rule reads
    fn required_fields(&self) -> &[&'static str];

    fn evaluate(&self, summary: &AggregateSummary) -> Option<Alert>;
}

/// Fires when any biometric update event was observed
#[derive(Debug, Clone, Default)]
pub struct BiometricActivityRule;

impl AlertRule for BiometricActivityRule {
    fn name(&self) -> &str {
        "biometric_activity"
    }

    fn required_fields(&self) -> &[&'static str] {
        &[fields::BIOMETRIC_EVENT_COUNT]
    }

    fn evaluate(&self, summary: &AggregateSummary) -> Option<Alert> {
        let count = summary.get(fields::BIOMETRIC_EVENT_COUNT)?;
        (count > 0.0).then(|| {
            Alert::new(
                AlertSeverity::Critical,
                "Biometric update activity detected",
                count,
            )
        })
    }
}

/// Fires when the largest demographic update total dwarfs the average one
///
/// Compares `max > mean * factor` without dividing, so a zero mean fires
/// exactly when the maximum is positive.
#[derive(Debug, Clone)]
pub struct DemographicBurstRule {
    pub factor: f64,
}

impl DemographicBurstRule {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl Default for DemographicBurstRule {
    fn default() -> Self {
        Self::new(DEFAULT_BURST_FACTOR)
    }
}

impl AlertRule for DemographicBurstRule {
    fn name(&self) -> &str {
        "demographic_burst"
    }

    fn required_fields(&self) -> &[&'static str] {
        &[
            fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX,
            fields::DEMOGRAPHIC_UPDATE_TOTAL_MEAN,
        ]
    }

    fn evaluate(&self, summary: &AggregateSummary) -> Option<Alert> {
        let max = summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MAX)?;
        let mean = summary.get(fields::DEMOGRAPHIC_UPDATE_TOTAL_MEAN)?;
        (max > mean * self.factor)
            .then(|| Alert::new(AlertSeverity::Warning, "Demographic update spike", max))
    }
}

/// Fires when identities scored below the passing threshold
#[derive(Debug, Clone, Default)]
pub struct LowScoreRule;

impl AlertRule for LowScoreRule {
    fn name(&self) -> &str {
        "low_score_identities"
    }

    fn required_fields(&self) -> &[&'static str] {
        &[fields::HIGH_RISK_IDENTITY_COUNT]
    }

    fn evaluate(&self, summary: &AggregateSummary) -> Option<Alert> {
        let count = summary.get(fields::HIGH_RISK_IDENTITY_COUNT)?;
        (count > 0.0).then(|| {
            Alert::new(
                AlertSeverity::Info,
                "Identities below passing score threshold",
                count,
            )
        })
    }
}

/// Rule backed by a closure
pub struct FnRule<F> {
    name: String,
    fields: Vec<&'static str>,
    check: F,
}

impl<F> FnRule<F> {
    pub fn new(name: impl Into<String>, fields: &[&'static str], check: F) -> Self
    where
        F: Fn(&AggregateSummary) -> Option<Alert> + Send + Sync,
    {
        Self {
            name: name.into(),
            fields: fields.to_vec(),
            check,
        }
    }
}

impl<F> AlertRule for FnRule<F>
where
    F: Fn(&AggregateSummary) -> Option<Alert> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn required_fields(&self) -> &[&'static str] {
        &self.fields
    }

    fn evaluate(&self, summary: &AggregateSummary) -> Option<Alert> {
        (self.check)(summary)
    }
}

/// What to do when a rule's input field is absent from the summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingFieldPolicy {
    /// Leave the rule out of this evaluation
    #[default]
    Skip,
    /// Fail the whole evaluation with `MissingField`
    Require,
}

struct RegisteredRule {
    rule: Box<dyn AlertRule>,
    on_missing: MissingFieldPolicy,
}

/// Ordered rule set producing severity-sorted alerts
pub struct AlertAggregator {
    rules: Vec<RegisteredRule>,
}

impl AlertAggregator {
    /// Create an aggregator with no rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create an aggregator with the built-in rules in their declared order
    pub fn new() -> Self {
        Self::empty()
            .with_rule(BiometricActivityRule)
            .with_rule(DemographicBurstRule::default())
            .with_rule(LowScoreRule)
    }

    /// Append a rule that is skipped when its fields are absent
    pub fn with_rule(mut self, rule: impl AlertRule + 'static) -> Self {
        self.add_rule(rule, MissingFieldPolicy::Skip);
        self
    }

    /// Append a rule that fails the evaluation when its fields are absent
    pub fn with_required_rule(mut self, rule: impl AlertRule + 'static) -> Self {
        self.add_rule(rule, MissingFieldPolicy::Require);
        self
    }

    pub fn add_rule(&mut self, rule: impl AlertRule + 'static, on_missing: MissingFieldPolicy) {
        self.rules.push(RegisteredRule {
            rule: Box::new(rule),
            on_missing,
        });
    }

    /// Switch every registered rule to the given missing-field policy
    pub fn with_policy(mut self, on_missing: MissingFieldPolicy) -> Self {
        for entry in &mut self.rules {
            entry.on_missing = on_missing;
        }
        self
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|entry| entry.rule.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule in order and return the alerts sorted by severity
    pub fn generate(&self, summary: &AggregateSummary) -> EngineResult<Vec<Alert>> {
        let mut alerts = Vec::new();

        'rules: for entry in &self.rules {
            for &field in entry.rule.required_fields() {
                match summary.get(field) {
                    None => match entry.on_missing {
                        MissingFieldPolicy::Skip => continue 'rules,
                        MissingFieldPolicy::Require => {
                            return Err(EngineError::MissingField {
                                rule: entry.rule.name().to_string(),
                                field: field.to_string(),
                            })
                        }
                    },
                    Some(value) if !value.is_finite() => {
                        return Err(EngineError::invalid(
                            field,
                            format!("must be a finite number, got {value}"),
                        ));
                    }
                    Some(_) => {}
                }
            }

            if let Some(alert) = entry.rule.evaluate(summary) {
                alerts.push(alert);
            }
        }

        // sort_by_key is stable, so rule order survives within a severity
        alerts.sort_by_key(|alert| alert.severity);
        Ok(alerts)
    }
}

impl Default for AlertAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate the built-in rules against `summary`
pub fn generate_alerts(summary: &AggregateSummary) -> EngineResult<Vec<Alert>> {
    AlertAggregator::new().generate(summary)
}
