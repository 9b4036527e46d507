//! Rolling-window spike detection
//!
//! Flags observations that exceed `mean + k * std_dev` of a trailing,
//! fixed-size window of the series. Positions without a full window carry
//! no statistics at all rather than placeholder numbers.

use std::collections::VecDeque;

use serde::Serialize;

use crate::error::{EngineError, EngineResult};

/// Default number of standard deviations above the mean that counts as a spike
pub const DEFAULT_STD_DEV_THRESHOLD: f64 = 3.0;

/// Default rolling window length (one week of daily observations)
pub const DEFAULT_WINDOW: usize = 7;

/// Smallest window for which a sample standard deviation exists
const MIN_WINDOW: usize = 2;

/// Which observations form the baseline a point is compared against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Statistics over the full trailing window, current observation included
    #[default]
    Inclusive,
    /// Statistics over the `window - 1` observations before the current one
    Preceding,
}

/// Detects spikes exceeding a rolling standard deviation threshold
#[derive(Debug, Clone)]
pub struct SpikeDetector {
    window: usize,
    std_dev_threshold: f64,
    baseline: Baseline,
}

impl SpikeDetector {
    /// Create a detector over `window` trailing observations flagging values
    /// more than `std_dev_threshold` standard deviations above the mean
    pub fn new(window: usize, std_dev_threshold: f64) -> EngineResult<Self> {
        if window < MIN_WINDOW {
            return Err(EngineError::invalid(
                "window",
                format!("must be at least {MIN_WINDOW}, got {window}"),
            ));
        }

        if !std_dev_threshold.is_finite() || std_dev_threshold <= 0.0 {
            return Err(EngineError::invalid(
                "k",
                format!("must be a positive finite number, got {std_dev_threshold}"),
            ));
        }

        Ok(Self {
            window,
            std_dev_threshold,
            baseline: Baseline::Inclusive,
        })
    }

    /// Select the baseline mode
    ///
    /// `Baseline::Preceding` leaves `window - 1` observations for the
    /// baseline, so it needs a window of at least 3.
    pub fn with_baseline(mut self, baseline: Baseline) -> EngineResult<Self> {
        if baseline == Baseline::Preceding && self.window < MIN_WINDOW + 1 {
            return Err(EngineError::invalid(
                "window",
                format!(
                    "must be at least {} when excluding the current observation, got {}",
                    MIN_WINDOW + 1,
                    self.window
                ),
            ));
        }
        self.baseline = baseline;
        Ok(self)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn std_dev_threshold(&self) -> f64 {
        self.std_dev_threshold
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    /// Run the detector over a series
    ///
    /// The result has one entry per observation. Entries before the first
    /// full window, and entries whose window holds a non-finite value, have
    /// no statistics.
    pub fn detect(&self, series: &[f64]) -> RollingWindowResult {
        let mut rolling = RollingWindow::new(self.window);

        let points = series
            .iter()
            .map(|&value| {
                rolling.push(value);
                WindowPoint {
                    value,
                    stats: self.evaluate(value, &rolling),
                }
            })
            .collect();

        RollingWindowResult {
            window: self.window,
            std_dev_threshold: self.std_dev_threshold,
            baseline: self.baseline,
            points,
        }
    }

    fn evaluate(&self, current: f64, rolling: &RollingWindow) -> Option<WindowStats> {
        if !rolling.is_full() || !rolling.all_finite() {
            return None;
        }

        let baseline_len = match self.baseline {
            Baseline::Inclusive => rolling.len(),
            Baseline::Preceding => rolling.len() - 1,
        };
        let (mean, std_dev) = rolling.mean_and_std_dev(baseline_len)?;

        // A flat window has std_dev == 0, which leaves threshold == mean
        let threshold = mean + self.std_dev_threshold * std_dev;

        Some(WindowStats {
            mean,
            std_dev,
            threshold,
            is_spike: current > threshold,
        })
    }
}

/// Detect spikes in `series` with the inclusive baseline
///
/// Fails with `InvalidParameter` when `window < 2` or `k` is not a positive
/// finite number. An empty series yields an empty result.
pub fn detect_spikes(series: &[f64], window: usize, k: f64) -> EngineResult<RollingWindowResult> {
    Ok(SpikeDetector::new(window, k)?.detect(series))
}

/// Count-bounded rolling window of observations
///
/// Keeps the most recent `capacity` values; mean and standard deviation are
/// computed with a two-pass algorithm for stability.
#[derive(Debug, Clone)]
pub(crate) struct RollingWindow {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl RollingWindow {
    /// Storage grows with the pushed observations, never up front
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::new(),
        }
    }

    /// Add an observation, evicting the oldest one when full
    pub(crate) fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds `capacity` observations
    pub(crate) fn is_full(&self) -> bool {
        self.capacity > 0 && self.samples.len() == self.capacity
    }

    fn all_finite(&self) -> bool {
        self.samples.iter().all(|v| v.is_finite())
    }

    /// Mean and sample standard deviation of the oldest `n` observations
    fn mean_and_std_dev(&self, n: usize) -> Option<(f64, f64)> {
        if n < MIN_WINDOW || n > self.samples.len() {
            return None;
        }

        let mean = self.samples.iter().take(n).sum::<f64>() / n as f64;
        let variance = self
            .samples
            .iter()
            .take(n)
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;

        Some((mean, variance.sqrt()))
    }
}

/// Statistics of one full window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
    /// `mean + k * std_dev`
    pub threshold: f64,
    pub is_spike: bool,
}

impl WindowStats {
    /// Number of standard deviations `value` sits above the mean
    ///
    /// `None` for a flat window, where the ratio is undefined.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.std_dev < f64::EPSILON {
            return None;
        }
        Some((value - self.mean) / self.std_dev)
    }
}

/// One observation and, when a full window was available, its statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowPoint {
    pub value: f64,
    pub stats: Option<WindowStats>,
}

/// Per-position output of a spike scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingWindowResult {
    pub window: usize,
    pub std_dev_threshold: f64,
    pub baseline: Baseline,
    pub points: Vec<WindowPoint>,
}

impl RollingWindowResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn stats(&self, index: usize) -> Option<&WindowStats> {
        self.points.get(index)?.stats.as_ref()
    }

    pub fn rolling_mean(&self, index: usize) -> Option<f64> {
        self.stats(index).map(|s| s.mean)
    }

    pub fn rolling_std(&self, index: usize) -> Option<f64> {
        self.stats(index).map(|s| s.std_dev)
    }

    pub fn threshold(&self, index: usize) -> Option<f64> {
        self.stats(index).map(|s| s.threshold)
    }

    pub fn is_spike(&self, index: usize) -> Option<bool> {
        self.stats(index).map(|s| s.is_spike)
    }

    /// Number of positions with statistics
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.stats.is_some()).count()
    }

    /// Positions flagged as spikes, in series order
    pub fn spike_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.stats.map(|s| s.is_spike).unwrap_or(false))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn spike_count(&self) -> usize {
        self.spike_indices().len()
    }
}
