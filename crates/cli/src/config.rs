//! Configuration management for the CLI

use anyhow::{Context, Result};
use idguard_lib::anomaly::{DEFAULT_STD_DEV_THRESHOLD, DEFAULT_WINDOW};
use idguard_lib::data::{DEFAULT_KPI_TARGET, DEFAULT_RISK_CUTOFF, DEFAULT_SCORE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for configuration environment variables, e.g. `IDGUARD_THRESHOLD`
const ENV_PREFIX: &str = "IDGUARD";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity dataset to load instead of the default location
    pub data_path: Option<PathBuf>,
    /// Passing score for the suspicious activity report
    pub threshold: f64,
    /// Rolling window length for spike detection
    pub window: usize,
    /// Standard deviations above the rolling mean that count as a spike
    pub k: f64,
    /// Target average match score
    pub kpi_target: f64,
    /// Scores below this count as high risk
    pub risk_cutoff: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            threshold: DEFAULT_SCORE_THRESHOLD,
            window: DEFAULT_WINDOW,
            k: DEFAULT_STD_DEV_THRESHOLD,
            kpi_target: DEFAULT_KPI_TARGET,
            risk_cutoff: DEFAULT_RISK_CUTOFF,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default per-user file is optional.
    /// Environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(default_path) = Self::config_path() {
                    builder =
                        builder.add_source(config::File::from(default_path.as_path()).required(false));
                }
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Get the default configuration file path
    fn config_path() -> Option<PathBuf> {
        let home = dirs_next::home_dir()?;
        Some(home.join(".config").join("idguard").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.threshold, 75.0);
        assert_eq!(config.window, 7);
        assert_eq!(config.k, 3.0);
        assert_eq!(config.kpi_target, 85.0);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idguard.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"threshold": 60, "window": 14}}"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.threshold, 60.0);
        assert_eq!(config.window, 14);
        assert_eq!(config.risk_cutoff, 75.0);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = Config::load(Some(Path::new("/nonexistent/idguard.json")));
        assert!(result.is_err());
    }
}
