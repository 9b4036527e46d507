//! Subcommand implementations

pub mod alerts;
pub mod dataset;
pub mod spikes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use idguard_lib::data::Dataset;
use idguard_lib::StructuredLogger;

use crate::config::Config;
use crate::output::OutputFormat;

/// Settings shared by every subcommand
pub struct RunContext {
    pub config: Config,
    /// Dataset path from the command line, falling back to the config file
    pub data_path: Option<PathBuf>,
    pub format: OutputFormat,
    pub logger: StructuredLogger,
}

impl RunContext {
    /// Load the identity dataset, falling back to the built-in sample
    pub fn load_dataset(&self) -> Result<Dataset> {
        let dataset = Dataset::load_or_sample(self.data_path.as_deref()).with_context(|| {
            match &self.data_path {
                Some(path) => format!("Failed to load dataset from {}", path.display()),
                None => "Failed to load dataset".to_string(),
            }
        })?;
        self.logger.log_dataset_loaded(&dataset);
        Ok(dataset)
    }

    /// Load the dataset restricted to `regions`; no regions means all of them
    pub fn load_selection(&self, regions: &[String]) -> Result<Dataset> {
        let dataset = self.load_dataset()?;
        if regions.is_empty() {
            return Ok(dataset);
        }

        let selection = dataset.filter_regions(regions);
        self.logger
            .log_region_filter(regions, dataset.len(), selection.len());
        Ok(selection)
    }
}
