//! Identity record datasets

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{DataResult, EngineError};
use crate::models::IdentityRecord;

/// Dataset loaded when no path is given and the file exists
pub const DEFAULT_DATA_PATH: &str = "data/demographic.csv";

/// File name suggested for the suspicious activity export
pub const REPORT_FILE_NAME: &str = "suspicious_activity_report.csv";

/// Target average match score shown alongside the KPI
pub const DEFAULT_KPI_TARGET: f64 = 85.0;

/// Scores below this count as high risk in the KPI row
pub const DEFAULT_RISK_CUTOFF: f64 = 75.0;

/// Default passing score for the suspicious activity report
pub const DEFAULT_SCORE_THRESHOLD: f64 = 75.0;

const MAX_SCORE: f64 = 100.0;

const REPORT_HEADERS: [&str; 4] = ["Age", "Gender", "Region", "Score"];

/// Where a dataset came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Sample,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Sample => write!(f, "built-in sample"),
        }
    }
}

/// Headline metrics for a selection of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total: usize,
    pub average_score: Option<f64>,
    pub target: f64,
    /// Average score minus target
    pub delta_vs_target: Option<f64>,
    pub risk_cutoff: f64,
    pub high_risk_count: usize,
}

/// An ordered set of identity records
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: DataSource,
    records: Vec<IdentityRecord>,
}

/// Parse identity records from CSV with `Age,Gender,Region,Score` headers
pub fn read_records<R: Read>(reader: R) -> DataResult<Vec<IdentityRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

impl Dataset {
    pub fn from_records(source: DataSource, records: Vec<IdentityRecord>) -> Self {
        Self { source, records }
    }

    /// Load records from a CSV file
    pub fn from_csv(path: &Path) -> DataResult<Self> {
        let file = File::open(path)?;
        let records = read_records(BufReader::new(file))?;
        Ok(Self::from_records(DataSource::File(path.to_path_buf()), records))
    }

    /// Load `path` if given, else the default data file if present, else the
    /// built-in sample
    pub fn load_or_sample(path: Option<&Path>) -> DataResult<Self> {
        if let Some(path) = path {
            return Self::from_csv(path);
        }

        let default_path = Path::new(DEFAULT_DATA_PATH);
        if default_path.exists() {
            Self::from_csv(default_path)
        } else {
            Ok(Self::sample())
        }
    }

    /// Small built-in dataset for demos when no file is available
    pub fn sample() -> Self {
        const ROWS: [(u32, &str, &str, f64); 15] = [
            (25, "Male", "North", 88.0),
            (30, "Female", "South", 92.0),
            (22, "Male", "North", 75.0),
            (35, "Male", "West", 81.0),
            (40, "Female", "South", 95.0),
            (29, "Female", "East", 89.0),
            (45, "Male", "North", 78.0),
            (28, "Female", "West", 85.0),
            (33, "Male", "East", 60.0),
            (21, "Female", "South", 91.0),
            (50, "Male", "North", 82.0),
            (38, "Female", "West", 77.0),
            (27, "Male", "East", 69.0),
            (44, "Female", "South", 94.0),
            (31, "Male", "North", 73.0),
        ];

        let records = ROWS
            .iter()
            .map(|&(age, gender, region, score)| IdentityRecord {
                age,
                gender: gender.to_string(),
                region: region.to_string(),
                score,
            })
            .collect();

        Self::from_records(DataSource::Sample, records)
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn records(&self) -> &[IdentityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct regions in order of first appearance
    pub fn regions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.region.as_str()))
            .map(|r| r.region.clone())
            .collect()
    }

    /// Keep only records whose region is selected
    pub fn filter_regions(&self, selected: &[String]) -> Dataset {
        self.retain(|r| selected.iter().any(|s| s == &r.region))
    }

    /// Records scoring strictly below `threshold`
    ///
    /// The threshold must lie within the 0..=100 score range.
    pub fn below_threshold(&self, threshold: f64) -> DataResult<Dataset> {
        if !(0.0..=MAX_SCORE).contains(&threshold) {
            return Err(EngineError::invalid(
                "threshold",
                format!("must be between 0 and {MAX_SCORE}, got {threshold}"),
            )
            .into());
        }
        Ok(self.retain(|r| r.score < threshold))
    }

    /// Count of records scoring strictly below `cutoff`
    pub fn count_below(&self, cutoff: f64) -> usize {
        self.records.iter().filter(|r| r.score < cutoff).count()
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.records.iter().map(|r| r.score).sum::<f64>() / self.records.len() as f64)
    }

    pub fn kpis(&self, target: f64, risk_cutoff: f64) -> KpiSummary {
        let average_score = self.average_score();
        KpiSummary {
            total: self.records.len(),
            average_score,
            target,
            delta_vs_target: average_score.map(|avg| avg - target),
            risk_cutoff,
            high_risk_count: self.count_below(risk_cutoff),
        }
    }

    /// Write the records as CSV, header row included even when empty
    pub fn write_report<W: Write>(&self, writer: W) -> DataResult<usize> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(REPORT_HEADERS)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(self.records.len())
    }

    /// Write the report to `path`, replacing any existing file
    pub fn export_report(&self, path: &Path) -> DataResult<usize> {
        let file = File::create(path)?;
        self.write_report(file)
    }

    fn retain(&self, keep: impl Fn(&IdentityRecord) -> bool) -> Dataset {
        Dataset {
            source: self.source.clone(),
            records: self.records.iter().filter(|r| keep(*r)).cloned().collect(),
        }
    }
}
