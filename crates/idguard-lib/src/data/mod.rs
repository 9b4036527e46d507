//! Tabular data collaborators
//!
//! Loads identity records and numeric series from CSV, applies the region
//! and score filters, and writes the suspicious activity report. The engine
//! in [`crate::anomaly`] never touches files; everything here feeds it.

mod records;
mod series;

pub use records::{
    read_records, DataSource, Dataset, KpiSummary, DEFAULT_DATA_PATH, DEFAULT_KPI_TARGET,
    DEFAULT_RISK_CUTOFF, DEFAULT_SCORE_THRESHOLD, REPORT_FILE_NAME,
};
pub use series::{count_rows, load_series, read_series};
