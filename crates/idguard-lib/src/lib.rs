//! Identity analytics library
//!
//! This crate provides the core functionality for:
//! - Rolling-window spike detection over numeric series
//! - Rule-based alert generation over aggregate summaries
//! - Loading, filtering and exporting identity record datasets
//! - Structured logging of reporting runs

pub mod anomaly;
pub mod data;
pub mod error;
pub mod models;
pub mod observability;
pub mod summary;

pub use anomaly::{detect_spikes, generate_alerts, Alert, AlertSeverity, RollingWindowResult};
pub use error::{DataError, EngineError};
pub use models::*;
pub use observability::StructuredLogger;
pub use summary::SummaryBuilder;
