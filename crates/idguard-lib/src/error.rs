//! Error types for the engine and its data collaborators

use thiserror::Error;

/// Errors raised by the anomaly and alerting engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A caller-supplied parameter is out of its valid range
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A rule registered as required could not find one of its input fields
    #[error("rule `{rule}` requires summary field `{field}`")]
    MissingField { rule: String, field: String },
}

impl EngineError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading or exporting tabular data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column `{0}` not found")]
    MissingColumn(String),

    #[error("row {row}: column `{column}` has non-numeric value `{value}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
pub type DataResult<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::invalid("window", "must be at least 2");
        assert_eq!(
            err.to_string(),
            "invalid parameter `window`: must be at least 2"
        );

        let err = EngineError::MissingField {
            rule: "demographic_burst".to_string(),
            field: "demographic_update_total_max".to_string(),
        };
        assert!(err.to_string().contains("demographic_burst"));
    }

    #[test]
    fn test_engine_error_wraps_into_data_error() {
        let data_err: DataError = EngineError::invalid("threshold", "out of range").into();
        assert!(matches!(data_err, DataError::Engine(_)));
        assert_eq!(
            data_err.to_string(),
            "invalid parameter `threshold`: out of range"
        );
    }
}
