//! Error types for report generation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that can occur while loading metrics or drawing charts.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// None of the metrics files exist.
    #[error("no metrics files found in {}", dir.display())]
    NoData {
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// A column the chart needs is absent.
    #[error("{file}: missing column '{column}'")]
    MissingColumn {
        /// Metrics file name.
        file: String,
        /// Column name.
        column: String,
    },

    /// A cell that should hold a number does not.
    #[error("{file}: column '{column}' has non-numeric value '{value}'")]
    InvalidValue {
        /// Metrics file name.
        file: String,
        /// Column name.
        column: String,
        /// Offending cell.
        value: String,
    },

    /// The drawing backend failed.
    #[error("failed to render chart: {0}")]
    Render(String),

    /// The requested output format was not compiled in.
    #[error("unsupported chart format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ReportError::MissingColumn {
            file: "full_backup_log.csv".into(),
            column: "backup_time_s".into(),
        };
        assert_eq!(
            err.to_string(),
            "full_backup_log.csv: missing column 'backup_time_s'"
        );

        let err = ReportError::NoData {
            dir: PathBuf::from("/tmp/run"),
        };
        assert!(err.to_string().contains("/tmp/run"));
    }
}
