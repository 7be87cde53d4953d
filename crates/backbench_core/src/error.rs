//! Error types for backbench workflows.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while running a benchmark workflow.
///
/// There is no retry anywhere in the harness: every variant halts the run
/// that produced it.
#[derive(Debug, Error)]
pub enum BenchError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// MySQL client error.
    #[error("mysql error: {0}")]
    Mysql(#[from] mysql::Error),

    /// CSV read or write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration value is out of range or malformed.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// An external tool exited with a non-zero status.
    #[error("{tool} failed with {status}: {stderr}")]
    ToolFailed {
        /// Name of the binary.
        tool: String,
        /// Exit status reported by the OS.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external tool could not be started because it is not installed.
    #[error("{tool} not found on PATH")]
    ToolNotFound {
        /// Name of the binary.
        tool: String,
    },

    /// The server reported no binary log status (binary logging disabled).
    #[error("server returned no binary log status; is log_bin enabled?")]
    MissingLogStatus,

    /// The log offset moved backwards inside one log file.
    #[error("log position regressed in {file}: {start} -> {stop}")]
    LogRegressed {
        /// Log file name.
        file: String,
        /// Position before the batch.
        start: u64,
        /// Position after the batch.
        stop: u64,
    },
}

impl BenchError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Maps a spawn failure to [`BenchError::ToolNotFound`] when the binary
    /// is missing, and to [`BenchError::Io`] otherwise.
    pub fn spawn_failed(tool: impl Into<String>, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::ToolNotFound { tool: tool.into() }
        } else {
            Self::Io(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_not_found_maps_to_tool_not_found() {
        let err = BenchError::spawn_failed("mysqldump", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, BenchError::ToolNotFound { ref tool } if tool == "mysqldump"));
    }

    #[test]
    fn spawn_other_maps_to_io() {
        let err = BenchError::spawn_failed(
            "mysql",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, BenchError::Io(_)));
    }

    #[test]
    fn regressed_message_names_file() {
        let err = BenchError::LogRegressed {
            file: "binlog.000003".into(),
            start: 900,
            stop: 120,
        };
        assert_eq!(
            err.to_string(),
            "log position regressed in binlog.000003: 900 -> 120"
        );
    }
}
