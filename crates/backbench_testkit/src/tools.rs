//! [`BackupTools`] backed by a [`FakeServer`](crate::FakeServer).
//!
//! Dumps and log excerpts are small text files. A dump holds a
//! `-- DUMP ROWS <n>` line and replaying it recreates the table with that
//! many rows. A log excerpt holds one `-- APPLY ROWS <n>` line per event in
//! the requested window and replaying it adds those rows.

use backbench_core::{BackupTools, BenchError, BenchResult, LogWindow};
use parking_lot::Mutex;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use crate::server::{ServerState, ToolCall};

const DUMP_MARKER: &str = "-- DUMP ROWS ";
const APPLY_MARKER: &str = "-- APPLY ROWS ";

/// Tools that read and write the state of a [`FakeServer`](crate::FakeServer).
#[derive(Debug, Clone)]
pub struct FakeTools {
    state: Arc<Mutex<ServerState>>,
}

impl FakeTools {
    pub(crate) fn new(state: Arc<Mutex<ServerState>>) -> Self {
        Self { state }
    }
}

impl BackupTools for FakeTools {
    fn dump(&mut self, output: &Path) -> BenchResult<()> {
        let mut state = self.state.lock();
        state.require_table()?;
        let rows = state.rows;

        let mut file = fs::File::create(output)?;
        writeln!(file, "CREATE TABLE customers (id INT AUTO_INCREMENT PRIMARY KEY);")?;
        writeln!(file, "{DUMP_MARKER}{rows}")?;
        // One short line per row keeps dump size proportional to the table.
        for _ in 0..rows.min(10_000) {
            writeln!(file, "-- row")?;
        }

        state.calls.push(ToolCall::Dump {
            output: output.to_path_buf(),
            rows,
        });
        Ok(())
    }

    fn extract_log(
        &mut self,
        log_file: &Path,
        window: Option<&LogWindow>,
        output: &Path,
    ) -> BenchResult<()> {
        let mut state = self.state.lock();
        let name = log_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let log = state.log(&name).ok_or_else(|| {
            BenchError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Could not open log file '{}'", log_file.display()),
            ))
        })?;

        let events: Vec<u64> = log
            .events
            .iter()
            .filter(|e| match window {
                Some(w) => e.start >= w.start && e.end <= w.stop,
                None => true,
            })
            .map(|e| e.rows)
            .collect();

        let mut file = fs::File::create(output)?;
        writeln!(file, "# at {}", window.map_or(0, |w| w.start))?;
        for rows in &events {
            writeln!(file, "{APPLY_MARKER}{rows}")?;
        }

        state.calls.push(ToolCall::Extract {
            log_file: name,
            window: window.cloned(),
            rows: events.iter().sum(),
        });
        Ok(())
    }

    fn apply(&mut self, input: &Path) -> BenchResult<()> {
        let mut state = self.state.lock();
        state.calls.push(ToolCall::Apply {
            input: input.to_path_buf(),
        });
        if let Some(message) = state.fail_apply.clone() {
            return Err(BenchError::ToolFailed {
                tool: "mysql".into(),
                status: failed_status(),
                stderr: message,
            });
        }

        let text = fs::read_to_string(input)?;
        for line in text.lines() {
            if let Some(rows) = parse_count(line, DUMP_MARKER) {
                state.table_exists = true;
                state.rows = rows;
            } else if let Some(rows) = parse_count(line, APPLY_MARKER) {
                state.require_table()?;
                state.rows += rows;
            }
        }
        Ok(())
    }
}

fn parse_count(line: &str, marker: &str) -> Option<u64> {
    line.strip_prefix(marker)?.trim().parse().ok()
}

/// A non-zero exit status for simulated tool failures.
#[cfg(unix)]
fn failed_status() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(1 << 8)
}

#[cfg(windows)]
fn failed_status() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(1)
}
