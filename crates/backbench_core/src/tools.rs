//! External backup and restore utilities.
//!
//! The harness never reads or writes dump formats itself. Every backup and
//! restore is a subprocess whose stdout or stdin is wired to a file.

use crate::config::{BenchConfig, ConnectionConfig, ToolPaths};
use crate::error::{BenchError, BenchResult};
use crate::types::LogWindow;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// The three external operations a backup benchmark needs.
///
/// Every call blocks until the tool exits. There is no timeout and no retry.
pub trait BackupTools {
    /// Writes a full logical dump of the benchmark schema to `output`.
    fn dump(&mut self, output: &Path) -> BenchResult<()>;

    /// Writes replayable SQL for a binary log file to `output`.
    ///
    /// With a window, only events inside `[start, stop)` are extracted;
    /// without one the whole file is.
    fn extract_log(
        &mut self,
        log_file: &Path,
        window: Option<&LogWindow>,
        output: &Path,
    ) -> BenchResult<()>;

    /// Replays the SQL in `input` against the benchmark schema.
    fn apply(&mut self, input: &Path) -> BenchResult<()>;
}

/// [`BackupTools`] implemented with the MySQL command-line utilities.
#[derive(Debug, Clone)]
pub struct CommandTools {
    paths: ToolPaths,
    connection: ConnectionConfig,
}

impl CommandTools {
    /// Creates tool wrappers from the run configuration.
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            paths: config.tools.clone(),
            connection: config.connection.clone(),
        }
    }

    /// Builds a client command with connection flags.
    ///
    /// The password travels in `MYSQL_PWD` so it does not show up in the
    /// process list.
    fn client(&self, program: &Path) -> Command {
        let c = &self.connection;
        let mut cmd = Command::new(program);
        cmd.arg(format!("--host={}", c.host))
            .arg(format!("--port={}", c.port))
            .arg(format!("--user={}", c.user))
            .env("MYSQL_PWD", &c.password);
        cmd
    }
}

impl BackupTools for CommandTools {
    fn dump(&mut self, output: &Path) -> BenchResult<()> {
        let mut cmd = self.client(&self.paths.mysqldump);
        cmd.arg(&self.connection.database);
        run(cmd, Stdio::null(), Some(output))
    }

    fn extract_log(
        &mut self,
        log_file: &Path,
        window: Option<&LogWindow>,
        output: &Path,
    ) -> BenchResult<()> {
        let mut cmd = Command::new(&self.paths.mysqlbinlog);
        cmd.args(window_args(window)).arg(log_file);
        run(cmd, Stdio::null(), Some(output))
    }

    fn apply(&mut self, input: &Path) -> BenchResult<()> {
        let mut cmd = self.client(&self.paths.mysql);
        cmd.arg(&self.connection.database);
        let stdin = File::open(input)?;
        run(cmd, Stdio::from(stdin), None)
    }
}

/// Position flags for `mysqlbinlog`.
pub fn window_args(window: Option<&LogWindow>) -> Vec<String> {
    match window {
        Some(w) => vec![
            format!("--start-position={}", w.start),
            format!("--stop-position={}", w.stop),
        ],
        None => Vec::new(),
    }
}

/// Runs a command to completion.
///
/// Stdout goes to `output` when given and is discarded otherwise. Stderr is
/// captured and attached to the error on a non-zero exit.
fn run(mut cmd: Command, stdin: Stdio, output: Option<&Path>) -> BenchResult<()> {
    let tool = program_name(&cmd);
    let stdout = match output {
        Some(path) => Stdio::from(File::create(path)?),
        None => Stdio::null(),
    };
    debug!(tool = %tool, args = ?cmd.get_args().collect::<Vec<_>>(), "running");

    let result = match cmd
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::piped())
        .output()
    {
        Ok(result) => result,
        Err(e) => {
            // Nothing ran, so the empty output file is not an artifact.
            if let Some(path) = output {
                let _ = fs::remove_file(path);
            }
            return Err(BenchError::spawn_failed(tool, e));
        }
    };

    if result.status.success() {
        Ok(())
    } else {
        Err(BenchError::ToolFailed {
            tool,
            status: result.status,
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        })
    }
}

fn program_name(cmd: &Command) -> String {
    let program = PathBuf::from(cmd.get_program());
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string_lossy().into_owned())
}
