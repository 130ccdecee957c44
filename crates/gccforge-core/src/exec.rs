//! External tool execution.
//!
//! Every git, configure and make invocation goes through the
//! [`CommandRunner`] trait so the pipeline can be driven against a
//! scripted runner in tests. Commands always carry an explicit working
//! directory; the process-wide current directory is never changed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ForgeError, Result};

/// How a command's stdout/stderr are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect output for parsing (git queries).
    Capture,
    /// Pass output through to the operator's terminal (configure, make).
    Stream,
}

/// A single external tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Executable name or path.
    pub program: String,

    /// Arguments, not including the program.
    pub args: Vec<String>,

    /// Directory the command runs in.
    pub cwd: PathBuf,

    pub output: OutputMode,
}

impl ToolCommand {
    /// Create a streamed command running in `cwd`.
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
            output: OutputMode::Stream,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Capture output instead of streaming it.
    pub fn captured(mut self) -> Self {
        self.output = OutputMode::Capture;
        self
    }

    /// Program and arguments joined with spaces, for logs and assertions.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {})", self.command_line(), self.cwd.display())
    }
}

/// Result of a finished command.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,

    /// Captured stdout (empty when streamed).
    pub stdout: String,

    /// Captured stderr (empty when streamed).
    pub stderr: String,

    pub duration: Duration,
}

impl ToolOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Backend that executes external tools.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion.
    ///
    /// A non-zero exit is reported through [`ToolOutput::exit_code`], not as
    /// an error; only failing to start the process is an error.
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let start = Instant::now();
        debug!(command = %command, "spawning");

        let mut child = Command::new(&command.program);
        child.args(&command.args).current_dir(&command.cwd);

        let (exit_code, stdout, stderr) = match command.output {
            OutputMode::Capture => {
                let output = child
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(|source| spawn_error(command, source))?;
                (
                    output.status.code(),
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                )
            }
            OutputMode::Stream => {
                let status = child
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(|source| spawn_error(command, source))?;
                (status.code(), String::new(), String::new())
            }
        };

        let duration = start.elapsed();
        debug!(command = %command.program, ?exit_code, ?duration, "finished");

        Ok(ToolOutput {
            exit_code,
            stdout,
            stderr,
            duration,
        })
    }
}

fn spawn_error(command: &ToolCommand, source: std::io::Error) -> ForgeError {
    ForgeError::Spawn {
        program: command.program.clone(),
        source,
    }
}
