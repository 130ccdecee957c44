//! Configure, build, install and test steps.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::configure::BuildConfiguration;
use crate::error::{ForgeError, Result};
use crate::exec::{CommandRunner, ToolCommand};

/// Pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Clone,
    Update,
    ResolveVersion,
    Checkout,
    Prerequisites,
    PrepareBuildDir,
    Configure,
    Build,
    Install,
    Test,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Clone => "clone",
            Phase::Update => "update",
            Phase::ResolveVersion => "version resolution",
            Phase::Checkout => "checkout",
            Phase::Prerequisites => "prerequisite download",
            Phase::PrepareBuildDir => "build directory setup",
            Phase::Configure => "configure",
            Phase::Build => "build",
            Phase::Install => "install",
            Phase::Test => "test suite",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of the optional test-suite phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum TestStatus {
    Skipped,
    Passed,
    Failed { exit_code: Option<i32> },
}

/// Runs the build steps in an explicit build directory.
pub struct BuildRunner<'r> {
    runner: &'r dyn CommandRunner,
    source_dir: PathBuf,
    build_dir: PathBuf,
    jobs: usize,
    use_sudo: bool,
}

impl<'r> BuildRunner<'r> {
    pub fn new(
        runner: &'r dyn CommandRunner,
        source_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
        jobs: usize,
        use_sudo: bool,
    ) -> Self {
        Self {
            runner,
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            jobs: jobs.max(1),
            use_sudo,
        }
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Remove and recreate the build directory.
    ///
    /// This deletes any previous build output and cannot be undone.
    pub async fn prepare_build_dir(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.build_dir).await? {
            warn!(
                path = %self.build_dir.display(),
                "removing existing build directory and all of its contents"
            );
            tokio::fs::remove_dir_all(&self.build_dir).await?;
        }
        tokio::fs::create_dir_all(&self.build_dir).await?;
        Ok(())
    }

    /// Run `<source>/configure` from the build directory.
    pub async fn configure(&self, config: &BuildConfiguration) -> Result<()> {
        let script = self.source_dir.join("configure");
        let cmd = ToolCommand::new(script.to_string_lossy(), &self.build_dir)
            .args(config.configure_args());
        self.run_phase(&cmd, Phase::Configure).await
    }

    /// Parallel `make`.
    pub async fn build(&self) -> Result<()> {
        let cmd = self.make().arg(format!("-j{}", self.jobs));
        info!(jobs = self.jobs, "starting parallel build");
        self.run_phase(&cmd, Phase::Build).await
    }

    /// `make install-strip`, elevated with sudo when configured.
    pub async fn install(&self) -> Result<()> {
        let cmd = if self.use_sudo {
            ToolCommand::new("sudo", &self.build_dir).args(["make", "install-strip"])
        } else {
            self.make().arg("install-strip")
        };
        self.run_phase(&cmd, Phase::Install).await
    }

    /// Run the upstream test suite.
    ///
    /// Never fails: a non-zero exit (or failure to start) is reported as a
    /// warning through the returned status.
    pub async fn run_tests(&self) -> TestStatus {
        let cmd = self.make().args([format!("-j{}", self.jobs), "-k".to_string(), "check".to_string()]);
        info!(command = %cmd, "running test suite");

        match self.runner.run(&cmd).await {
            Ok(out) if out.success() => TestStatus::Passed,
            Ok(out) => {
                warn!(exit_code = ?out.exit_code, "test suite reported failures");
                TestStatus::Failed {
                    exit_code: out.exit_code,
                }
            }
            Err(e) => {
                warn!(error = %e, "test suite could not be run");
                TestStatus::Failed { exit_code: None }
            }
        }
    }

    fn make(&self) -> ToolCommand {
        ToolCommand::new("make", &self.build_dir)
    }

    async fn run_phase(&self, cmd: &ToolCommand, phase: Phase) -> Result<()> {
        info!(phase = %phase, command = %cmd, "running");
        let out = self.runner.run(cmd).await?;
        if !out.success() {
            return Err(ForgeError::ExternalToolFailure {
                phase,
                exit_code: out.exit_code,
            });
        }
        Ok(())
    }
}
