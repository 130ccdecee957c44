//! gccforge - build and install GCC from source
//!
//! Clones (or updates) the upstream GCC repository, checks out a release,
//! configures it into a fresh build directory, builds it with one worker
//! per core and installs it into a version-named prefix next to the
//! checkout.
//!
//! ```text
//! gccforge [--version <X.Y.Z>] [--run-tests] [--help]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use gccforge_core::{
    default_triple, detected_jobs, BuildOptions, ForgeConfig, ForgePipeline, Layout,
    ProcessRunner, RunFailure, RunReport, DEFAULT_LANGUAGES, DEFAULT_REPO_URL,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "gccforge")]
#[command(author = "Stevedores Org")]
#[command(about = "Fetch, configure, build and install GCC from source", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// GCC release to build, e.g. 14.1.0 (default: latest release tag)
    #[arg(short = 'v', long = "version", value_name = "X.Y.Z")]
    version: Option<String>,

    /// Run the test suite after installing (failures are reported, not fatal)
    #[arg(long)]
    run_tests: bool,

    /// Directory holding the checkout, build directory and install prefixes
    #[arg(long, env = "GCCFORGE_ROOT", default_value = ".")]
    root: PathBuf,

    /// Upstream repository to clone
    #[arg(long, env = "GCCFORGE_REPO_URL", default_value = DEFAULT_REPO_URL)]
    repo_url: String,

    /// Comma-separated language front-ends to enable
    #[arg(long, env = "GCCFORGE_LANGUAGES", value_delimiter = ',')]
    languages: Vec<String>,

    /// Skip the three-stage bootstrap
    #[arg(long)]
    disable_bootstrap: bool,

    /// Keep multilib support enabled
    #[arg(long)]
    enable_multilib: bool,

    /// Install binaries without the -<version> suffix
    #[arg(long)]
    no_program_suffix: bool,

    /// Build/host/target triple (default: native)
    #[arg(long, env = "GCCFORGE_TRIPLE")]
    triple: Option<String>,

    /// Parallel build workers (default: detected CPU cores)
    #[arg(short = 'j', long, env = "GCCFORGE_JOBS")]
    jobs: Option<usize>,

    /// Run `make install-strip` without sudo
    #[arg(long)]
    no_sudo: bool,

    /// Hard-reset an existing checkout to the remote default branch
    #[arg(long)]
    reset: bool,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn forge_config(&self) -> Result<ForgeConfig> {
        let mut languages: Vec<String> = self
            .languages
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if languages.is_empty() {
            languages = DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect();
        }

        let options = BuildOptions {
            languages,
            triple: self.triple.clone().unwrap_or_else(default_triple),
            disable_bootstrap: self.disable_bootstrap,
            disable_multilib: !self.enable_multilib,
            program_suffix: !self.no_program_suffix,
            jobs: self.jobs.unwrap_or_else(detected_jobs),
            use_sudo: !self.no_sudo,
        };

        let layout = Layout::new(&self.root)
            .with_context(|| format!("Failed to resolve root directory {:?}", self.root))?;

        Ok(ForgeConfig {
            layout,
            repo_url: self.repo_url.clone(),
            requested_version: self.version.clone(),
            run_tests: self.run_tests,
            reset: self.reset,
            options,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    gccforge_core::init_tracing(cli.json, level);

    let config = cli.forge_config()?;
    info!(
        root = %config.layout.root().display(),
        version = config.requested_version.as_deref().unwrap_or("latest"),
        jobs = config.options.jobs,
        "starting gccforge"
    );

    match ForgePipeline::new(&ProcessRunner).run(&config).await {
        Ok(report) => {
            print_summary(&report);
            emit_report(&report, cli.report.as_deref())
        }
        Err(RunFailure { report, error }) => {
            print_summary(&report);
            emit_report(&report, cli.report.as_deref())?;
            Err(anyhow::Error::new(error).context("GCC build aborted"))
        }
    }
}

fn emit_report(report: &RunReport, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        write_report(report, path)?;
        info!(path = %path.display(), "run report written");
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    for line in report.summary_lines() {
        println!("{line}");
    }
    if let Some(usage) = report.usage_instructions() {
        println!();
        println!("{usage}");
    }
}

fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report to {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_build_latest_without_tests() {
        let cli = Cli::try_parse_from(["gccforge"]).unwrap();
        assert!(cli.version.is_none());
        assert!(!cli.run_tests);

        let config = cli.forge_config().unwrap();
        assert!(config.requested_version.is_none());
        assert_eq!(config.options.languages, vec!["c", "c++"]);
        assert!(config.options.disable_multilib);
        assert!(config.options.program_suffix);
        assert!(config.options.use_sudo);
        assert!(config.options.jobs >= 1);
    }

    #[test]
    fn short_and_long_version_flags() {
        let cli = Cli::try_parse_from(["gccforge", "-v", "13.2.0", "--run-tests"]).unwrap();
        assert_eq!(cli.version.as_deref(), Some("13.2.0"));
        assert!(cli.run_tests);

        let cli = Cli::try_parse_from(["gccforge", "--version", "14.1.0"]).unwrap();
        assert_eq!(cli.version.as_deref(), Some("14.1.0"));
    }

    #[test]
    fn version_flag_requires_value() {
        assert!(Cli::try_parse_from(["gccforge", "--version"]).is_err());
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = Cli::try_parse_from(["gccforge", "--frobnicate"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn help_is_recognised() {
        let err = Cli::try_parse_from(["gccforge", "-h"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn build_options_from_flags() {
        let cli = Cli::try_parse_from([
            "gccforge",
            "--languages",
            "c,c++,fortran",
            "--disable-bootstrap",
            "--enable-multilib",
            "--no-program-suffix",
            "--triple",
            "aarch64-linux-gnu",
            "-j",
            "3",
            "--no-sudo",
            "--root",
            "/opt/toolchains",
        ])
        .unwrap();

        let config = cli.forge_config().unwrap();
        assert_eq!(config.options.languages, vec!["c", "c++", "fortran"]);
        assert!(config.options.disable_bootstrap);
        assert!(!config.options.disable_multilib);
        assert!(!config.options.program_suffix);
        assert_eq!(config.options.triple, "aarch64-linux-gnu");
        assert_eq!(config.options.jobs, 3);
        assert!(!config.options.use_sudo);
        assert_eq!(config.layout.root(), Path::new("/opt/toolchains"));
    }

    #[test]
    fn empty_language_list_falls_back_to_defaults() {
        for value in ["", ",", " , "] {
            let cli = Cli::try_parse_from(["gccforge", "--languages", value]).unwrap();
            let config = cli.forge_config().unwrap();
            assert_eq!(config.options.languages, vec!["c", "c++"], "{value:?}");
        }
    }

    #[test]
    fn default_root_is_absolute() {
        let cli = Cli::try_parse_from(["gccforge"]).unwrap();
        let config = cli.forge_config().unwrap();
        assert!(config.layout.root().is_absolute());
        assert_eq!(config.layout.root(), std::env::current_dir().unwrap().as_path());
    }

    #[test]
    fn partial_report_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = RunReport::new(chrono::Utc::now());
        report.record(
            gccforge_core::Phase::Configure,
            std::time::Duration::from_secs(3),
            gccforge_core::PhaseOutcome::Failed,
        );
        emit_report(&report, Some(&path)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["phases"][0]["phase"], "configure");
        assert_eq!(json["phases"][0]["outcome"], "failed");
    }
}
