//! Configure-step arguments.
//!
//! [`BuildOptions`] is the operator-facing configuration surface;
//! [`BuildConfiguration`] is the immutable record derived from it and the
//! resolved version.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::version::ReleaseVersion;

/// Front-ends enabled when none are requested.
pub const DEFAULT_LANGUAGES: &[&str] = &["c", "c++"];

/// Native triple for the machine gccforge runs on.
pub fn default_triple() -> String {
    format!("{}-linux-gnu", std::env::consts::ARCH)
}

/// Number of build workers: one per detected core.
pub fn detected_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Build choices that are not derived from the version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Enabled language front-ends.
    pub languages: Vec<String>,

    /// build = host = target triple.
    pub triple: String,

    /// Pass `--disable-bootstrap` (single-stage build).
    pub disable_bootstrap: bool,

    /// Pass `--disable-multilib`.
    pub disable_multilib: bool,

    /// Suffix installed binaries with `-<version>`.
    pub program_suffix: bool,

    /// Parallel make workers.
    pub jobs: usize,

    /// Prefix the install step with `sudo`.
    pub use_sudo: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            triple: default_triple(),
            disable_bootstrap: false,
            disable_multilib: true,
            program_suffix: true,
            jobs: detected_jobs(),
            use_sudo: true,
        }
    }
}

/// Immutable configure record for one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    pub version: ReleaseVersion,
    pub triple: String,
    pub prefix: PathBuf,
    pub program_suffix: Option<String>,
    pub languages: Vec<String>,
    pub disable_multilib: bool,
    pub disable_bootstrap: bool,
}

impl BuildConfiguration {
    pub fn new(version: ReleaseVersion, layout: &Layout, options: &BuildOptions) -> Self {
        Self {
            version,
            triple: options.triple.clone(),
            prefix: layout.install_prefix(&version),
            program_suffix: options.program_suffix.then(|| format!("-{version}")),
            languages: options.languages.clone(),
            disable_multilib: options.disable_multilib,
            disable_bootstrap: options.disable_bootstrap,
        }
    }

    /// Arguments for the upstream `configure` script.
    pub fn configure_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--build={}", self.triple),
            format!("--host={}", self.triple),
            format!("--target={}", self.triple),
            format!("--prefix={}", self.prefix.display()),
            format!("--enable-languages={}", self.languages.join(",")),
        ];
        if let Some(suffix) = &self.program_suffix {
            args.push(format!("--program-suffix={suffix}"));
        }
        if self.disable_multilib {
            args.push("--disable-multilib".to_string());
        }
        if self.disable_bootstrap {
            args.push("--disable-bootstrap".to_string());
        }
        args
    }

    /// Installed name of a driver, e.g. `gcc-13.2.0`.
    pub fn driver_name(&self, driver: &str) -> String {
        match &self.program_suffix {
            Some(suffix) => format!("{driver}{suffix}"),
            None => driver.to_string(),
        }
    }
}
