//! gccforge Core Library
//!
//! Fetches, configures, builds and installs GCC from the upstream git
//! repository. The pipeline is:
//!
//! 1. validate the requested version, if any ([`version`])
//! 2. clone or update the checkout, resolve the latest release when no
//!    version was given, check out the tag and download prerequisites
//!    ([`repo`])
//! 3. derive the configure arguments ([`configure`])
//! 4. configure, build, install and optionally test ([`build`])
//!
//! [`pipeline::ForgePipeline`] sequences these and returns a
//! [`report::RunReport`].

pub mod build;
pub mod configure;
pub mod error;
pub mod exec;
pub mod fakes;
pub mod layout;
pub mod pipeline;
pub mod repo;
pub mod report;
pub mod telemetry;
pub mod version;

pub use build::{BuildRunner, Phase, TestStatus};
pub use configure::{default_triple, detected_jobs, BuildConfiguration, BuildOptions, DEFAULT_LANGUAGES};
pub use error::{ForgeError, Result};
pub use exec::{CommandRunner, OutputMode, ProcessRunner, ToolCommand, ToolOutput};
pub use layout::Layout;
pub use pipeline::{ForgeConfig, ForgePipeline, RunFailure};
pub use repo::{
    release_tag, select_latest_release, SourceRepository, SyncAction, DEFAULT_REPO_URL,
    RELEASE_TAG_PATTERN,
};
pub use report::{format_duration, PhaseOutcome, PhaseRecord, RunReport};
pub use telemetry::init_tracing;
pub use version::ReleaseVersion;

/// gccforge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
