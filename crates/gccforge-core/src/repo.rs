//! Upstream source checkout management.
//!
//! Keeps a local clone of the GCC repository current, resolves the latest
//! release tag and checks out the requested release.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::build::Phase;
use crate::error::{ForgeError, Result};
use crate::exec::{CommandRunner, ToolCommand, ToolOutput};
use crate::version::ReleaseVersion;

/// Default upstream GCC repository.
pub const DEFAULT_REPO_URL: &str = "https://gcc.gnu.org/git/gcc.git";

/// Prefix shared by all upstream release tags.
pub const RELEASE_TAG_PREFIX: &str = "releases/gcc-";

/// Glob passed to `git tag --list`.
pub const RELEASE_TAG_PATTERN: &str = "releases/gcc-*";

/// Number of tags surfaced when a checkout fails.
pub const RECENT_TAG_LIMIT: usize = 10;

fn release_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^releases/gcc-(\d+\.\d+\.\d+)$").expect("release tag regex is valid")
    })
}

/// Tag name for a release version.
pub fn release_tag(version: &ReleaseVersion) -> String {
    format!("{RELEASE_TAG_PREFIX}{version}")
}

/// Parse a final release tag. RC and snapshot tags yield `None`.
pub fn parse_release_tag(tag: &str) -> Option<ReleaseVersion> {
    let caps = release_tag_regex().captures(tag.trim())?;
    ReleaseVersion::parse(&caps[1]).ok()
}

/// Final releases among `tags`, newest first, without duplicates.
pub fn sorted_releases<'a, I>(tags: I) -> Vec<ReleaseVersion>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut versions: Vec<ReleaseVersion> = tags.into_iter().filter_map(parse_release_tag).collect();
    versions.sort_unstable_by(|a, b| b.cmp(a));
    versions.dedup();
    versions
}

/// Greatest final release among `tags`.
pub fn select_latest_release<'a, I>(tags: I) -> Result<ReleaseVersion>
where
    I: IntoIterator<Item = &'a str>,
{
    sorted_releases(tags)
        .into_iter()
        .next()
        .ok_or_else(|| ForgeError::NoReleaseTagFound {
            pattern: RELEASE_TAG_PATTERN.to_string(),
        })
}

/// What [`SourceRepository::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Cloned,
    Updated,
}

/// A local working copy of the upstream repository.
pub struct SourceRepository<'r> {
    runner: &'r dyn CommandRunner,
    path: PathBuf,
    url: String,
}

impl<'r> SourceRepository<'r> {
    pub fn new(runner: &'r dyn CommandRunner, path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            runner,
            path: path.into(),
            url: url.into(),
        }
    }

    /// Checkout directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone when absent, fetch when present.
    ///
    /// With `reset`, an existing checkout is also hard-reset to the remote
    /// default branch after fetching.
    pub async fn sync(&self, reset: bool) -> Result<SyncAction> {
        if !self.path.exists() {
            info!(url = %self.url, path = %self.path.display(), "cloning upstream repository");
            let (parent, dest) = self.clone_target();
            tokio::fs::create_dir_all(&parent).await?;
            let clone = ToolCommand::new("git", &parent)
                .arg("clone")
                .arg(self.url.as_str())
                .arg(dest);
            self.run_checked(&clone, Phase::Clone).await?;
            return Ok(SyncAction::Cloned);
        }

        if !self.path.join(".git").exists() {
            return Err(ForgeError::NotARepository {
                path: self.path.clone(),
            });
        }

        info!(path = %self.path.display(), "updating existing checkout");
        let fetch = self.git().args(["fetch", "--tags", "--force", "origin"]);
        self.run_checked(&fetch, Phase::Update).await?;

        if reset {
            warn!(path = %self.path.display(), "hard-resetting checkout to origin/HEAD");
            let reset = self.git().args(["reset", "--hard", "origin/HEAD"]);
            self.run_checked(&reset, Phase::Update).await?;
        }

        Ok(SyncAction::Updated)
    }

    /// All tags matching the release pattern, as git reports them.
    pub async fn list_release_tags(&self) -> Result<Vec<String>> {
        let list = self
            .git()
            .args(["tag", "--list", RELEASE_TAG_PATTERN])
            .captured();
        let output = self.run_checked(&list, Phase::ResolveVersion).await?;
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Resolve the newest final release from the local tags.
    pub async fn resolve_latest(&self) -> Result<ReleaseVersion> {
        let tags = self.list_release_tags().await?;
        debug!(count = tags.len(), "release tags listed");
        let latest = select_latest_release(tags.iter().map(String::as_str))?;
        info!(version = %latest, "resolved latest release");
        Ok(latest)
    }

    /// Newest `limit` final release tags.
    pub async fn recent_release_tags(&self, limit: usize) -> Result<Vec<String>> {
        let tags = self.list_release_tags().await?;
        Ok(sorted_releases(tags.iter().map(String::as_str))
            .iter()
            .take(limit)
            .map(release_tag)
            .collect())
    }

    /// Check out the release tag for `version`.
    ///
    /// On failure the error carries the most recent valid tags so the
    /// operator can pick one.
    pub async fn checkout(&self, version: &ReleaseVersion) -> Result<()> {
        let tag = release_tag(version);
        info!(tag = %tag, "checking out release");
        let checkout = self.git().args(["checkout", tag.as_str()]).captured();
        let output = self.runner.run(&checkout).await?;
        if output.success() {
            return Ok(());
        }

        warn!(tag = %tag, stderr = %output.stderr.trim(), "checkout failed");
        let recent_tags = self
            .recent_release_tags(RECENT_TAG_LIMIT)
            .await
            .unwrap_or_default();
        Err(ForgeError::TagNotFound { tag, recent_tags })
    }

    /// Run the upstream prerequisite download script.
    pub async fn download_prerequisites(&self) -> Result<()> {
        info!("downloading prerequisites");
        let cmd = ToolCommand::new("./contrib/download_prerequisites", &self.path);
        self.run_checked(&cmd, Phase::Prerequisites).await?;
        Ok(())
    }

    fn git(&self) -> ToolCommand {
        ToolCommand::new("git", &self.path)
    }

    /// Directory to run `git clone` in, and the destination relative to it.
    fn clone_target(&self) -> (PathBuf, String) {
        match (self.path.parent(), self.path.file_name()) {
            (Some(parent), Some(name)) => {
                let parent = if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                };
                (parent, name.to_string_lossy().to_string())
            }
            _ => (PathBuf::from("."), self.path.to_string_lossy().to_string()),
        }
    }

    async fn run_checked(&self, command: &ToolCommand, phase: Phase) -> Result<ToolOutput> {
        let output = self.runner.run(command).await?;
        if !output.success() {
            return Err(ForgeError::ExternalToolFailure {
                phase,
                exit_code: output.exit_code,
            });
        }
        Ok(output)
    }
}
