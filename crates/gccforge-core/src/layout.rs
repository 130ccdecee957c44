//! On-disk layout: checkout, build directory and install prefixes are
//! siblings under one root.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::version::ReleaseVersion;

pub const SOURCE_DIR_NAME: &str = "gcc";
pub const BUILD_DIR_NAME: &str = "gcc-build";

/// Paths used by a run, all derived from the root directory.
///
/// The root is absolute: child processes run in different directories and
/// configure only accepts an absolute `--prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Resolve `root` against the current directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Upstream checkout, persisted across runs.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(SOURCE_DIR_NAME)
    }

    /// Out-of-tree build directory, recreated on every run.
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR_NAME)
    }

    /// Install prefix for one version, e.g. `<root>/gcc-13.2.0`.
    pub fn install_prefix(&self, version: &ReleaseVersion) -> PathBuf {
        self.root.join(format!("gcc-{version}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths_are_siblings() {
        let layout = Layout::new("/opt/toolchains").unwrap();
        let v = ReleaseVersion::new(13, 2, 0);
        assert_eq!(layout.source_dir(), PathBuf::from("/opt/toolchains/gcc"));
        assert_eq!(layout.build_dir(), PathBuf::from("/opt/toolchains/gcc-build"));
        assert_eq!(layout.install_prefix(&v), PathBuf::from("/opt/toolchains/gcc-13.2.0"));
    }

    #[test]
    fn test_relative_root_is_made_absolute() {
        let cwd = std::env::current_dir().unwrap();

        let layout = Layout::new(".").unwrap();
        assert!(layout.root().is_absolute());
        assert_eq!(layout.root(), cwd.as_path());

        let layout = Layout::new("toolchains").unwrap();
        assert_eq!(layout.source_dir(), cwd.join("toolchains/gcc"));
        assert!(layout.install_prefix(&ReleaseVersion::new(13, 2, 0)).is_absolute());
    }
}
