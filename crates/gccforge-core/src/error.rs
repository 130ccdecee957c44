//! Error taxonomy for gccforge.

use std::path::PathBuf;

use crate::build::Phase;

/// gccforge errors.
///
/// A failing test suite is deliberately absent: it is recorded in the
/// [`RunReport`](crate::report::RunReport) as a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("invalid version format {input:?}: expected MAJOR.MINOR.PATCH, e.g. 14.1.0")]
    InvalidVersionFormat { input: String },

    #[error("no release tag matching {pattern} found")]
    NoReleaseTagFound { pattern: String },

    #[error("tag {tag} not found; recent releases: {}", list_tags(.recent_tags))]
    TagNotFound {
        tag: String,
        recent_tags: Vec<String>,
    },

    #[error("{phase} failed with exit code {}", exit_status(.exit_code))]
    ExternalToolFailure { phase: Phase, exit_code: Option<i32> },

    #[error("{} exists but is not a git checkout", .path.display())]
    NotARepository { path: PathBuf },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ForgeError {
    /// The phase this error aborted, if it came from an external tool.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            ForgeError::ExternalToolFailure { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

fn list_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "<none>".to_string()
    } else {
        tags.join(", ")
    }
}

fn exit_status(code: &Option<i32>) -> String {
    code.map_or_else(|| "<signal>".to_string(), |c| c.to_string())
}

/// Result type for gccforge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_version_display() {
        let err = ForgeError::InvalidVersionFormat {
            input: "14.1".to_string(),
        };
        assert!(err.to_string().contains("\"14.1\""));
        assert!(err.to_string().contains("MAJOR.MINOR.PATCH"));
    }

    #[test]
    fn test_tag_not_found_lists_recent_tags() {
        let err = ForgeError::TagNotFound {
            tag: "releases/gcc-99.0.0".to_string(),
            recent_tags: vec![
                "releases/gcc-13.2.0".to_string(),
                "releases/gcc-13.1.0".to_string(),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("releases/gcc-99.0.0"));
        assert!(msg.contains("releases/gcc-13.2.0, releases/gcc-13.1.0"));

        let err = ForgeError::TagNotFound {
            tag: "releases/gcc-1.0.0".to_string(),
            recent_tags: vec![],
        };
        assert!(err.to_string().contains("<none>"));
    }

    #[test]
    fn test_external_tool_failure_names_phase() {
        let err = ForgeError::ExternalToolFailure {
            phase: Phase::Build,
            exit_code: Some(2),
        };
        assert_eq!(err.to_string(), "build failed with exit code 2");
        assert_eq!(err.phase(), Some(Phase::Build));

        let err = ForgeError::ExternalToolFailure {
            phase: Phase::Install,
            exit_code: None,
        };
        assert!(err.to_string().contains("<signal>"));
    }
}
