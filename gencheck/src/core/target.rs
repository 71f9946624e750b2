//! Target projects rebuilt during a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One example project rebuilt to verify generated-output stability.
///
/// Identity is the absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetProject {
    path: PathBuf,
}

impl TargetProject {
    /// Creates a target from a directory path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the project directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last path component, or the full path if there is none.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl fmt::Display for TargetProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl AsRef<Path> for TargetProject {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_name() {
        let target = TargetProject::new("/repo/examples/reason-react-example");
        assert_eq!(target.name(), "reason-react-example");
        assert_eq!(target.to_string(), "/repo/examples/reason-react-example");
    }

    #[test]
    fn test_target_serializes_as_path() {
        let target = TargetProject::new("/repo/examples/a");
        let json = serde_json::to_string(&target).unwrap();
        assert_eq!(json, r#""/repo/examples/a""#);
    }
}
