//! Resolution of the platform-specific tool binary path.

use crate::core::Platform;
use std::fmt;
use std::path::{Path, PathBuf};

/// Computes where the tool binary is expected to be.
///
/// Pure path arithmetic; whether the file exists is checked by the
/// version stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocator {
    base_dir: PathBuf,
    file_stem: String,
}

impl ToolLocator {
    /// Creates a locator for `file_stem` inside `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, file_stem: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            file_stem: file_stem.into(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the executable file name for `platform`.
    #[must_use]
    pub fn file_name(&self, platform: Platform) -> String {
        format!("{}{}", self.file_stem, platform.executable_suffix())
    }

    /// Resolves the binary location for `platform`.
    #[must_use]
    pub fn locate(&self, platform: Platform) -> ToolBinaryLocation {
        ToolBinaryLocation {
            path: self.base_dir.join(self.file_name(platform)),
        }
    }
}

/// A resolved path to the platform-appropriate tool executable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolBinaryLocation {
    path: PathBuf,
}

impl ToolBinaryLocation {
    /// Returns the full path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the executable file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Returns the path relative to `root`, or the full path when it lies
    /// outside of it.
    #[must_use]
    pub fn relative_to(&self, root: &Path) -> PathBuf {
        self.path
            .strip_prefix(root)
            .map_or_else(|_| self.path.clone(), Path::to_path_buf)
    }
}

impl fmt::Display for ToolBinaryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
