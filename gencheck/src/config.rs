//! Run configuration.
//!
//! Every field has a default reproducing the conventional repository
//! layout, so an empty JSON object (or no file at all) is a valid
//! configuration. Relative paths are resolved against the repository root.

use crate::core::TargetProject;
use crate::errors::GencheckError;
use crate::tool::ToolLocator;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Repository root every relative path is resolved against.
    #[serde(skip)]
    pub repo_root: PathBuf,
    /// Target project directories, in build order.
    #[serde(default = "default_targets")]
    pub targets: Vec<PathBuf>,
    /// Package manifest declaring the expected tool version.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// Code-generation tool settings.
    #[serde(default)]
    pub tool: ToolConfig,
    /// Package manager settings.
    #[serde(default)]
    pub package_manager: PackageManagerConfig,
    /// Drift check settings.
    #[serde(default)]
    pub diff: DiffConfig,
}

fn default_targets() -> Vec<PathBuf> {
    [
        "reason-react-example",
        "typescript-react-example",
        "untyped-react-example",
    ]
    .iter()
    .map(|name| Path::new("examples").join(name))
    .collect()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

impl VerifyConfig {
    /// Creates the default configuration for a repository.
    #[must_use]
    pub fn for_repo(root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: root.into(),
            targets: default_targets(),
            manifest: default_manifest(),
            tool: ToolConfig::default(),
            package_manager: PackageManagerConfig::default(),
            diff: DiffConfig::default(),
        }
    }

    /// Parses a JSON configuration for a repository.
    pub fn from_json(root: impl Into<PathBuf>, text: &str) -> Result<Self, GencheckError> {
        let mut config: Self = serde_json::from_str(text)
            .map_err(|e| GencheckError::Config(format!("invalid configuration: {e}")))?;
        config.repo_root = root.into();
        Ok(config)
    }

    /// Loads the configuration file at `path`, or the defaults when `path`
    /// is `None`.
    pub fn load(root: impl Into<PathBuf>, path: Option<&Path>) -> Result<Self, GencheckError> {
        let root = root.into();
        let Some(path) = path else {
            return Ok(Self::for_repo(root));
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            GencheckError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(root, &text)
    }

    /// Enables or disables the drift check.
    #[must_use]
    pub fn with_diff_check(mut self, enabled: bool) -> Self {
        self.diff.enabled = enabled;
        self
    }

    /// Replaces the target list.
    #[must_use]
    pub fn with_targets<I, P>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), GencheckError> {
        if self.package_manager.program.trim().is_empty() {
            return Err(GencheckError::Config("package manager program is empty".to_string()));
        }
        if self.tool.file_stem.trim().is_empty() {
            return Err(GencheckError::Config("tool file name is empty".to_string()));
        }
        if self.diff.enabled && self.diff.patterns.is_empty() {
            return Err(GencheckError::Config(
                "diff check is enabled but no patterns are configured".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for target in &self.targets {
            if !seen.insert(target) {
                return Err(GencheckError::Config(format!(
                    "target {} is listed twice",
                    target.display()
                )));
            }
        }
        Ok(())
    }

    /// Resolves a path against the repository root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.repo_root.join(path)
        }
    }

    /// Returns the target projects with absolute paths, in build order.
    #[must_use]
    pub fn target_projects(&self) -> Vec<TargetProject> {
        self.targets
            .iter()
            .map(|path| TargetProject::new(self.resolve(path)))
            .collect()
    }

    /// Returns the absolute manifest path.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    /// Returns the tool locator.
    #[must_use]
    pub fn tool_locator(&self) -> ToolLocator {
        ToolLocator::new(self.resolve(&self.tool.dir), self.tool.file_stem.clone())
    }
}

/// Code-generation tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Directory holding the built binary.
    #[serde(default = "default_tool_dir")]
    pub dir: PathBuf,
    /// Binary file name without the platform suffix.
    #[serde(default = "default_tool_stem")]
    pub file_stem: String,
    /// Argument that makes the tool print its version.
    #[serde(default = "default_version_flag")]
    pub version_flag: String,
    /// Command that builds the binary, shown when it is missing.
    #[serde(default = "default_build_hint")]
    pub build_hint: String,
    /// Command that synchronises version numbers, shown on mismatch.
    #[serde(default = "default_version_sync_hint")]
    pub version_sync_hint: String,
}

fn default_tool_dir() -> PathBuf {
    ["lib", "bs", "native"].iter().collect()
}

fn default_tool_stem() -> String {
    "gentype.native".to_string()
}

fn default_version_flag() -> String {
    "--version".to_string()
}

fn default_build_hint() -> String {
    "npm run build".to_string()
}

fn default_version_sync_hint() -> String {
    "node scripts/bump_version_module.js".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            dir: default_tool_dir(),
            file_stem: default_tool_stem(),
            version_flag: default_version_flag(),
            build_hint: default_build_hint(),
            version_sync_hint: default_version_sync_hint(),
        }
    }
}

/// Package manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManagerConfig {
    /// Package manager program.
    #[serde(default = "default_pm_program")]
    pub program: String,
    /// Arguments installing production dependencies without touching the
    /// lock file.
    #[serde(default = "default_install_args")]
    pub install_args: Vec<String>,
    /// Arguments running the build script.
    #[serde(default = "default_build_args")]
    pub build_args: Vec<String>,
}

fn default_pm_program() -> String {
    "npm".to_string()
}

fn default_install_args() -> Vec<String> {
    vec![
        "install".to_string(),
        "--production".to_string(),
        "--no-save".to_string(),
    ]
}

fn default_build_args() -> Vec<String> {
    vec!["run".to_string(), "build".to_string()]
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            program: default_pm_program(),
            install_args: default_install_args(),
            build_args: default_build_args(),
        }
    }
}

/// Drift check settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Whether the drift check runs. Off by default: comparing against
    /// source control has proven unreliable.
    #[serde(default)]
    pub enabled: bool,
    /// Source-control program.
    #[serde(default = "default_diff_program")]
    pub program: String,
    /// Arguments preceding the patterns.
    #[serde(default = "default_diff_args")]
    pub args: Vec<String>,
    /// Generated-file patterns, relative to the repository root.
    #[serde(default = "default_diff_patterns")]
    pub patterns: Vec<String>,
}

fn default_diff_program() -> String {
    "git".to_string()
}

fn default_diff_args() -> Vec<String> {
    ["diff-index", "--name-only", "HEAD", "--"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_diff_patterns() -> Vec<String> {
    ["*.js", "*.re", "*.bs.js", "*.re.js", "*.ts"]
        .iter()
        .map(|ext| format!("examples/{ext}"))
        .collect()
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            program: default_diff_program(),
            args: default_diff_args(),
            patterns: default_diff_patterns(),
        }
    }
}
