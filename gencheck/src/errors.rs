//! Error types for verification runs.
//!
//! Every error is fatal to the run. Each variant carries enough context
//! (command line, working directory, captured output, remediation hint)
//! for an operator to act on it without re-running.

use crate::command::CommandResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for gencheck operations.
#[derive(Debug, Error)]
pub enum GencheckError {
    /// The executable could not be found or started.
    #[error("`{command}` could not be started in {}: {source}", .cwd.display())]
    Launch {
        /// The command line that was attempted.
        command: String,
        /// The working directory of the attempt.
        cwd: PathBuf,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The process started but exited unsuccessfully.
    #[error("`{command}` exited with {} in {}", .result.status_label(), .cwd.display())]
    Runtime {
        /// The command line that was run.
        command: String,
        /// The working directory of the run.
        cwd: PathBuf,
        /// The result, including captured output.
        result: CommandResult,
    },

    /// A prerequisite binary is missing.
    #[error("{} does not exist. Use `{hint}` first!", .path.display())]
    Setup {
        /// The missing path, relative to the repository root when possible.
        path: PathBuf,
        /// The command that produces the missing binary.
        hint: String,
    },

    /// The tool reported a version that does not contain the declared one.
    #[error(
        "{tool} {flag} doesn't contain the version number of {manifest} \
         (\"{actual}\" should contain {expected}) - Run `{hint}` and rebuild to sync version numbers"
    )]
    VersionMismatch {
        /// The tool file name.
        tool: String,
        /// The argument that made the tool print its version.
        flag: String,
        /// The manifest file name.
        manifest: String,
        /// The tool output with line breaks stripped.
        actual: String,
        /// The version declared in the manifest.
        expected: String,
        /// The version synchronisation command.
        hint: String,
    },

    /// Querying the tool version failed.
    #[error("{tool} {flag} caused an unexpected error: {source}")]
    ToolInvocation {
        /// The tool file name.
        tool: String,
        /// The argument that made the tool print its version.
        flag: String,
        /// The command that rebuilds the tool binary.
        build_hint: String,
        /// The launch or runtime failure.
        #[source]
        source: Box<GencheckError>,
    },

    /// Generated files changed compared to source control.
    #[error("Changed files detected: {}", .paths.join(", "))]
    DriftDetected {
        /// Raw output of the diff command.
        output: String,
        /// The changed paths, one per non-empty output line.
        paths: Vec<String>,
    },

    /// The package manifest could not be read.
    #[error("Invalid manifest {}: {message}", .path.display())]
    Manifest {
        /// The manifest path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The configuration is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GencheckError {
    /// Creates a drift error from raw diff output.
    #[must_use]
    pub fn drift(output: impl Into<String>) -> Self {
        let output = output.into();
        let paths = output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self::DriftDetected { output, paths }
    }

    /// Creates a manifest error.
    #[must_use]
    pub fn manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Launch { .. } => "GENCHECK-LAUNCH",
            Self::Runtime { .. } => "GENCHECK-RUNTIME",
            Self::Setup { .. } => "GENCHECK-SETUP",
            Self::VersionMismatch { .. } => "GENCHECK-VERSION",
            Self::ToolInvocation { .. } => "GENCHECK-TOOL",
            Self::DriftDetected { .. } => "GENCHECK-DRIFT",
            Self::Manifest { .. } => "GENCHECK-MANIFEST",
            Self::Config(_) => "GENCHECK-CONFIG",
            Self::Io(_) => "GENCHECK-IO",
        }
    }

    /// Returns the result of the failing command, if one ran to completion.
    #[must_use]
    pub fn command_result(&self) -> Option<&CommandResult> {
        match self {
            Self::Runtime { result, .. } => Some(result),
            Self::ToolInvocation { source, .. } => source.command_result(),
            _ => None,
        }
    }

    /// Returns an actionable hint for the operator.
    #[must_use]
    pub fn fix_hint(&self) -> Option<String> {
        match self {
            Self::Launch { command, .. } => Some(format!(
                "Make sure `{}` is installed and on PATH.",
                command.split_whitespace().next().unwrap_or(command)
            )),
            Self::Setup { hint, .. } => Some(format!("Run `{hint}` to build the tool binary.")),
            Self::VersionMismatch { hint, .. } => {
                Some(format!("Run `{hint}` and rebuild the tool binary."))
            }
            Self::DriftDetected { .. } => Some(
                "Make sure the generator is emitting the right code, regenerate, \
                 and commit the changed files."
                    .to_string(),
            ),
            Self::ToolInvocation {
                tool,
                build_hint,
                source,
                ..
            } => match source.as_ref() {
                Self::Launch { .. } => Some(format!(
                    "Check that {tool} is executable on this platform, or rebuild it with `{build_hint}`."
                )),
                other => other.fix_hint(),
            },
            Self::Runtime { .. } | Self::Manifest { .. } | Self::Config(_) | Self::Io(_) => None,
        }
    }

    /// Builds the structured error info used in reports.
    #[must_use]
    pub fn info(&self) -> ErrorInfo {
        let mut info = ErrorInfo::new(self.code(), self.to_string());
        if let Some(hint) = self.fix_hint() {
            info = info.with_fix_hint(hint);
        }
        match self {
            Self::Launch { command, cwd, .. } | Self::Runtime { command, cwd, .. } => {
                info = info
                    .with_context_entry("command", command.clone())
                    .with_context_entry("cwd", cwd.display().to_string());
            }
            Self::Setup { path, .. } | Self::Manifest { path, .. } => {
                info = info.with_context_entry("path", path.display().to_string());
            }
            Self::VersionMismatch {
                actual, expected, ..
            } => {
                info = info
                    .with_context_entry("actual", actual.clone())
                    .with_context_entry("expected", expected.clone());
            }
            Self::DriftDetected { paths, .. } => {
                info = info.with_context_entry("paths", paths.join("\n"));
            }
            Self::ToolInvocation { .. } | Self::Config(_) | Self::Io(_) => {}
        }
        if let Some(result) = self.command_result() {
            info = info.with_context_entry("exit_status", result.status_label());
        }
        info
    }
}

/// Structured description of an error for reports and events.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Error code (e.g., "GENCHECK-SETUP").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ErrorInfo {
    /// Creates a new error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("code".to_string(), serde_json::Value::String(self.code.clone()));
        map.insert("summary".to_string(), serde_json::Value::String(self.summary.clone()));

        if let Some(ref hint) = self.fix_hint {
            map.insert("fix_hint".to_string(), serde_json::Value::String(hint.clone()));
        }
        if !self.context.is_empty() {
            let context_map: serde_json::Map<String, serde_json::Value> = self
                .context
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            map.insert("context".to_string(), serde_json::Value::Object(context_map));
        }

        serde_json::Value::Object(map)
    }
}
