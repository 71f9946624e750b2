//! Command specifications.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What kind of program a command launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// A real executable, launched directly on every platform.
    #[default]
    Binary,
    /// A package-manager entry point, which is a shell script on some
    /// platforms.
    Script,
}

/// How the child's output is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Forward output to our own stdout/stderr as it arrives, and capture it.
    #[default]
    Stream,
    /// Capture only.
    Capture,
}

/// An external command: program, arguments, working directory and
/// environment overrides on top of the inherited environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,
    /// Ordered arguments.
    pub args: Vec<String>,
    /// Working directory.
    pub cwd: PathBuf,
    /// Variables set on top of the inherited environment.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Program kind.
    #[serde(default)]
    pub kind: CommandKind,
    /// Output handling.
    #[serde(default)]
    pub output: OutputMode,
}

impl CommandSpec {
    /// Creates a streaming binary command.
    #[must_use]
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: BTreeMap::new(),
            kind: CommandKind::Binary,
            output: OutputMode::Stream,
        }
    }

    /// Creates a package-manager script command.
    #[must_use]
    pub fn script(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self::new(program, cwd).with_kind(CommandKind::Script)
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets an environment override.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Sets the program kind.
    #[must_use]
    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    /// Captures output instead of streaming it.
    #[must_use]
    pub fn captured(mut self) -> Self {
        self.output = OutputMode::Capture;
        self
    }

    /// Returns the working directory.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Returns true when output is forwarded live.
    #[must_use]
    pub fn is_streamed(&self) -> bool {
        self.output == OutputMode::Stream
    }

    /// Human-readable command line, e.g. `npm run build`.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_display() {
        let spec = CommandSpec::script("npm", "/repo/examples/a")
            .args(["install", "--production", "--no-save"])
            .env("CI", "1");

        assert_eq!(spec.display(), "npm install --production --no-save");
        assert_eq!(spec.kind, CommandKind::Script);
        assert!(spec.is_streamed());
        assert_eq!(spec.env.get("CI"), Some(&"1".to_string()));
        assert_eq!(spec.cwd(), Path::new("/repo/examples/a"));
    }

    #[test]
    fn test_captured_binary() {
        let spec = CommandSpec::new("/repo/lib/bs/native/gentype.native", "/repo")
            .arg("--version")
            .captured();

        assert_eq!(spec.kind, CommandKind::Binary);
        assert_eq!(spec.output, OutputMode::Capture);
        assert!(!spec.is_streamed());
    }
}
