//! Results of finished commands.

use super::CommandSpec;
use crate::errors::GencheckError;
use serde::{Deserialize, Serialize};

/// Exit status and captured output of one finished process.
///
/// Produced once per runner invocation and never mutated. The exit status
/// alone decides success; output is for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl CommandResult {
    /// Creates a new result.
    #[must_use]
    pub fn new(
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration_ms,
        }
    }

    /// Returns true if the process exited with code zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Describes the exit status, e.g. `exit code 1`.
    #[must_use]
    pub fn status_label(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "termination by signal".to_string(),
        }
    }

    /// Stdout followed by stderr, skipping empty streams.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut out = String::new();
        for stream in [&self.stdout, &self.stderr] {
            if stream.is_empty() {
                continue;
            }
            out.push_str(stream);
            if !stream.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    /// Converts a non-zero exit into a runtime error for `spec`.
    pub fn into_checked(self, spec: &CommandSpec) -> Result<Self, GencheckError> {
        if self.success() {
            Ok(self)
        } else {
            Err(GencheckError::Runtime {
                command: spec.display(),
                cwd: spec.cwd.clone(),
                result: self,
            })
        }
    }
}
