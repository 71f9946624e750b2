//! Stage kinds, stage status and orchestrator states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The discrete phases of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Tool binary existence and version check.
    VersionCheck,
    /// Concurrent dependency install across all targets.
    Install,
    /// Sequential build across all targets.
    Build,
    /// Source-control drift check on generated files.
    DiffCheck,
}

impl StageKind {
    /// The orchestrator state entered while this stage runs.
    #[must_use]
    pub fn run_state(self) -> RunState {
        match self {
            Self::VersionCheck => RunState::ValidatingSetup,
            Self::Install => RunState::Installing,
            Self::Build => RunState::Building,
            Self::DiffCheck => RunState::CheckingDiff,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionCheck => write!(f, "version_check"),
            Self::Install => write!(f, "install"),
            Self::Build => write!(f, "build"),
            Self::DiffCheck => write!(f, "diff_check"),
        }
    }
}

/// The outcome status of a single stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Stage completed successfully.
    Ok,
    /// Stage failed.
    Fail,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// States of the orchestrator.
///
/// `Idle -> ValidatingSetup -> Installing -> Building -> [CheckingDiff]
/// -> Reporting -> Succeeded | Failed`. A failing stage jumps straight
/// to `Reporting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Not started.
    #[default]
    Idle,
    /// Checking the tool binary and its version.
    ValidatingSetup,
    /// Installing dependencies.
    Installing,
    /// Building targets.
    Building,
    /// Comparing generated files against source control.
    CheckingDiff,
    /// Producing the summary.
    Reporting,
    /// Finished, all stages passed.
    Succeeded,
    /// Finished, a stage failed.
    Failed,
}

impl RunState {
    /// Returns true if the state is final.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::ValidatingSetup => "validating_setup",
            Self::Installing => "installing",
            Self::Building => "building",
            Self::CheckingDiff => "checking_diff",
            Self::Reporting => "reporting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_kind_run_state() {
        assert_eq!(StageKind::VersionCheck.run_state(), RunState::ValidatingSetup);
        assert_eq!(StageKind::Install.run_state(), RunState::Installing);
        assert_eq!(StageKind::Build.run_state(), RunState::Building);
        assert_eq!(StageKind::DiffCheck.run_state(), RunState::CheckingDiff);
    }

    #[test]
    fn test_run_state_is_terminal() {
        assert!(RunState::Succeeded.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(!RunState::Reporting.is_terminal());
        assert!(!RunState::Idle.is_terminal());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&StageKind::DiffCheck).unwrap();
        assert_eq!(json, r#""diff_check""#);
        let json = serde_json::to_string(&RunState::ValidatingSetup).unwrap();
        assert_eq!(json, r#""validating_setup""#);
    }
}
