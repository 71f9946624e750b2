//! Pipeline stages.
//!
//! Stages are the units of a verification run. Each produces exactly one
//! [`StageOutcome`]; a failure halts the run.

mod build;
mod diff;
mod install;
mod version;

pub use build::BuildStage;
pub use diff::DiffChecker;
pub use install::InstallStage;
pub use version::{strip_line_breaks, version_matches, VersionValidator};

use crate::command::CommandRunner;
use crate::config::VerifyConfig;
use crate::core::{Platform, StageKind, TargetProject};
use crate::errors::GencheckError;
use async_trait::async_trait;
use std::fmt::{self, Debug};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Trait for pipeline stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the kind of the stage.
    fn kind(&self) -> StageKind;

    /// Executes the stage.
    async fn execute(&self, ctx: &StageContext) -> StageOutcome;
}

/// Everything a stage needs: immutable configuration, the fixed target
/// list, the command runner and the host platform.
#[derive(Debug, Clone)]
pub struct StageContext {
    run_id: Uuid,
    config: Arc<VerifyConfig>,
    targets: Arc<[TargetProject]>,
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
}

impl StageContext {
    /// Creates a new stage context. The target list is resolved once here.
    #[must_use]
    pub fn new(config: Arc<VerifyConfig>, runner: Arc<dyn CommandRunner>, platform: Platform) -> Self {
        let targets = config.target_projects().into();
        Self {
            run_id: Uuid::new_v4(),
            config,
            targets,
            runner,
            platform,
        }
    }

    /// Returns the run ID.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Returns the repository root.
    #[must_use]
    pub fn repo_root(&self) -> &Path {
        &self.config.repo_root
    }

    /// Returns the target projects in build order.
    #[must_use]
    pub fn targets(&self) -> &[TargetProject] {
        &self.targets
    }

    /// Returns the command runner.
    #[must_use]
    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    /// Returns the host platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }
}

/// The result of one stage.
#[derive(Debug)]
pub enum StageOutcome {
    /// The stage passed.
    Success,
    /// The stage failed; the run stops here.
    Failure(StageFailure),
}

impl StageOutcome {
    /// Creates a failure not tied to a specific target.
    #[must_use]
    pub fn failed(stage: StageKind, error: GencheckError) -> Self {
        Self::Failure(StageFailure {
            stage,
            target: None,
            error,
        })
    }

    /// Creates a failure originating from one target.
    #[must_use]
    pub fn failed_on(stage: StageKind, target: TargetProject, error: GencheckError) -> Self {
        Self::Failure(StageFailure {
            stage,
            target: Some(target),
            error,
        })
    }

    /// Returns true if the stage passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            Self::Success => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

/// Why a stage failed.
#[derive(Debug)]
pub struct StageFailure {
    /// The failing stage.
    pub stage: StageKind,
    /// The target whose command failed, for per-target stages.
    pub target: Option<TargetProject>,
    /// The error.
    pub error: GencheckError,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} failed for {}: {}", self.stage, target, self.error),
            None => write!(f, "{} failed: {}", self.stage, self.error),
        }
    }
}
