//! Concurrent dependency install across all targets.

use super::{Stage, StageContext, StageOutcome};
use crate::command::CommandSpec;
use crate::console;
use crate::core::StageKind;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{error, info};

/// Installs production dependencies in every target at once.
///
/// One process per target is launched up front and all of them run to
/// completion; there is no cancellation of siblings. The stage passes only
/// if every install passes. When several fail, the first failing target in
/// list order becomes the stage failure and the rest are logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallStage;

impl InstallStage {
    /// Creates a new install stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for InstallStage {
    fn kind(&self) -> StageKind {
        StageKind::Install
    }

    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        let pm = &ctx.config().package_manager;
        let runner = ctx.runner();

        let installs = ctx.targets().iter().map(|target| {
            let spec = CommandSpec::script(pm.program.clone(), target.path())
                .args(pm.install_args.iter().cloned());
            console::line(format_args!("{target}: {} (takes a while)", spec.display()));
            async move { (target, runner.run(&spec).await) }
        });
        let results = join_all(installs).await;

        let mut failures = results
            .into_iter()
            .filter_map(|(target, result)| result.err().map(|e| (target, e)));

        let Some((target, first)) = failures.next() else {
            info!(targets = ctx.targets().len(), "All installs succeeded");
            return StageOutcome::Success;
        };
        for (other, error) in failures {
            error!(target = %other, %error, "Install failed");
        }
        StageOutcome::failed_on(self.kind(), target.clone(), first)
    }
}
