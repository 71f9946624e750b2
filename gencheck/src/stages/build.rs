//! Sequential build across all targets.

use super::{Stage, StageContext, StageOutcome};
use crate::command::CommandSpec;
use crate::console;
use crate::core::StageKind;
use async_trait::async_trait;
use tracing::info;

/// Builds targets one at a time, in list order.
///
/// Builds are resource heavy and their logs must stay readable, so the
/// next build starts only after the previous process has exited. The
/// first failure aborts the stage; remaining targets are never started.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStage;

impl BuildStage {
    /// Creates a new build stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for BuildStage {
    fn kind(&self) -> StageKind {
        StageKind::Build
    }

    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        let pm = &ctx.config().package_manager;

        for target in ctx.targets() {
            let spec = CommandSpec::script(pm.program.clone(), target.path())
                .args(pm.build_args.iter().cloned());
            console::line(format_args!("{target}: {} (takes a while)", spec.display()));

            if let Err(error) = ctx.runner().run(&spec).await {
                return StageOutcome::failed_on(self.kind(), target.clone(), error);
            }
            info!(target = %target, "Build succeeded");
        }
        StageOutcome::Success
    }
}
