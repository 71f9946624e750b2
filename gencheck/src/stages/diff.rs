//! Drift detection against source control.

use super::{Stage, StageContext, StageOutcome};
use crate::command::CommandSpec;
use crate::console;
use crate::core::StageKind;
use crate::errors::GencheckError;
use async_trait::async_trait;

/// Lists tracked generated files that differ from `HEAD`.
///
/// Read-only: the diff command is run with captured output and any listed
/// path is a regression. Whitespace-only output counts as no change.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffChecker;

impl DiffChecker {
    /// Creates a new diff checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the diff command for `ctx`.
    #[must_use]
    pub fn command(ctx: &StageContext) -> CommandSpec {
        let diff = &ctx.config().diff;
        CommandSpec::new(diff.program.clone(), ctx.repo_root())
            .args(diff.args.iter().cloned())
            .args(diff.patterns.iter().cloned())
            .captured()
    }

    /// Runs the diff command, echoes its output and fails on any listed path.
    pub async fn check(&self, ctx: &StageContext) -> Result<(), GencheckError> {
        console::line(format_args!("Checking for changes in {}", ctx.repo_root().display()));

        let result = ctx.runner().run(&Self::command(ctx)).await?;
        console::block(&result.stdout);

        if result.stdout.trim().is_empty() {
            Ok(())
        } else {
            Err(GencheckError::drift(result.stdout))
        }
    }
}

#[async_trait]
impl Stage for DiffChecker {
    fn kind(&self) -> StageKind {
        StageKind::DiffCheck
    }

    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        match self.check(ctx).await {
            Ok(()) => StageOutcome::Success,
            Err(error) => StageOutcome::failed(self.kind(), error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::RepoFixture;
    use crate::testing::{ScriptedResponse, ScriptedRunner};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_output_is_success() {
        let fixture = RepoFixture::new("1.0.0");
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = fixture.context(runner.clone());

        assert!(DiffChecker::new().execute(&ctx).await.is_success());

        let call = &runner.calls()[0];
        assert_eq!(
            call.display(),
            "git diff-index --name-only HEAD -- examples/*.js examples/*.re \
             examples/*.bs.js examples/*.re.js examples/*.ts"
        );
        assert_eq!(call.cwd, fixture.root());
        assert!(!call.is_streamed());
    }

    #[tokio::test]
    async fn test_changed_file_is_drift() {
        let fixture = RepoFixture::new("1.0.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(|_| true, ScriptedResponse::success("examples/foo.bs.js\n"));
        let ctx = fixture.context(runner);

        let err = DiffChecker::new().check(&ctx).await.unwrap_err();
        match err {
            GencheckError::DriftDetected { output, paths } => {
                assert_eq!(output, "examples/foo.bs.js\n");
                assert_eq!(paths, vec!["examples/foo.bs.js"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_whitespace_output_is_success() {
        let fixture = RepoFixture::new("1.0.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(|_| true, ScriptedResponse::success("\n"));

        assert!(DiffChecker::new().execute(&fixture.context(runner)).await.is_success());
    }

    #[tokio::test]
    async fn test_diff_command_failure_is_fatal() {
        let fixture = RepoFixture::new("1.0.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(|_| true, ScriptedResponse::exit(128, "", "fatal: not a git repository\n"));

        let outcome = DiffChecker::new().execute(&fixture.context(runner)).await;
        let failure = outcome.failure().unwrap();
        assert_eq!(failure.stage, StageKind::DiffCheck);
        assert!(matches!(failure.error, GencheckError::Runtime { .. }));
    }
}
