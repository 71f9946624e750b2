//! The run state machine.

use super::{RunReport, StageRecord};
use crate::command::CommandRunner;
use crate::config::VerifyConfig;
use crate::core::{Platform, RunState};
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::{
    BuildStage, DiffChecker, InstallStage, Stage, StageContext, StageOutcome, VersionValidator,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Drives a verification run through its stages.
///
/// Stages run in a fixed order: version check, install, build and, when
/// enabled, the diff check. The first failing stage ends the run; the
/// report is always produced.
#[derive(Debug)]
pub struct Orchestrator {
    config: Arc<VerifyConfig>,
    runner: Arc<dyn CommandRunner>,
    sink: Arc<dyn EventSink>,
    platform: Platform,
    state: RwLock<RunState>,
}

impl Orchestrator {
    /// Creates an orchestrator for the host platform.
    #[must_use]
    pub fn new(config: VerifyConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config: Arc::new(config),
            runner,
            sink: Arc::new(NoOpEventSink),
            platform: Platform::current(),
            state: RwLock::new(RunState::Idle),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Overrides the platform used for tool lookup.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state.read()
    }

    /// Returns the stages of a run, in execution order.
    #[must_use]
    pub fn stages(&self) -> Vec<Box<dyn Stage>> {
        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(VersionValidator::new()),
            Box::new(InstallStage::new()),
            Box::new(BuildStage::new()),
        ];
        if self.config.diff.enabled {
            stages.push(Box::new(DiffChecker::new()));
        }
        stages
    }

    fn transition(&self, report: &mut RunReport, next: RunState) {
        let previous = std::mem::replace(&mut *self.state.write(), next);
        debug!(from = %previous, to = %next, "State transition");
        report.transitions.push(next);
    }

    /// Executes the run and returns its report.
    pub async fn run(&self) -> RunReport {
        let ctx = StageContext::new(self.config.clone(), self.runner.clone(), self.platform);
        let mut report = RunReport::new(ctx.run_id());

        info!(run_id = %ctx.run_id(), targets = ctx.targets().len(), "Verification run started");
        self.sink
            .emit(
                "run.started",
                Some(serde_json::json!({
                    "run_id": ctx.run_id(),
                    "targets": ctx.targets(),
                    "diff_check": self.config.diff.enabled,
                })),
            )
            .await;

        if !self.config.diff.enabled {
            debug!("Diff check disabled; it will not run");
        }

        for stage in self.stages() {
            let kind = stage.kind();
            self.transition(&mut report, kind.run_state());
            self.sink
                .emit("stage.started", Some(serde_json::json!({ "stage": kind })))
                .await;

            let start = Instant::now();
            let outcome = stage.execute(&ctx).await;
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match outcome {
                StageOutcome::Success => {
                    info!(stage = %kind, duration_ms, "Stage completed");
                    report.stages.push(StageRecord::ok(kind, duration_ms));
                    self.sink
                        .emit(
                            "stage.completed",
                            Some(serde_json::json!({ "stage": kind, "duration_ms": duration_ms })),
                        )
                        .await;
                }
                StageOutcome::Failure(failure) => {
                    error!(stage = %kind, error = %failure.error, "Stage failed");
                    debug!(error = ?failure.error, "Stage failure details");
                    let record = StageRecord::failed(&failure, duration_ms);
                    self.sink
                        .emit(
                            "stage.failed",
                            Some(serde_json::json!({
                                "stage": kind,
                                "duration_ms": duration_ms,
                                "error": record.error.as_ref().map(crate::errors::ErrorInfo::to_json),
                            })),
                        )
                        .await;
                    report.stages.push(record);
                    report.failure = Some(failure);
                    break;
                }
            }
        }

        self.transition(&mut report, RunState::Reporting);
        report.finished_at = Some(Utc::now());
        report.print();

        let terminal = if report.failure.is_some() {
            RunState::Failed
        } else {
            RunState::Succeeded
        };
        self.transition(&mut report, terminal);

        info!(run_id = %report.run_id, state = %terminal, "Verification run finished");
        self.sink
            .emit(
                "run.completed",
                Some(serde_json::json!({
                    "run_id": report.run_id,
                    "state": terminal,
                    "exit_code": report.exit_code(),
                })),
            )
            .await;

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StageKind;
    use crate::testing::ScriptedRunner;

    #[test]
    fn test_stage_order_without_diff() {
        let orchestrator = Orchestrator::new(
            VerifyConfig::for_repo("/repo"),
            Arc::new(ScriptedRunner::new()),
        );
        let kinds: Vec<StageKind> = orchestrator.stages().iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![StageKind::VersionCheck, StageKind::Install, StageKind::Build]
        );
        assert_eq!(orchestrator.state(), RunState::Idle);
    }

    #[test]
    fn test_stage_order_with_diff() {
        let orchestrator = Orchestrator::new(
            VerifyConfig::for_repo("/repo").with_diff_check(true),
            Arc::new(ScriptedRunner::new()),
        );
        let kinds: Vec<StageKind> = orchestrator.stages().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds.last(), Some(&StageKind::DiffCheck));
        assert_eq!(kinds.len(), 4);
    }
}
