//! Run reports.

use crate::console;
use crate::core::{RunState, StageKind, StageStatus, TargetProject};
use crate::errors::ErrorInfo;
use crate::stages::StageFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use uuid::Uuid;

/// Record of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage kind.
    pub stage: StageKind,
    /// Final status.
    pub status: StageStatus,
    /// Duration in milliseconds.
    pub duration_ms: u64,
    /// Failing target, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetProject>,
    /// Error details, if failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl StageRecord {
    /// Records a passed stage.
    #[must_use]
    pub fn ok(stage: StageKind, duration_ms: u64) -> Self {
        Self {
            stage,
            status: StageStatus::Ok,
            duration_ms,
            target: None,
            error: None,
        }
    }

    /// Records a failed stage.
    #[must_use]
    pub fn failed(failure: &StageFailure, duration_ms: u64) -> Self {
        Self {
            stage: failure.stage,
            status: StageStatus::Fail,
            duration_ms,
            target: failure.target.clone(),
            error: Some(failure.error.info()),
        }
    }
}

/// Summary of a verification run.
#[derive(Debug)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: Option<DateTime<Utc>>,
    /// Every state entered, in order.
    pub transitions: Vec<RunState>,
    /// One record per executed stage.
    pub stages: Vec<StageRecord>,
    /// The failure that stopped the run.
    pub failure: Option<StageFailure>,
}

impl RunReport {
    /// Starts a report.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            transitions: Vec::new(),
            stages: Vec::new(),
            failure: None,
        }
    }

    /// Returns the last state entered.
    #[must_use]
    pub fn final_state(&self) -> RunState {
        self.transitions.last().copied().unwrap_or_default()
    }

    /// Returns true if the run finished successfully.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.final_state() == RunState::Succeeded
    }

    /// Process exit status: 0 on success, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.succeeded())
    }

    /// Returns the stages that ran, in order.
    #[must_use]
    pub fn executed_stages(&self) -> Vec<StageKind> {
        self.stages.iter().map(|record| record.stage).collect()
    }

    /// Human-readable summary.
    ///
    /// On failure this repeats the failing command's captured output before
    /// the banner, so it is visible even when interleaved with other logs.
    #[must_use]
    pub fn render(&self) -> String {
        let Some(failure) = &self.failure else {
            return "Test successful!".to_string();
        };

        let mut out = String::new();
        if let Some(result) = failure.error.command_result() {
            out.push_str(&result.combined_output());
        }
        let _ = writeln!(out, "Test failed unexpectedly: {failure}");
        if let Some(hint) = failure.error.fix_hint() {
            let _ = writeln!(out, "{hint}");
        }
        out.trim_end().to_string()
    }

    /// Writes the summary to stdout on success, stderr on failure.
    pub fn print(&self) {
        if self.failure.is_some() {
            console::error_line(self.render());
        } else {
            console::line(self.render());
        }
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id,
            "started_at": self.started_at,
            "finished_at": self.finished_at,
            "state": self.final_state(),
            "exit_code": self.exit_code(),
            "transitions": self.transitions,
            "stages": self.stages,
            "failure": self.failure.as_ref().map(|f| f.error.info().to_json()),
        })
    }
}
