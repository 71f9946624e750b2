//! Run orchestration.
//!
//! This module provides:
//! - The [`Orchestrator`] state machine sequencing the stages
//! - The [`RunReport`] summarising a finished run

mod orchestrator;
mod report;

pub use orchestrator::Orchestrator;
pub use report::{RunReport, StageRecord};
