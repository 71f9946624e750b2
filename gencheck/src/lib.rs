//! # Gencheck
//!
//! End-to-end build verification for a code-generation tool.
//!
//! A run checks that the tool binary exists and reports the version the
//! package manifest declares, installs dependencies in every example
//! project concurrently, builds each project in order, and optionally
//! verifies that regenerated files match source control:
//!
//! - **Stage-based execution**: version check, install, build, diff check
//! - **Fail fast**: the first failing stage ends the run with a clear message
//! - **Pluggable processes**: every command goes through a [`command::CommandRunner`]
//! - **Event-driven observability**: state changes are sent to an [`events::EventSink`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gencheck::prelude::*;
//! use std::sync::Arc;
//!
//! let config = VerifyConfig::for_repo(".");
//! let report = Orchestrator::new(config, Arc::new(ProcessRunner::default()))
//!     .run()
//!     .await;
//! std::process::exit(report.exit_code());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod command;
pub mod console;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod pipeline;
pub mod stages;
pub mod testing;
pub mod tool;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::command::{CommandResult, CommandRunner, CommandSpec, ProcessRunner, ShellPolicy};
    pub use crate::config::{DiffConfig, PackageManagerConfig, ToolConfig, VerifyConfig};
    pub use crate::core::{Platform, RunState, StageKind, StageStatus, TargetProject};
    pub use crate::errors::{ErrorInfo, GencheckError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{Orchestrator, RunReport, StageRecord};
    pub use crate::stages::{Stage, StageContext, StageFailure, StageOutcome};
    pub use crate::tool::{PackageManifest, ToolLocator};
}
