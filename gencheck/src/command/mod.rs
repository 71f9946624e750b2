//! External command execution.
//!
//! This module provides:
//! - Immutable command descriptions ([`CommandSpec`])
//! - Results of finished commands ([`CommandResult`])
//! - The platform shell strategy ([`ShellPolicy`])
//! - The [`CommandRunner`] seam and its process-backed implementation

mod result;
mod runner;
mod shell;
mod spec;

pub use result::CommandResult;
pub use runner::{CommandRunner, ProcessRunner};
pub use shell::ShellPolicy;
pub use spec::{CommandKind, CommandSpec, OutputMode};
