//! Testing utilities.
//!
//! [`ScriptedRunner`] stands in for real processes: it records every
//! command, answers with scripted responses, and tracks how many commands
//! were in flight at once.

mod mocks;

#[cfg(test)]
pub(crate) mod fixtures;

pub use mocks::{ScriptedResponse, ScriptedRunner};
