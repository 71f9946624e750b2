//! Core types shared by every stage: host platform, target projects and
//! stage/run status enums.

mod platform;
mod status;
mod target;

pub use platform::Platform;
pub use status::{RunState, StageKind, StageStatus};
pub use target::TargetProject;
