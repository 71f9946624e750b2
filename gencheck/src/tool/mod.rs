//! The code-generation tool: where its binary lives and which version the
//! project declares.

mod locator;
mod manifest;

pub use locator::{ToolBinaryLocation, ToolLocator};
pub use manifest::PackageManifest;
