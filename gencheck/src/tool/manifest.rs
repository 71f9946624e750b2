//! Package manifest reading.

use crate::errors::GencheckError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The fields of a JSON package manifest the run cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Package name.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared semantic version.
    pub version: String,
}

impl PackageManifest {
    /// Parses a manifest from JSON text.
    pub fn parse(path: &Path, text: &str) -> Result<Self, GencheckError> {
        let manifest: Self = serde_json::from_str(text)
            .map_err(|e| GencheckError::manifest(path, e.to_string()))?;
        if manifest.version.trim().is_empty() {
            return Err(GencheckError::manifest(path, "version is empty"));
        }
        Ok(manifest)
    }

    /// Reads and parses the manifest at `path`.
    pub async fn load(path: &Path) -> Result<Self, GencheckError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GencheckError::manifest(path, e.to_string()))?;
        Self::parse(path, &text)
    }
}
