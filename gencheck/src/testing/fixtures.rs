//! On-disk repository fixtures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use super::ScriptedRunner;
use crate::config::VerifyConfig;
use crate::core::Platform;
use crate::stages::StageContext;

/// A temporary repository with a manifest and a (fake) tool binary at the
/// default locations. Contexts built from it always use [`Platform::Unix`].
pub(crate) struct RepoFixture {
    dir: TempDir,
}

impl RepoFixture {
    pub(crate) fn new(version: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            dir.path().join("package.json"),
            serde_json::json!({ "name": "gentype", "version": version }).to_string(),
        )
        .expect("write manifest");

        let fixture = Self { dir };
        let tool = fixture.tool_path();
        std::fs::create_dir_all(tool.parent().expect("tool dir")).expect("create tool dir");
        std::fs::write(&tool, b"#!/bin/sh\n").expect("write tool");
        fixture
    }

    pub(crate) fn without_tool(self) -> Self {
        std::fs::remove_file(self.tool_path()).expect("remove tool");
        self
    }

    pub(crate) fn root(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn tool_path(&self) -> PathBuf {
        self.config().tool_locator().locate(Platform::Unix).path().to_path_buf()
    }

    pub(crate) fn config(&self) -> VerifyConfig {
        VerifyConfig::for_repo(self.root())
    }

    pub(crate) fn context(&self, runner: Arc<ScriptedRunner>) -> StageContext {
        self.context_with(self.config(), runner)
    }

    pub(crate) fn context_with(&self, config: VerifyConfig, runner: Arc<ScriptedRunner>) -> StageContext {
        StageContext::new(Arc::new(config), runner, Platform::Unix)
    }
}
