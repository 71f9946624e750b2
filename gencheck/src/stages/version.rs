//! Tool binary existence and version verification.

use super::{Stage, StageContext, StageOutcome};
use crate::command::CommandSpec;
use crate::console;
use crate::core::StageKind;
use crate::errors::GencheckError;
use crate::tool::PackageManifest;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r]+").expect("line break pattern is valid"));

/// Removes every newline and carriage return.
#[must_use]
pub fn strip_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text, "").into_owned()
}

/// True when `output`, with line breaks removed, contains `expected`.
#[must_use]
pub fn version_matches(output: &str, expected: &str) -> bool {
    strip_line_breaks(output).contains(expected)
}

fn manifest_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Verifies the tool binary exists and reports the declared version.
///
/// Both checks run before any project work; either can abort the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionValidator;

impl VersionValidator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the existence check, then the version check.
    pub async fn validate(&self, ctx: &StageContext) -> Result<(), GencheckError> {
        let config = ctx.config();
        let location = config.tool_locator().locate(ctx.platform());

        console::line(format_args!("Check existing binary: {location}"));
        if !tokio::fs::try_exists(location.path()).await.unwrap_or(false) {
            return Err(GencheckError::Setup {
                path: location.relative_to(ctx.repo_root()),
                hint: config.tool.build_hint.clone(),
            });
        }

        let manifest = PackageManifest::load(&config.manifest_path()).await?;

        console::line(format_args!(
            "Checking if {} outputs the right version",
            config.tool.version_flag
        ));
        let spec = CommandSpec::new(location.path().display().to_string(), ctx.repo_root())
            .arg(config.tool.version_flag.clone())
            .captured();
        let result = ctx
            .runner()
            .run(&spec)
            .await
            .map_err(|source| GencheckError::ToolInvocation {
                tool: location.file_name(),
                flag: config.tool.version_flag.clone(),
                build_hint: config.tool.build_hint.clone(),
                source: Box::new(source),
            })?;

        debug!(output = %result.stdout.trim_end(), expected = %manifest.version, "Tool version reported");
        if !version_matches(&result.stdout, &manifest.version) {
            return Err(GencheckError::VersionMismatch {
                tool: location.file_name(),
                flag: config.tool.version_flag.clone(),
                manifest: manifest_name(&config.manifest),
                actual: strip_line_breaks(&result.stdout),
                expected: manifest.version,
                hint: config.tool.version_sync_hint.clone(),
            });
        }

        info!(tool = %location, version = %manifest.version, "Tool version verified");
        Ok(())
    }
}

#[async_trait]
impl Stage for VersionValidator {
    fn kind(&self) -> StageKind {
        StageKind::VersionCheck
    }

    async fn execute(&self, ctx: &StageContext) -> StageOutcome {
        match self.validate(ctx).await {
            Ok(()) => StageOutcome::Success,
            Err(error) => StageOutcome::failed(self.kind(), error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::RepoFixture;
    use crate::testing::{ScriptedResponse, ScriptedRunner};
    use std::path::PathBuf;
    use std::sync::Arc;

    #[test]
    fn test_version_matches_examples() {
        assert!(version_matches("4.2.0\n", "4.2.0"));
        assert!(version_matches("4.2.0\r\n", "4.2.0"));
        assert!(version_matches("v4.2.0", "4.2.0"));
        assert!(!version_matches("4.1.9", "4.2.0"));
    }

    #[test]
    fn test_line_breaks_removed_inside_output() {
        assert_eq!(strip_line_breaks("4.2\r\n.0\n"), "4.2.0");
        assert!(version_matches("4.2\n.0", "4.2.0"));
    }

    fn context(fixture: &RepoFixture, runner: &Arc<ScriptedRunner>) -> StageContext {
        fixture.context(runner.clone())
    }

    #[tokio::test]
    async fn test_missing_binary_is_setup_error() {
        let fixture = RepoFixture::new("4.2.0").without_tool();
        let runner = Arc::new(ScriptedRunner::new());

        let err = VersionValidator::new()
            .validate(&context(&fixture, &runner))
            .await
            .unwrap_err();

        match err {
            GencheckError::Setup { path, hint } => {
                assert_eq!(path, PathBuf::from("lib/bs/native/gentype.native"));
                assert_eq!(hint, "npm run build");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_matching_version_passes() {
        let fixture = RepoFixture::new("4.2.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(
            |spec| spec.args == ["--version"],
            ScriptedResponse::success("4.2.0\n"),
        );

        let outcome = VersionValidator::new()
            .execute(&context(&fixture, &runner))
            .await;

        assert!(outcome.is_success());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, fixture.tool_path().display().to_string());
        assert!(!calls[0].is_streamed());
    }

    #[tokio::test]
    async fn test_mismatch_reports_both_versions() {
        let fixture = RepoFixture::new("4.2.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(|_| true, ScriptedResponse::success("4.1.9\n"));

        let err = VersionValidator::new()
            .validate(&context(&fixture, &runner))
            .await
            .unwrap_err();

        match err {
            GencheckError::VersionMismatch {
                tool,
                actual,
                expected,
                hint,
                ..
            } => {
                assert_eq!(tool, "gentype.native");
                assert_eq!(actual, "4.1.9");
                assert_eq!(expected, "4.2.0");
                assert_eq!(hint, "node scripts/bump_version_module.js");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failing_version_query_is_tool_invocation_error() {
        let fixture = RepoFixture::new("4.2.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(|_| true, ScriptedResponse::exit(2, "", "segfault\n"));

        let err = VersionValidator::new()
            .validate(&context(&fixture, &runner))
            .await
            .unwrap_err();

        assert!(matches!(err, GencheckError::ToolInvocation { .. }));
        assert_eq!(err.command_result().unwrap().stderr, "segfault\n");
    }

    #[tokio::test]
    async fn test_unstartable_tool_is_tool_invocation_error() {
        let fixture = RepoFixture::new("4.2.0");
        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(
            |_| true,
            ScriptedResponse::launch_failure(std::io::ErrorKind::PermissionDenied),
        );

        let err = VersionValidator::new()
            .validate(&context(&fixture, &runner))
            .await
            .unwrap_err();

        match err {
            GencheckError::ToolInvocation { source, .. } => {
                assert!(matches!(*source, GencheckError::Launch { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_mismatch_names_configured_flag_and_manifest() {
        let fixture = RepoFixture::new("4.2.0");
        std::fs::create_dir_all(fixture.root().join("meta")).unwrap();
        std::fs::write(
            fixture.root().join("meta/tool.json"),
            r#"{"version": "5.0.0"}"#,
        )
        .unwrap();
        let mut config = fixture.config();
        config.tool.version_flag = "-V".to_string();
        config.manifest = PathBuf::from("meta/tool.json");

        let runner = Arc::new(ScriptedRunner::new());
        runner.respond_when(|spec| spec.args == ["-V"], ScriptedResponse::success("4.2.0\n"));

        let err = VersionValidator::new()
            .validate(&fixture.context_with(config, runner.clone()))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("gentype.native -V doesn't contain the version number of tool.json"));
        assert_eq!(runner.calls()[0].args, vec!["-V"]);
    }

    #[tokio::test]
    async fn test_bad_manifest_is_manifest_error() {
        let fixture = RepoFixture::new("4.2.0");
        std::fs::write(fixture.root().join("package.json"), "{").unwrap();
        let runner = Arc::new(ScriptedRunner::new());

        let err = VersionValidator::new()
            .validate(&context(&fixture, &runner))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "GENCHECK-MANIFEST");
        assert_eq!(runner.call_count(), 0);
    }
}
