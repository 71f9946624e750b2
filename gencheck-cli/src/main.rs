//! Command-line entry point for a gencheck verification run.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gencheck::command::ProcessRunner;
use gencheck::config::VerifyConfig;
use gencheck::events::LoggingEventSink;
use gencheck::pipeline::{Orchestrator, RunReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostic log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "gencheck",
    about = "Build every example project against the freshly built code generator",
    version
)]
struct Cli {
    /// Repository root; relative paths in the configuration resolve against it.
    #[arg(long, env = "GENCHECK_REPO_ROOT", value_name = "DIR", default_value = ".")]
    repo_root: PathBuf,

    /// JSON configuration file. Defaults reproduce the standard layout.
    #[arg(long, env = "GENCHECK_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fail when generated files differ from source control.
    #[arg(long)]
    check_diff: bool,

    /// Diagnostic log format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Write the JSON run report to this file.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry();

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_filter(filter),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_filter(filter),
            )
            .try_init(),
    }
    .context("Failed to initialise logging")
}

/// Makes the root absolute without canonicalising it. Canonical paths are
/// verbatim (`\\?\C:\...`) on Windows, which breaks `/`-separated
/// relative targets and cannot be a `cmd` working directory.
fn resolve_repo_root(path: &Path) -> Result<PathBuf> {
    let root = std::path::absolute(path)
        .with_context(|| format!("Repository root {} cannot be resolved", path.display()))?;
    anyhow::ensure!(
        root.is_dir(),
        "Repository root {} is not an accessible directory",
        root.display()
    );
    Ok(root)
}

fn load_config(cli: &Cli) -> Result<VerifyConfig> {
    let root = resolve_repo_root(&cli.repo_root)?;

    let mut config = VerifyConfig::load(root, cli.config.as_deref())?;
    if cli.check_diff {
        config = config.with_diff_check(true);
    }
    config.validate()?;
    Ok(config)
}

fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&report.to_json())?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write run report to {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let config = load_config(&cli)?;
    tracing::debug!(?config, "Configuration loaded");

    let report = Orchestrator::new(config, Arc::new(ProcessRunner::default()))
        .with_event_sink(Arc::new(LoggingEventSink::debug()))
        .run()
        .await;

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
    }

    std::process::exit(report.exit_code());
}
