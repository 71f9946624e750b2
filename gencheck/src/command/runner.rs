//! Command runner trait and the process-backed implementation.

use super::{CommandResult, CommandSpec, ShellPolicy};
use crate::core::Platform;
use crate::errors::GencheckError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

/// Runs one external command to completion.
///
/// Implementations return `Ok` only when the process exits with code zero.
/// A program that cannot be started yields [`GencheckError::Launch`]; a
/// process that exits unsuccessfully yields [`GencheckError::Runtime`]
/// carrying its captured output.
#[async_trait]
pub trait CommandRunner: Send + Sync + Debug {
    /// Runs the command described by `spec`.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, GencheckError>;
}

/// Spawns real child processes with `tokio::process`.
///
/// Streamed commands have their stdout/stderr forwarded chunk by chunk to
/// this process's stdout/stderr while also being captured. Concurrent
/// children write to the shared streams without coordination, so their
/// output may interleave.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    shell: ShellPolicy,
}

impl ProcessRunner {
    /// Creates a runner with an explicit shell policy.
    #[must_use]
    pub fn new(shell: ShellPolicy) -> Self {
        Self { shell }
    }

    /// Creates a runner for the given platform.
    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self::new(ShellPolicy::for_platform(platform))
    }

    /// Returns the shell policy.
    #[must_use]
    pub fn shell(&self) -> ShellPolicy {
        self.shell
    }

    fn command(&self, spec: &CommandSpec) -> Command {
        let (program, args) = self.shell.invocation(spec);
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&spec.cwd)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, GencheckError> {
        let launch_error = |source: std::io::Error| GencheckError::Launch {
            command: spec.display(),
            cwd: spec.cwd.clone(),
            source,
        };

        debug!(command = %spec.display(), cwd = %spec.cwd.display(), "Spawning process");
        let start = Instant::now();
        let mut child = self.command(spec).spawn().map_err(launch_error)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| launch_error(std::io::Error::other("stdout was not piped")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| launch_error(std::io::Error::other("stderr was not piped")))?;

        let streamed = spec.is_streamed();
        let (out, err, status) = tokio::join!(
            pump(stdout, streamed.then(tokio::io::stdout)),
            pump(stderr, streamed.then(tokio::io::stderr)),
            child.wait(),
        );
        let status = status?;

        let result = CommandResult::new(
            status.code(),
            String::from_utf8_lossy(&out?),
            String::from_utf8_lossy(&err?),
            u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        );
        debug!(
            command = %spec.display(),
            status = %result.status_label(),
            duration_ms = result.duration_ms,
            "Process exited"
        );

        result.into_checked(spec)
    }
}

/// Copies `reader` to `echo` (if any) as data arrives and returns
/// everything read.
///
/// Echoing stops at the first write error while the child keeps being
/// drained, so a closed console never changes the captured output or
/// blocks the child on a full pipe.
async fn pump<R, W>(mut reader: R, mut echo: Option<W>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        captured.extend_from_slice(&buf[..n]);
        if let Some(writer) = echo.as_mut() {
            if let Err(error) = forward(writer, &buf[..n]).await {
                debug!(%error, "Stopped echoing child output");
                echo = None;
            }
        }
    }
    Ok(captured)
}

async fn forward<W: AsyncWrite + Unpin>(writer: &mut W, chunk: &[u8]) -> std::io::Result<()> {
    writer.write_all(chunk).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pump_captures_and_echoes() {
        let input: &[u8] = b"line one\nline two\n";
        let mut echoed = Vec::new();

        let captured = pump(input, Some(&mut echoed)).await.unwrap();

        assert_eq!(captured, b"line one\nline two\n");
        assert_eq!(echoed, b"line one\nline two\n");
    }

    struct ClosedConsole;

    impl AsyncWrite for ClosedConsole {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe)))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_pump_keeps_capturing_when_echo_fails() {
        let data = vec![b'x'; 3 * 8192 + 17];

        let captured = pump(data.as_slice(), Some(ClosedConsole)).await.unwrap();

        assert_eq!(captured, data);
    }

    #[tokio::test]
    async fn test_pump_without_echo() {
        let input: &[u8] = b"quiet";
        let captured = pump(input, None::<Vec<u8>>).await.unwrap();
        assert_eq!(captured, b"quiet");
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let runner = ProcessRunner::new(ShellPolicy::Direct);
        let spec = CommandSpec::new("gencheck-definitely-missing-binary", std::env::temp_dir())
            .captured();

        let err = runner.run(&spec).await.unwrap_err();
        match err {
            GencheckError::Launch { command, source, .. } => {
                assert_eq!(command, "gencheck-definitely-missing-binary");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_process_captures_output() {
        let runner = ProcessRunner::new(ShellPolicy::Direct);
        let spec = CommandSpec::new("sh", std::env::temp_dir())
            .args(["-c", "echo out; echo err >&2"])
            .captured();

        let result = runner.run(&spec).await.unwrap();
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_runtime_error() {
        let runner = ProcessRunner::new(ShellPolicy::Direct);
        let spec = CommandSpec::new("sh", std::env::temp_dir())
            .args(["-c", "echo partial; exit 3"]);

        let err = runner.run(&spec).await.unwrap_err();
        match err {
            GencheckError::Runtime { result, command, .. } => {
                assert_eq!(command, "sh -c echo partial; exit 3");
                assert_eq!(result.exit_code, Some(3));
                assert_eq!(result.stdout, "partial\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_env_overlay_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(ShellPolicy::Direct);
        let spec = CommandSpec::new("sh", dir.path())
            .args(["-c", "printf '%s' \"$GENCHECK_PROBE\"; pwd >&2"])
            .env("GENCHECK_PROBE", "overlay")
            .captured();

        let result = runner.run(&spec).await.unwrap();
        assert_eq!(result.stdout, "overlay");
        let reported = std::path::PathBuf::from(result.stderr.trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }
}
