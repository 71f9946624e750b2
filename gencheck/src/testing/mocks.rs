//! Scripted command runner.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::command::{CommandResult, CommandRunner, CommandSpec};
use crate::errors::GencheckError;

/// What a scripted command does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedResponse {
    /// The process runs and exits with `code`.
    Exit {
        /// Exit code.
        code: i32,
        /// Standard output.
        stdout: String,
        /// Standard error.
        stderr: String,
    },
    /// The process cannot be started.
    LaunchFailure(std::io::ErrorKind),
}

impl ScriptedResponse {
    /// Exit code zero with the given stdout.
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::exit(0, stdout, "")
    }

    /// An arbitrary exit.
    #[must_use]
    pub fn exit(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Exit {
            code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// A launch failure of the given kind.
    #[must_use]
    pub fn launch_failure(kind: std::io::ErrorKind) -> Self {
        Self::LaunchFailure(kind)
    }
}

type Matcher = Box<dyn Fn(&CommandSpec) -> bool + Send + Sync>;

/// A [`CommandRunner`] that never spawns anything.
///
/// Commands matching no rule succeed with empty output. Rules are checked
/// in registration order and the first match wins.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<(Matcher, ScriptedResponse)>>,
    calls: Mutex<Vec<CommandSpec>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl ScriptedRunner {
    /// Creates a runner where every command succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every command take `delay` before completing.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answers commands matching `matcher` with `response`.
    pub fn respond_when<F>(&self, matcher: F, response: ScriptedResponse)
    where
        F: Fn(&CommandSpec) -> bool + Send + Sync + 'static,
    {
        self.rules.lock().push((Box::new(matcher), response));
    }

    /// Returns every command received, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    /// Returns the number of commands received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the number of commands that ran to completion.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the highest number of commands running at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn response_for(&self, spec: &CommandSpec) -> ScriptedResponse {
        self.rules
            .lock()
            .iter()
            .find(|(matcher, _)| matcher(spec))
            .map_or_else(|| ScriptedResponse::success(""), |(_, response)| response.clone())
    }
}

impl std::fmt::Debug for ScriptedRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRunner")
            .field("rules", &self.rules.lock().len())
            .field("calls", &self.call_count())
            .field("delay", &self.delay)
            .finish()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandResult, GencheckError> {
        self.calls.lock().push(spec.clone());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.response_for(spec);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        match response {
            ScriptedResponse::Exit {
                code,
                stdout,
                stderr,
            } => {
                let elapsed = self.delay.map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
                CommandResult::new(Some(code), stdout, stderr, elapsed).into_checked(spec)
            }
            ScriptedResponse::LaunchFailure(kind) => Err(GencheckError::Launch {
                command: spec.display(),
                cwd: spec.cwd.clone(),
                source: std::io::Error::from(kind),
            }),
        }
    }
}
