use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::process::Command;
use tracing::debug;

/// One external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status and captured streams of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self::with_status(0, "", "")
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self::with_status(code, "", stderr)
    }

    pub fn with_status(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            status_code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Runs external commands to completion, capturing their output.
///
/// `Err` means the command could not be started; a non-zero exit is a
/// successful `run` with a failing [`CommandOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Spawns real processes
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, cwd = %spec.cwd.display(), "Running command");

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to start `{}`", spec.program))?;

        Ok(CommandOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Replays queued outputs and records every command it was asked to run.
///
/// When the queue is empty each call succeeds with empty output.
pub struct MockCommandRunner {
    outputs: Mutex<VecDeque<Result<CommandOutput, String>>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self {
            outputs: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn add_output(&self, output: CommandOutput) {
        lock(&self.outputs).push_back(Ok(output));
    }

    /// Queues a spawn failure, as if the program were not installed
    pub fn add_spawn_error(&self, message: impl Into<String>) {
        lock(&self.outputs).push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        lock(&self.calls).clone()
    }

    pub fn remaining_outputs(&self) -> usize {
        lock(&self.outputs).len()
    }
}

impl Default for MockCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        lock(&self.calls).push(spec.clone());
        match lock(&self.outputs).pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(CommandOutput::success()),
        }
    }
}

/// Last `max_lines` non-empty lines of `text`
pub fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
