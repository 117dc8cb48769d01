//! Type-safe command builder for running external tools
//!
//! Every external program gotask touches (the `go` command, test binaries,
//! generators, linters) is spawned through [`ToolCommand`], which gives them
//! uniform logging, timeout handling, and error mapping onto
//! [`GotaskError::ExternalProcessError`].

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::GotaskError;
use crate::utils::platform::resolve_program;

/// Builder for constructing and executing an external program with consistent
/// error handling.
///
/// # Examples
///
/// ```rust,no_run
/// use gotask::process::ToolCommand;
///
/// # async fn example() -> anyhow::Result<()> {
/// // Captured query
/// let version = ToolCommand::new("go")
///     .args(["list", "-f", "{{.Module.Version}}", "golang.org/x/tools/cmd/stringer"])
///     .current_dir("tools")
///     .execute_stdout()
///     .await?;
///
/// // Build with output streamed to the terminal
/// ToolCommand::new("go")
///     .args(["build", "-o", "bin/app", "example.com/app"])
///     .inherit_stdio()
///     .execute_success()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: none
/// - **Output capture**: enabled
/// - **Working directory**: current process directory
/// - **Environment**: inherited, plus any [`env`](Self::env) overrides
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program to run, either a bare name looked up on PATH or a path
    program: String,

    /// Command arguments
    args: Vec<String>,

    /// Working directory for the process (defaults to current directory)
    current_dir: Option<PathBuf>,

    /// Whether to capture output (true) or inherit stdio (false)
    capture_output: bool,

    /// Extra environment variables
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string for log messages
    context: Option<String>,
}

impl ToolCommand {
    /// Creates a builder for `program` with default settings.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            env_vars: Vec::new(),
            timeout_duration: None,
            context: None,
        }
    }

    /// Sets the working directory for the process.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the working directory only when one is given.
    pub fn maybe_current_dir(self, dir: Option<&Path>) -> Self {
        match dir {
            Some(dir) if !dir.as_os_str().is_empty() => self.current_dir(dir),
            _ => self,
        }
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable for the process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Disables output capture so the process writes straight to the terminal.
    ///
    /// Captured stderr is then unavailable for error messages.
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context for logging (e.g., the task id)
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The full command line, for logging and test assertions.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "run".to_string())
    }

    /// A process that could not be started, reported like one that failed.
    fn spawn_error(&self, err: &std::io::Error) -> anyhow::Error {
        GotaskError::ExternalProcessError {
            program: self.program.clone(),
            operation: self.operation(),
            status: None,
            stderr: format!("Failed to execute {}: {}", self.command_line(), err),
        }
        .into()
    }

    /// Execute the command and return its output.
    ///
    /// # Errors
    ///
    /// - [`GotaskError::ToolNotFound`] if the program cannot be located
    /// - [`GotaskError::ProcessTimeout`] if the timeout expires
    /// - [`GotaskError::ExternalProcessError`] on a non-zero exit status or
    ///   when the process cannot be started
    pub async fn execute(self) -> Result<ToolCommandOutput> {
        let start = Instant::now();
        let ctx = self.context.as_deref().unwrap_or("-");

        let Some(resolved) = resolve_program(&self.program) else {
            return Err(GotaskError::ToolNotFound {
                program: self.program.clone(),
            }
            .into());
        };

        let mut cmd = Command::new(&resolved);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(target: "process", "({}) Executing command: {}", ctx, self.command_line());

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "process", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        if self.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        cmd.stdin(Stdio::null());
        cmd.kill_on_drop(true);

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result.map_err(|e| self.spawn_error(&e))?
            } else {
                tracing::warn!(
                    target: "process",
                    "({}) Command timed out after {} seconds: {}",
                    ctx,
                    duration.as_secs(),
                    self.command_line()
                );
                return Err(GotaskError::ProcessTimeout {
                    program: self.program.clone(),
                    seconds: duration.as_secs(),
                }
                .into());
            }
        } else {
            output_future.await.map_err(|e| self.spawn_error(&e))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "process",
                "({}) Command failed with exit code: {:?}",
                ctx,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "process", "({}) Error: {}", ctx, stderr.trim());
            }

            return Err(GotaskError::ExternalProcessError {
                program: self.program.clone(),
                operation: self.operation(),
                status: output.status.code(),
                stderr: if stderr.is_empty() {
                    stdout
                } else {
                    stderr
                },
            }
            .into());
        }

        if !stderr.is_empty() {
            tracing::debug!(target: "process", "({}) {}", ctx, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "process::perf",
                "({}) {} {} took {:.2}s",
                ctx,
                self.program,
                self.operation(),
                elapsed.as_secs_f64()
            );
        }

        Ok(ToolCommandOutput {
            stdout,
            stderr,
        })
    }

    /// Execute the command and return only stdout as a trimmed string
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute the command and check for success, discarding any output
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from an external command
#[derive(Debug, Clone)]
pub struct ToolCommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error output
    pub stderr: String,
}
