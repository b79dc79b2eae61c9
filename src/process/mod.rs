//! Running external programs.
//!
//! [`SystemCommand`] is a small builder around [`tokio::process::Command`]
//! used for every shell-out the updater performs: `systemctl`, `apt` and
//! `docker compose`. By default the child's stdout and stderr are inherited
//! so the operator sees the tool's own progress output live.
//!
//! A non-zero exit, a spawn failure, or a timeout all become
//! [`UpdaterError::ExternalCommand`] with the full command line.
//!
//! ```rust,no_run
//! use media_updater::process::SystemCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! SystemCommand::new("docker")
//!     .args(["compose", "pull"])
//!     .current_dir("/opt/immich")
//!     .execute_success()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::core::UpdaterError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Builder for one external command invocation.
#[derive(Debug, Clone)]
pub struct SystemCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    /// Capture stdout/stderr instead of streaming them.
    capture_output: bool,
    timeout_duration: Option<Duration>,
    context: Option<String>,
}

/// Captured output of a finished command. Empty when stdio was inherited.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl SystemCommand {
    /// Start building a command for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            capture_output: false,
            timeout_duration: None,
            context: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the command in `dir`.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Capture stdout and stderr instead of streaming them.
    pub const fn capture_output(mut self) -> Self {
        self.capture_output = true;
        self
    }

    /// Kill the command if it runs longer than `duration`.
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label used in log lines.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The command line as a single string, for logs and errors.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command to completion.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::ExternalCommand`] if the program cannot be spawned,
    /// exceeds its timeout, or exits unsuccessfully.
    pub async fn execute(self) -> Result<CommandOutput> {
        let command_line = self.command_line();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        if self.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        match &self.context {
            Some(ctx) => debug!(target: "process", "({}) Executing command: {}", ctx, command_line),
            None => debug!(target: "process", "Executing command: {}", command_line),
        }

        let start = std::time::Instant::now();
        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(UpdaterError::ExternalCommand {
                        command: command_line,
                        reason: format!("timed out after {} seconds", duration.as_secs()),
                    }
                    .into());
                }
            }
        } else {
            output_future.await
        }
        .map_err(|e| UpdaterError::ExternalCommand {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            debug!(target: "process", "Command failed with exit code: {:?}", output.status.code());
            let mut reason = output.status.to_string();
            if !stderr.trim().is_empty() {
                reason.push_str(": ");
                reason.push_str(stderr.trim());
            }
            return Err(UpdaterError::ExternalCommand {
                command: command_line,
                reason,
            }
            .into());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            info!(target: "process::perf", "{} took {:.2}s", command_line, elapsed.as_secs_f64());
        }

        Ok(CommandOutput {
            stdout,
            stderr,
        })
    }

    /// Run the command and discard its output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}
