use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, trace};

use crate::GitError;

/// The single process boundary: run a program and hand back its trimmed stdout.
///
/// Everything the gateway knows about git flows through this trait, so a test
/// can simulate any tool behavior by substituting a runner.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn exec(&self, program: &str, args: &[&str]) -> Result<String, GitError>;
}

/// Runs commands as child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Directory to run commands in (None = inherit)
    working_dir: Option<PathBuf>,
    /// Deadline for each command (None = no limit)
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub(crate) fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn exec(&self, program: &str, args: &[&str]) -> Result<String, GitError> {
        let start = Instant::now();
        let command = render_command(program, args);

        debug!(
            command = %command,
            working_dir = ?self.working_dir,
            "Running command"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| GitError::Timeout {
                    command: command.clone(),
                    timeout: limit,
                })?,
            None => cmd.output().await,
        }
        .map_err(|source| GitError::SpawnFailed {
            program: program.to_string(),
            source,
        })?;

        debug!(
            exit_code = output.status.code().unwrap_or(-1),
            duration_ms = start.elapsed().as_millis(),
            stdout_len = output.stdout.len(),
            "Command completed"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            trace!(stderr = %stderr, "stderr");
            return Err(GitError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string())
    }
}
