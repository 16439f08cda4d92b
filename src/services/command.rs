use std::ffi::OsString;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommandError;

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
}

/// Runs one external tool to completion.
///
/// Success means exit status zero; anything else comes back as a
/// [`CommandError`]. Implementations must not leave the process running
/// once the returned future resolves or is dropped.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError>;
}

/// Spawns real processes, each bounded by a timeout.
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        let start = Instant::now();
        debug!(program = program, args = ?args, "Running external command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the wait future below on timeout kills the child
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CommandError::Io {
                program: program.to_string(),
                source,
            })?,
            Err(_) => {
                warn!(
                    program = program,
                    timeout_secs = self.timeout.as_secs(),
                    "External command timed out and was killed"
                );
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        if !output.status.success() {
            warn!(
                program = program,
                status = %output.status,
                elapsed_ms = elapsed_ms,
                "External command failed"
            );
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(program = program, elapsed_ms = elapsed_ms, "External command finished");
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
