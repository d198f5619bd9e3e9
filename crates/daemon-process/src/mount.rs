//! External mount setup command.

use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use hyperdaemon_supervisor::{BoxFuture, DaemonError, MountSetup};

/// Runs a configured command line to prepare filesystem mounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMountSetup {
    program: String,
    args: Vec<String>,
}

impl CommandMountSetup {
    /// Splits a whitespace-separated command line. Returns `None` when blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    async fn execute(&self) -> Result<(), DaemonError> {
        info!(program = %self.program, "running mount setup");
        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(DaemonError::Spawn)?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.is_empty() {
            Err(DaemonError::Command(format!(
                "mount setup failed: {}",
                output.status
            )))
        } else {
            Err(DaemonError::Command(stderr))
        }
    }
}

impl MountSetup for CommandMountSetup {
    fn run(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(self.execute())
    }
}
