//! Stopping a daemon this process did not start.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use hyperdaemon_supervisor::{BoxFuture, DaemonError, DaemonManager};

/// How often to re-check whether a signalled daemon has exited.
#[cfg(unix)]
const EXIT_POLL: Duration = Duration::from_millis(100);

/// Stops a foreign daemon through the pid file it writes.
#[derive(Debug, Clone)]
pub struct PidFileManager {
    pid_file: PathBuf,
    grace: Duration,
}

impl PidFileManager {
    pub fn new(pid_file: impl Into<PathBuf>, grace: Duration) -> Self {
        Self {
            pid_file: pid_file.into(),
            grace,
        }
    }

    #[cfg(unix)]
    async fn terminate(&self) -> Result<(), DaemonError> {
        use crate::pidfile::{is_alive, read_pid, terminate};

        let pid = read_pid(&self.pid_file)?;
        if !is_alive(pid) {
            return Err(DaemonError::NotRunning(format!("stale pid {pid}")));
        }

        info!(pid, "stopping foreign daemon");
        terminate(pid)?;

        let deadline = tokio::time::Instant::now() + self.grace;
        while is_alive(pid) {
            if tokio::time::Instant::now() >= deadline {
                return Err(DaemonError::Timeout);
            }
            tokio::time::sleep(EXIT_POLL).await;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    async fn terminate(&self) -> Result<(), DaemonError> {
        info!(pid_file = %self.pid_file.display(), "cannot stop foreign daemon on this platform");
        Err(DaemonError::Unsupported("stopping a foreign daemon"))
    }
}

impl DaemonManager for PidFileManager {
    fn stop(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(self.terminate())
    }
}
