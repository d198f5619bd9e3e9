//! Owned daemon child process.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use hyperdaemon_supervisor::{BoxFuture, ClientFactory, DaemonError, DaemonLauncher, OwnedDaemon};

/// First delay between readiness probes while the daemon boots.
const INITIAL_BACKOFF: Duration = Duration::from_millis(50);

/// Upper bound on the delay between readiness probes.
const MAX_BACKOFF: Duration = Duration::from_secs(1);

/// How to start the daemon executable.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Passed to the daemon as `--storage <dir>`.
    pub storage_dir: Option<PathBuf>,
    pub boot_timeout: Duration,
    pub stop_grace: Duration,
}

/// Spawns daemon children and waits for them to answer on the control channel.
pub struct ProcessLauncher {
    options: LaunchOptions,
    clients: Arc<dyn ClientFactory>,
}

impl ProcessLauncher {
    pub fn new(options: LaunchOptions, clients: Arc<dyn ClientFactory>) -> Self {
        Self { options, clients }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.options.program);
        cmd.args(&self.options.args);
        if let Some(dir) = &self.options.storage_dir {
            cmd.arg("--storage").arg(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn spawn(&self) -> Result<OwnedProcess, DaemonError> {
        let mut child = self.command().spawn().map_err(DaemonError::Spawn)?;
        info!(
            program = %self.options.program.display(),
            pid = child.id(),
            "spawned daemon"
        );

        if let Err(e) = self.wait_for_boot(&mut child).await {
            if let Err(kill_err) = child.kill().await {
                debug!(error = %kill_err, "failed to kill daemon that did not boot");
            }
            return Err(e);
        }

        Ok(OwnedProcess {
            child,
            stop_grace: self.options.stop_grace,
        })
    }

    /// Probes readiness with exponential backoff until the daemon answers,
    /// exits, or `boot_timeout` elapses.
    async fn wait_for_boot(&self, child: &mut Child) -> Result<(), DaemonError> {
        let deadline = Instant::now() + self.options.boot_timeout;
        let mut delay = INITIAL_BACKOFF;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if let Some(status) = child.try_wait()? {
                return Err(DaemonError::Exited(status.to_string()));
            }

            let client = self.clients.create();
            let result = client.ready().await;
            client.close().await;

            match result {
                Ok(()) => {
                    debug!(attempt, "daemon ready");
                    return Ok(());
                }
                Err(e) => trace!(attempt, error = %e, "daemon not ready yet"),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(DaemonError::BootTimeout(self.options.boot_timeout));
            }
            tokio::time::sleep(delay.min(deadline - now)).await;
            delay = (delay * 2).min(MAX_BACKOFF);
        }
    }
}

impl DaemonLauncher for ProcessLauncher {
    fn launch(&self) -> BoxFuture<'_, Result<Box<dyn OwnedDaemon>, DaemonError>> {
        Box::pin(async move {
            let owned = self.spawn().await?;
            Ok(Box::new(owned) as Box<dyn OwnedDaemon>)
        })
    }
}

/// A booted daemon child. Dropping it kills the process.
pub struct OwnedProcess {
    child: Child,
    stop_grace: Duration,
}

impl OwnedProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self) -> Result<(), DaemonError> {
        if let Some(status) = self.child.try_wait()? {
            debug!(%status, "daemon already exited");
            return Ok(());
        }

        #[cfg(unix)]
        if let Some(pid) = self.child.id().and_then(|p| i32::try_from(p).ok()) {
            debug!(pid, "sending SIGTERM to daemon");
            if let Err(e) = crate::pidfile::terminate(pid) {
                debug!(error = %e, "SIGTERM failed");
            }

            match tokio::time::timeout(self.stop_grace, self.child.wait()).await {
                Ok(status) => {
                    let status = status?;
                    debug!(%status, "daemon exited");
                    return Ok(());
                }
                Err(_) => warn!(
                    grace_secs = self.stop_grace.as_secs(),
                    "daemon ignored SIGTERM, killing"
                ),
            }
        }

        self.child.kill().await?;
        Ok(())
    }
}

impl OwnedDaemon for OwnedProcess {
    fn stop(&mut self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(self.terminate())
    }

    fn has_exited(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(status) => status.is_some(),
            Err(e) => {
                debug!(error = %e, "failed to check daemon exit status");
                false
            }
        }
    }
}
