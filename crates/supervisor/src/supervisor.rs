//! The daemon lifecycle state machine.

use hyperdaemon_protocol::DaemonStatus;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::collab::{Collaborators, DaemonClient, OwnedDaemon};
use crate::error::{DaemonError, SupervisorError};
use crate::status::StatusModel;
use crate::types::{CapabilityFlags, LifecycleState, StatusSnapshot};

/// Handles that only exist between transitions.
///
/// An owned daemon that stops answering is kept while `Off` until it exits
/// or is stopped, so a later tick can pick it up again.
#[derive(Default)]
struct Handles {
    client: Option<Box<dyn DaemonClient>>,
    owned: Option<Box<dyn OwnedDaemon>>,
}

/// Supervises the storage daemon.
///
/// Every public operation takes the transition lock for its whole duration,
/// so a poll tick can never interleave with a start or stop in flight. The
/// status snapshot stays readable while a transition runs.
pub struct Supervisor {
    collab: Collaborators,
    status: StatusModel,
    handles: Mutex<Handles>,
}

impl Supervisor {
    /// Creates a supervisor in the `Off` state.
    pub fn new(collab: Collaborators) -> Self {
        let status = StatusModel::new(collab.presenter.clone(), collab.notifier.clone());
        Self {
            collab,
            status,
            handles: Mutex::new(Handles::default()),
        }
    }

    /// Returns the current state and capability flags.
    pub fn status(&self) -> StatusSnapshot {
        self.status.get()
    }

    /// Returns `true` if a mount setup step was configured at startup.
    pub fn has_mount_setup(&self) -> bool {
        self.collab.mount_setup.is_some()
    }

    /// Returns `true` while this process holds a daemon it spawned.
    pub async fn owns_daemon(&self) -> bool {
        self.handles.lock().await.owned.is_some()
    }

    /// Re-renders the presentation without changing state.
    pub fn refresh(&self) {
        self.status.set(self.status.state(), false);
    }

    /// Brings the daemon up, adopting a running one when possible.
    ///
    /// Calling this while `On` only re-validates the connection.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let mut handles = self.handles.lock().await;
        self.start_locked(&mut handles).await
    }

    /// Stops the daemon. Outside `On` this only stops an owned daemon that
    /// stopped answering, without a state change.
    pub async fn stop(&self) {
        let mut handles = self.handles.lock().await;
        self.stop_locked(&mut handles).await;
    }

    /// Starts or stops depending on the current state.
    pub async fn toggle(&self) -> Result<(), SupervisorError> {
        let mut handles = self.handles.lock().await;
        if self.status.state() == LifecycleState::On {
            self.stop_locked(&mut handles).await;
            Ok(())
        } else {
            self.start_locked(&mut handles).await
        }
    }

    /// One liveness check. Returns `true` if a daemon answered.
    ///
    /// A daemon that stops answering moves the state to `Off` without a
    /// notification; a daemon that answers again, or appeared, is adopted.
    pub async fn poll(&self) -> bool {
        let mut handles = self.handles.lock().await;
        if self.status.state() == LifecycleState::On {
            return self.revalidate(&mut handles).await;
        }

        match self.connect(&mut handles).await {
            Ok(()) => {
                if handles.owned.is_some() {
                    info!("owned daemon is answering again");
                } else {
                    info!("adopted daemon started elsewhere");
                }
                self.status.set(LifecycleState::Starting, false);
                self.status.set(LifecycleState::On, false);
                true
            }
            Err(e) => {
                debug!(error = %e, "daemon not reachable");
                self.reap_exited(&mut handles).await;
                self.status.set(LifecycleState::Off, false);
                false
            }
        }
    }

    /// Runs the mount setup step, then restarts the daemon so it picks the
    /// change up. On setup failure the lifecycle is left untouched.
    pub async fn setup_mount_and_restart(&self) -> Result<(), SupervisorError> {
        let setup = self
            .collab
            .mount_setup
            .clone()
            .ok_or(SupervisorError::MountUnavailable)?;

        let mut handles = self.handles.lock().await;
        setup.run().await.map_err(SupervisorError::MountSetup)?;

        info!("mount setup complete, restarting daemon");
        self.stop_locked(&mut handles).await;
        self.start_locked(&mut handles).await
    }

    /// Best-effort teardown before the process exits on a signal.
    ///
    /// Closes the client and waits for an owned daemon to stop so it is not
    /// orphaned. A foreign daemon is left running.
    pub async fn shutdown(&self) {
        let mut handles = self.handles.lock().await;
        if let Some(client) = handles.client.take() {
            client.close().await;
        }
        if let Some(mut owned) = handles.owned.take() {
            info!("stopping owned daemon");
            if let Err(e) = owned.stop().await {
                warn!(error = %e, "failed to stop owned daemon");
            }
        }
        self.status.set(LifecycleState::Off, false);
    }

    async fn start_locked(&self, handles: &mut Handles) -> Result<(), SupervisorError> {
        debug!("start");
        if self.status.state() == LifecycleState::On && self.revalidate(handles).await {
            return Ok(());
        }

        self.status.set(LifecycleState::Starting, false);

        if self.connect(handles).await.is_ok() {
            info!(owned = handles.owned.is_some(), "daemon already running, adopting it");
            self.status.set(LifecycleState::On, false);
            return Ok(());
        }

        if let Some(mut stale) = handles.owned.take() {
            warn!("owned daemon is not answering, replacing it");
            if let Err(e) = stale.stop().await {
                debug!(error = %e, "failed to stop unresponsive daemon");
            }
        }

        let owned = match self.collab.launcher.launch().await {
            Ok(owned) => owned,
            Err(e) => {
                self.status.set(LifecycleState::Off, false);
                return Err(SupervisorError::Boot(e));
            }
        };
        handles.owned = Some(owned);

        match self.connect(handles).await {
            Ok(()) => {
                info!("daemon started");
                self.status.set(LifecycleState::On, true);
                Ok(())
            }
            Err(e) => {
                self.release(handles).await;
                self.status.set(LifecycleState::Off, false);
                Err(SupervisorError::Boot(e))
            }
        }
    }

    async fn stop_locked(&self, handles: &mut Handles) {
        let state = self.status.state();
        if state != LifecycleState::On {
            match handles.owned.take() {
                Some(mut owned) => {
                    info!(status = %state, "stopping unresponsive owned daemon");
                    if let Err(e) = owned.stop().await {
                        warn!(error = %e, "failed to stop owned daemon");
                    }
                }
                None => debug!(status = %state, "stop ignored"),
            }
            return;
        }

        self.status.set(LifecycleState::Stopping, false);

        if let Some(client) = handles.client.take() {
            client.close().await;
        }

        match handles.owned.take() {
            Some(mut owned) => {
                if let Err(e) = owned.stop().await {
                    warn!(error = %e, "failed to stop owned daemon");
                }
            }
            None => {
                if let Err(e) = self.collab.manager.stop().await {
                    warn!(error = %e, "failed to stop foreign daemon");
                }
            }
        }

        info!("daemon stopped");
        self.status.set(LifecycleState::Off, true);
    }

    /// Confirms an `On` daemon still answers, dropping to `Off` if not.
    ///
    /// Only the client is dropped on failure. An owned daemon is kept unless
    /// its process has exited.
    async fn revalidate(&self, handles: &mut Handles) -> bool {
        match self.connect(handles).await {
            Ok(()) => {
                self.status.set(LifecycleState::On, false);
                true
            }
            Err(e) => {
                debug!(error = %e, "daemon stopped answering");
                self.reap_exited(handles).await;
                self.status.set(LifecycleState::Off, false);
                false
            }
        }
    }

    /// Releases the owned daemon if its process is gone.
    async fn reap_exited(&self, handles: &mut Handles) {
        let exited = handles.owned.as_mut().is_some_and(|owned| owned.has_exited());
        if exited && let Some(mut owned) = handles.owned.take() {
            debug!("owned daemon exited");
            if let Err(e) = owned.stop().await {
                debug!(error = %e, "owned daemon cleanup failed");
            }
        }
    }

    /// Probe-and-connect: replaces the client with a fresh one that has
    /// answered `ready` and `status`, and records the reported capabilities.
    async fn connect(&self, handles: &mut Handles) -> Result<(), DaemonError> {
        if let Some(previous) = handles.client.take() {
            previous.close().await;
        }

        let client = self.collab.clients.create();
        let status = match probe(client.as_ref()).await {
            Ok(status) => status,
            Err(e) => {
                client.close().await;
                return Err(e);
            }
        };

        self.status.record_capabilities(CapabilityFlags::from(&status));
        handles.client = Some(client);
        Ok(())
    }

    /// Drops the client and reaps an owned daemon, ignoring failures.
    async fn release(&self, handles: &mut Handles) {
        if let Some(client) = handles.client.take() {
            client.close().await;
        }
        if let Some(mut owned) = handles.owned.take()
            && let Err(e) = owned.stop().await
        {
            debug!(error = %e, "owned daemon cleanup failed");
        }
    }
}

async fn probe(client: &dyn DaemonClient) -> Result<DaemonStatus, DaemonError> {
    client.ready().await?;
    client.status().await
}
