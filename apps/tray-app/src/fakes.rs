//! In-memory collaborators for the app's unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hyperdaemon_protocol::DaemonStatus;
use hyperdaemon_supervisor::{
    BoxFuture, ClientFactory, Collaborators, DaemonClient, DaemonError, DaemonLauncher,
    DaemonManager, Notifier, OwnedDaemon, Presenter, StatusSnapshot, Supervisor,
};

use crate::actions::LoginDisplay;

/// A daemon that never boots unless `up` is set.
#[derive(Default)]
pub struct Fake {
    pub up: AtomicBool,
    pub launch_fails: AtomicBool,
    pub owned_stops: AtomicUsize,
    pub foreign_stops: AtomicUsize,
    pub notes: Mutex<Vec<String>>,
    pub login: Mutex<Option<bool>>,
}

impl Fake {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }
}

struct Client(Arc<Fake>);

impl DaemonClient for Client {
    fn ready(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            if self.0.up.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DaemonError::Unreachable("refused".into()))
            }
        })
    }

    fn status(&self) -> BoxFuture<'_, Result<DaemonStatus, DaemonError>> {
        Box::pin(async { Ok(DaemonStatus::default()) })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

struct Owned(Arc<Fake>);

impl OwnedDaemon for Owned {
    fn stop(&mut self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            self.0.owned_stops.fetch_add(1, Ordering::SeqCst);
            self.0.up.store(false, Ordering::SeqCst);
            Ok(())
        })
    }

    fn has_exited(&mut self) -> bool {
        !self.0.up.load(Ordering::SeqCst)
    }
}

/// Every collaborator, backed by one [`Fake`].
pub struct Parts(pub Arc<Fake>);

impl Parts {
    pub fn supervisor(fake: &Arc<Fake>) -> Arc<Supervisor> {
        Self::supervisor_presenting(fake, Arc::new(Parts(fake.clone())))
    }

    /// Like [`Parts::supervisor`], rendering through `presenter`.
    pub fn supervisor_presenting(
        fake: &Arc<Fake>,
        presenter: Arc<dyn Presenter>,
    ) -> Arc<Supervisor> {
        let parts = Arc::new(Parts(fake.clone()));
        Arc::new(Supervisor::new(Collaborators {
            clients: parts.clone(),
            launcher: parts.clone(),
            manager: parts.clone(),
            presenter,
            notifier: parts,
            mount_setup: None,
        }))
    }
}

impl ClientFactory for Parts {
    fn create(&self) -> Box<dyn DaemonClient> {
        Box::new(Client(self.0.clone()))
    }
}

impl DaemonLauncher for Parts {
    fn launch(&self) -> BoxFuture<'_, Result<Box<dyn OwnedDaemon>, DaemonError>> {
        Box::pin(async move {
            if self.0.launch_fails.load(Ordering::SeqCst) {
                return Err(DaemonError::Exited("exit status: 1".into()));
            }
            self.0.up.store(true, Ordering::SeqCst);
            Ok(Box::new(Owned(self.0.clone())) as Box<dyn OwnedDaemon>)
        })
    }
}

impl DaemonManager for Parts {
    fn stop(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            self.0.foreign_stops.fetch_add(1, Ordering::SeqCst);
            self.0.up.store(false, Ordering::SeqCst);
            Ok(())
        })
    }
}

impl Presenter for Parts {
    fn refresh(&self, _snapshot: &StatusSnapshot) {}
}

impl Notifier for Parts {
    fn notify(&self, message: &str) {
        self.0.notes.lock().unwrap().push(message.to_string());
    }
}

impl LoginDisplay for Parts {
    fn set_launch_on_login(&self, enabled: bool) {
        *self.0.login.lock().unwrap() = Some(enabled);
    }
}
