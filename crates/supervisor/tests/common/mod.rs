//! In-memory daemon world shared by the supervisor tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hyperdaemon_protocol::DaemonStatus;
use hyperdaemon_supervisor::{
    BoxFuture, ClientFactory, Collaborators, DaemonClient, DaemonError, DaemonLauncher,
    DaemonManager, LifecycleState, MountSetup, Notifier, OwnedDaemon, Presenter, StatusSnapshot,
    Supervisor,
};

/// Simulated daemon plus a record of everything the supervisor did to it.
#[derive(Default)]
pub struct World {
    pub reachable: AtomicBool,
    pub fuse_available: AtomicBool,
    pub holepunchable: AtomicBool,
    /// `launch` fails outright.
    pub launch_fails: AtomicBool,
    /// `launch` succeeds but the daemon never answers.
    pub boots_unreachable: AtomicBool,
    /// The owned daemon process is gone.
    pub exited: AtomicBool,
    pub mount_error: Mutex<Option<String>>,

    pub launches: AtomicUsize,
    pub owned_stops: AtomicUsize,
    pub foreign_stops: AtomicUsize,
    pub clients_created: AtomicUsize,
    pub clients_closed: AtomicUsize,
    pub mount_runs: AtomicUsize,
    pub events: Mutex<Vec<&'static str>>,
    pub states: Mutex<Vec<LifecycleState>>,
    pub snapshots: Mutex<Vec<StatusSnapshot>>,
    pub notes: Mutex<Vec<String>>,
}

impl World {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A daemon started by someone else is already serving.
    pub fn with_foreign_daemon() -> Arc<Self> {
        let world = Self::new();
        world.reachable.store(true, Ordering::SeqCst);
        world
    }

    /// The daemon dies without the supervisor's involvement.
    pub fn kill(&self) {
        self.reachable.store(false, Ordering::SeqCst);
        self.exited.store(true, Ordering::SeqCst);
    }

    /// The daemon stays alive but stops answering.
    pub fn stall(&self) {
        self.reachable.store(false, Ordering::SeqCst);
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn owned_stops(&self) -> usize {
        self.owned_stops.load(Ordering::SeqCst)
    }

    pub fn foreign_stops(&self) -> usize {
        self.foreign_stops.load(Ordering::SeqCst)
    }

    pub fn live_clients(&self) -> usize {
        self.clients_created.load(Ordering::SeqCst) - self.clients_closed.load(Ordering::SeqCst)
    }

    pub fn notes(&self) -> Vec<String> {
        self.notes.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<LifecycleState> {
        self.states.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_records(&self) {
        self.states.lock().unwrap().clear();
        self.notes.lock().unwrap().clear();
        self.events.lock().unwrap().clear();
    }

    fn log(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

/// Panics if the recorded states contain an edge outside the transition table.
pub fn assert_legal_transitions(states: &[LifecycleState]) {
    let mut prev = LifecycleState::Off;
    for &next in states {
        assert!(
            prev.can_transition_to(next),
            "illegal transition {prev} -> {next} in {states:?}"
        );
        prev = next;
    }
}

struct FakeClients(Arc<World>);

impl ClientFactory for FakeClients {
    fn create(&self) -> Box<dyn DaemonClient> {
        self.0.clients_created.fetch_add(1, Ordering::SeqCst);
        Box::new(FakeClient(self.0.clone()))
    }
}

struct FakeClient(Arc<World>);

impl DaemonClient for FakeClient {
    fn ready(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            if self.0.reachable.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(DaemonError::Unreachable("connection refused".into()))
            }
        })
    }

    fn status(&self) -> BoxFuture<'_, Result<DaemonStatus, DaemonError>> {
        Box::pin(async move {
            Ok(DaemonStatus {
                fuse_available: self.0.fuse_available.load(Ordering::SeqCst),
                holepunchable: self.0.holepunchable.load(Ordering::SeqCst),
                version: None,
            })
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.0.clients_closed.fetch_add(1, Ordering::SeqCst);
            self.0.log("client.close");
        })
    }
}

struct FakeLauncher(Arc<World>);

impl DaemonLauncher for FakeLauncher {
    fn launch(&self) -> BoxFuture<'_, Result<Box<dyn OwnedDaemon>, DaemonError>> {
        Box::pin(async move {
            self.0.launches.fetch_add(1, Ordering::SeqCst);
            self.0.log("launch");
            if self.0.launch_fails.load(Ordering::SeqCst) {
                return Err(DaemonError::Exited("exit status: 1".into()));
            }
            self.0.exited.store(false, Ordering::SeqCst);
            if !self.0.boots_unreachable.load(Ordering::SeqCst) {
                self.0.reachable.store(true, Ordering::SeqCst);
            }
            Ok(Box::new(FakeOwned(self.0.clone())) as Box<dyn OwnedDaemon>)
        })
    }
}

struct FakeOwned(Arc<World>);

impl OwnedDaemon for FakeOwned {
    fn stop(&mut self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            self.0.owned_stops.fetch_add(1, Ordering::SeqCst);
            self.0.log("owned.stop");
            self.0.reachable.store(false, Ordering::SeqCst);
            self.0.exited.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn has_exited(&mut self) -> bool {
        self.0.exited.load(Ordering::SeqCst)
    }
}

struct FakeManager(Arc<World>);

impl DaemonManager for FakeManager {
    fn stop(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            self.0.foreign_stops.fetch_add(1, Ordering::SeqCst);
            self.0.log("foreign.stop");
            self.0.reachable.store(false, Ordering::SeqCst);
            Ok(())
        })
    }
}

struct FakeMount(Arc<World>);

impl MountSetup for FakeMount {
    fn run(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            self.0.mount_runs.fetch_add(1, Ordering::SeqCst);
            match self.0.mount_error.lock().unwrap().clone() {
                Some(message) => Err(DaemonError::Command(message)),
                None => Ok(()),
            }
        })
    }
}

struct Recorder(Arc<World>);

impl Presenter for Recorder {
    fn refresh(&self, snapshot: &StatusSnapshot) {
        let mut states = self.0.states.lock().unwrap();
        if states.last() != Some(&snapshot.state) {
            states.push(snapshot.state);
        }
        self.0.snapshots.lock().unwrap().push(*snapshot);
    }
}

impl Notifier for Recorder {
    fn notify(&self, message: &str) {
        self.0.notes.lock().unwrap().push(message.to_string());
    }
}

pub fn collaborators(world: &Arc<World>, with_mount: bool) -> Collaborators {
    let recorder = Arc::new(Recorder(world.clone()));
    Collaborators {
        clients: Arc::new(FakeClients(world.clone())),
        launcher: Arc::new(FakeLauncher(world.clone())),
        manager: Arc::new(FakeManager(world.clone())),
        presenter: recorder.clone(),
        notifier: recorder,
        mount_setup: with_mount
            .then(|| Arc::new(FakeMount(world.clone())) as Arc<dyn MountSetup>),
    }
}

pub fn supervisor(world: &Arc<World>) -> Arc<Supervisor> {
    Arc::new(Supervisor::new(collaborators(world, false)))
}

pub fn supervisor_with_mount(world: &Arc<World>) -> Arc<Supervisor> {
    Arc::new(Supervisor::new(collaborators(world, true)))
}
