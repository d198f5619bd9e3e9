//! Status model: current lifecycle state and last-known capabilities.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::collab::{Notifier, Presenter};
use crate::types::{CapabilityFlags, LifecycleState, StatusSnapshot};

/// Passive holder of the lifecycle state.
///
/// Reads never wait on an in-flight transition. Writes come only from the
/// supervisor, which serializes them behind its transition lock.
pub struct StatusModel {
    current: RwLock<StatusSnapshot>,
    presenter: Arc<dyn Presenter>,
    notifier: Arc<dyn Notifier>,
}

impl StatusModel {
    /// Creates a model in the `Off` state.
    pub fn new(presenter: Arc<dyn Presenter>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            current: RwLock::new(StatusSnapshot::default()),
            presenter,
            notifier,
        }
    }

    /// Returns a snapshot of the current state and flags.
    pub fn get(&self) -> StatusSnapshot {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.get().state
    }

    /// Moves to `state`, optionally notifying the user.
    ///
    /// The presentation hook runs on every call, even when the state is
    /// unchanged.
    pub fn set(&self, state: LifecycleState, notify: bool) {
        let snapshot = {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            if current.state != state {
                if !current.state.can_transition_to(state) {
                    warn!(from = %current.state, to = %state, "unexpected lifecycle transition");
                }
                debug!(status = %state, "status");
            }
            current.state = state;
            *current
        };

        if notify {
            self.notifier.notify(&format!("Daemon is {state}"));
        }
        self.presenter.refresh(&snapshot);
    }

    /// Records capabilities from a successful connect.
    pub(crate) fn record_capabilities(&self, flags: CapabilityFlags) {
        self.current.write().unwrap_or_else(|e| e.into_inner()).flags = flags;
    }
}
