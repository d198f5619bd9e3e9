//! Lifecycle state and capability flags.

use std::fmt;

use hyperdaemon_protocol::DaemonStatus;

/// Lifecycle state of the supervised daemon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No daemon reachable. Initial state and the state after a clean stop.
    #[default]
    Off,
    /// Probing for a daemon or booting an owned one.
    Starting,
    /// Connected to a live daemon.
    On,
    /// Tearing down the client and the daemon.
    Stopping,
}

impl LifecycleState {
    /// Lowercase name used in notifications and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Off => "off",
            LifecycleState::Starting => "starting",
            LifecycleState::On => "on",
            LifecycleState::Stopping => "stopping",
        }
    }

    /// Returns `true` if `next` is reachable from `self` in one step.
    ///
    /// Re-entering the current state is always allowed (presentation refresh).
    /// `On -> Off` is the poller's edge for a daemon that vanished.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        self == next
            || matches!(
                (self, next),
                (Off, Starting)
                    | (Starting, On)
                    | (Starting, Off)
                    | (On, Stopping)
                    | (On, Off)
                    | (Stopping, Off)
            )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities reported by the daemon on its last successful connect.
///
/// Only meaningful while the state is [`LifecycleState::On`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityFlags {
    pub fuse_enabled: bool,
    pub holepunchable: bool,
}

impl From<&DaemonStatus> for CapabilityFlags {
    fn from(status: &DaemonStatus) -> Self {
        Self {
            fuse_enabled: status.fuse_available,
            holepunchable: status.holepunchable,
        }
    }
}

/// Read-only view of the status model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub state: LifecycleState,
    pub flags: CapabilityFlags,
}

impl StatusSnapshot {
    /// Returns `true` if the daemon is on.
    pub fn is_on(&self) -> bool {
        self.state == LifecycleState::On
    }
}
