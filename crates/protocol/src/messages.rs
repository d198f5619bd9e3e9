use serde::{Deserialize, Serialize};

/// Payload of a `status` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonStatus {
    /// Whether the daemon has FUSE mounting available.
    #[serde(default)]
    pub fuse_available: bool,
    /// Whether the daemon is reachable through NAT hole-punching.
    #[serde(default)]
    pub holepunchable: bool,
    /// Daemon version string, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}
