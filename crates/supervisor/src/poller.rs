//! Background liveness poller.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::supervisor::Supervisor;

/// Shortest interval the poller will run at.
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Spawns the liveness poller.
///
/// Every `interval` the supervisor runs one probe-and-connect. The loop runs
/// until `cancel` fires, which the application does only on exit.
pub fn spawn_poller(
    supervisor: Arc<Supervisor>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interval = interval.max(MIN_INTERVAL);
    tokio::spawn(async move {
        poll_loop(supervisor, interval, cancel).await;
    })
}

async fn poll_loop(supervisor: Arc<Supervisor>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // Skip the first immediate tick.
    ticker.tick().await;

    debug!(interval_ms = interval.as_millis() as u64, "liveness poller started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                supervisor.poll().await;
            }
        }
    }
    debug!("liveness poller stopped");
}
