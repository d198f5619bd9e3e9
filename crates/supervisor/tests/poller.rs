mod common;

use std::time::Duration;

use common::{World, supervisor};
use hyperdaemon_supervisor::{LifecycleState, spawn_poller};
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn poller_tracks_external_daemon() {
    let world = World::new();
    let sup = supervisor(&world);
    let cancel = CancellationToken::new();
    let handle = spawn_poller(sup.clone(), INTERVAL, cancel.clone());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(sup.status().state, LifecycleState::Off);

    world
        .reachable
        .store(true, std::sync::atomic::Ordering::SeqCst);
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(sup.status().state, LifecycleState::On);

    world.kill();
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(sup.status().state, LifecycleState::Off);
    assert!(world.notes().is_empty());
    assert_eq!(world.launches(), 0);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn poller_skips_immediate_tick() {
    let world = World::with_foreign_daemon();
    let sup = supervisor(&world);
    let cancel = CancellationToken::new();
    let handle = spawn_poller(sup.clone(), INTERVAL, cancel.clone());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(sup.status().state, LifecycleState::Off);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(sup.status().state, LifecycleState::On);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn poller_stops_on_cancel() {
    let world = World::new();
    let sup = supervisor(&world);
    let cancel = CancellationToken::new();
    let handle = spawn_poller(sup.clone(), INTERVAL, cancel.clone());

    cancel.cancel();
    handle.await.unwrap();

    // No further ticks after cancellation.
    world
        .reachable
        .store(true, std::sync::atomic::Ordering::SeqCst);
    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(sup.status().state, LifecycleState::Off);
}

#[tokio::test(start_paused = true)]
async fn poller_clamps_tiny_intervals() {
    let world = World::with_foreign_daemon();
    let sup = supervisor(&world);
    let cancel = CancellationToken::new();
    let handle = spawn_poller(sup.clone(), Duration::ZERO, cancel.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sup.status().state, LifecycleState::Off);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sup.status().state, LifecycleState::On);

    cancel.cancel();
    handle.await.unwrap();
}
