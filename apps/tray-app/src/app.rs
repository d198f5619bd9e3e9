//! Application orchestrator: wires the supervisor, tray and desktop together.

use std::sync::Arc;
use std::time::Duration;

use hyperdaemon_client::WsClientFactory;
use hyperdaemon_process::{CommandMountSetup, LaunchOptions, PidFileManager, ProcessLauncher};
use hyperdaemon_supervisor::{
    Collaborators, MountSetup, Supervisor, SupervisorError, spawn_poller,
};
use hyperdaemon_tray::{TrayConfig, TrayEvent, TrayHandle};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::actions::{Actions, Flow};
use crate::config::{self, Config};
use crate::frontend;
use crate::login::LoginItem;
use crate::signals::{Signals, Termination};
use crate::store::State;

/// How often pending tray events are drained.
const EVENT_POLL: Duration = Duration::from_millis(100);

/// Why the application stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The user quit from the menu.
    Quit,
    /// The initial daemon start failed.
    BootFailed,
    /// A termination signal arrived; it is re-raised after cleanup.
    Signal(Termination),
}

type BootTask = JoinHandle<Result<(), SupervisorError>>;

/// Runs the application until quit, signal, or initial boot failure.
pub async fn run(config: Config) -> anyhow::Result<Exit> {
    let mut signals = Signals::new()?;
    let cancel = CancellationToken::new();

    // -- Tray --
    let mount_setup = config
        .fuse_setup_command
        .as_deref()
        .and_then(CommandMountSetup::from_command_line);
    let login = LoginItem::for_current_user();

    let tray_config = TrayConfig {
        version: env!("CARGO_PKG_VERSION").to_string(),
        theme: config.theme,
        assets_dir: config.assets_dir(),
        drives_dir: Some(config.drives_dir()),
        mount_configured: mount_setup.is_some(),
        launch_on_login: login.as_ref().is_some_and(LoginItem::is_enabled),
        ..TrayConfig::default()
    };
    let (tray, event_tx, update_rx) = TrayHandle::new(tray_config);
    let tray = Arc::new(tray);
    frontend::spawn(update_rx, event_tx);
    tray.render();

    // -- Supervisor --
    let clients = Arc::new(WsClientFactory::new(
        config.daemon_url.clone(),
        config.request_timeout(),
    ));
    let launcher = ProcessLauncher::new(
        LaunchOptions {
            program: config.daemon_program.clone().into(),
            args: config.daemon_args.clone(),
            storage_dir: Some(config.storage_dir()),
            boot_timeout: config.boot_timeout(),
            stop_grace: config.stop_grace(),
        },
        clients.clone(),
    );
    let manager = PidFileManager::new(config.pid_file(), config.stop_grace());

    let supervisor = Arc::new(Supervisor::new(Collaborators {
        clients,
        launcher: Arc::new(launcher),
        manager: Arc::new(manager),
        presenter: tray.clone(),
        notifier: tray.clone(),
        mount_setup: mount_setup.map(|m| Arc::new(m) as Arc<dyn MountSetup>),
    }));

    // Initial start runs alongside the UI loop.
    let mut boot: Option<BootTask> = Some(tokio::spawn({
        let supervisor = supervisor.clone();
        async move { supervisor.start().await }
    }));

    let actions = Actions {
        supervisor: supervisor.clone(),
        notifier: tray.clone(),
        login_display: tray.clone(),
        login,
        drives_dir: config.drives_dir(),
        help_url: config.help_url.clone(),
    };

    show_help_once(&actions).await;

    info!("tray ready");

    // -- Main loop --
    let mut poller: Option<JoinHandle<()>> = None;
    let mut events = tokio::time::interval(EVENT_POLL);
    let exit = loop {
        tokio::select! {
            signal = signals.recv() => {
                info!(?signal, "termination signal received");
                break Exit::Signal(signal);
            }
            result = join_boot(&mut boot), if boot.is_some() => {
                boot = None;
                match result {
                    Ok(()) => {
                        poller = Some(spawn_poller(
                            supervisor.clone(),
                            config.poll_interval(),
                            cancel.clone(),
                        ));
                    }
                    Err(e) => {
                        error!("{e:#}");
                        break Exit::BootFailed;
                    }
                }
            }
            // A signal arriving mid-action is handled once the action's
            // transition completes; transitions are never cancelled.
            _ = events.tick() => {
                if drain_events(&tray, &actions).await == Flow::Quit {
                    info!("quit requested via tray");
                    break Exit::Quit;
                }
            }
        }
    };

    finish(exit, &supervisor, &tray, &cancel, poller).await;
    Ok(exit)
}

/// Teardown after the main loop. On a signal the supervisor is shut down
/// before the tray closes; the caller re-raises the signal afterwards.
async fn finish(
    exit: Exit,
    supervisor: &Supervisor,
    tray: &TrayHandle,
    cancel: &CancellationToken,
    poller: Option<JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(poller) = poller
        && let Err(e) = poller.await
    {
        warn!(error = %e, "poller task failed");
    }
    if let Exit::Signal(signal) = exit {
        info!(?signal, "shutting down daemon supervision");
        supervisor.shutdown().await;
    }
    tray.shutdown();
}

/// Waits for the initial start; pending forever once it has been consumed.
async fn join_boot(boot: &mut Option<BootTask>) -> anyhow::Result<()> {
    match boot {
        Some(task) => Ok(task.await??),
        None => std::future::pending().await,
    }
}

async fn drain_events(tray: &TrayHandle, actions: &Actions) -> Flow {
    while let Some(event) = tray.try_recv_event() {
        match event {
            TrayEvent::Action(action) => {
                if actions.handle(action).await == Flow::Quit {
                    return Flow::Quit;
                }
            }
            TrayEvent::ThemeChanged => tray.render(),
        }
    }
    Flow::Continue
}

/// Opens the usage help on first run and remembers that it did.
async fn show_help_once(actions: &Actions) {
    let path = config::config_dir().join("state.toml");
    let mut state = match State::load_from(&path) {
        Ok(state) => state,
        Err(e) => {
            warn!("failed to read state: {e:#}");
            return;
        }
    };
    if state.help_displayed {
        return;
    }

    actions.show_help().await;
    state.help_displayed = true;
    if let Err(e) = state.save_to(&path) {
        warn!("failed to save state: {e:#}");
    }
}
