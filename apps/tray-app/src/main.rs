//! Hyper Daemon tray controller entry point.

mod actions;
mod app;
mod config;
#[cfg(test)]
mod fakes;
mod frontend;
mod instance;
mod login;
mod shell;
mod signals;
mod store;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::app::Exit;
use crate::instance::{InstanceLock, LockError};

fn main() -> anyhow::Result<ExitCode> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting Hyper Daemon");

    // Load configuration.
    let config = config::Config::load()?;
    tracing::info!(daemon_url = %config.daemon_url, "configuration loaded");

    let lock = if config.single_instance {
        let lock_path = config::config_dir().join("instance.lock");
        match InstanceLock::acquire(&lock_path) {
            Ok(lock) => Some(lock),
            Err(LockError::AlreadyRunning(pid)) => {
                tracing::info!(
                    pid,
                    lock = %lock_path.display(),
                    "another instance is already running, exiting"
                );
                return Ok(ExitCode::SUCCESS);
            }
            Err(e @ LockError::Starting(_)) => {
                tracing::info!("{e}, exiting");
                return Ok(ExitCode::SUCCESS);
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    let exit = rt.block_on(app::run(config));
    drop(rt);

    match exit {
        Ok(Exit::Quit) => {
            tracing::info!("shut down cleanly");
            Ok(ExitCode::SUCCESS)
        }
        Ok(Exit::BootFailed) => Ok(ExitCode::FAILURE),
        Ok(Exit::Signal(signal)) => {
            drop(lock);
            signals::reraise(signal)
        }
        Err(e) => {
            tracing::error!("fatal error: {e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}
