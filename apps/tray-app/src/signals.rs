//! Termination signals.
//!
//! The app waits for SIGTERM or SIGINT (Ctrl-C elsewhere), runs its cleanup,
//! then re-raises the same signal with the default disposition so the exit
//! status reports it.

/// Which signal asked the process to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Terminate,
    Interrupt,
}

#[cfg(unix)]
pub struct Signals {
    term: tokio::signal::unix::Signal,
    int: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    /// Installs the handlers. Call from within the runtime.
    pub fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            term: signal(SignalKind::terminate())?,
            int: signal(SignalKind::interrupt())?,
        })
    }

    pub async fn recv(&mut self) -> Termination {
        tokio::select! {
            _ = self.term.recv() => Termination::Terminate,
            _ = self.int.recv() => Termination::Interrupt,
        }
    }
}

#[cfg(not(unix))]
pub struct Signals;

#[cfg(not(unix))]
impl Signals {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self)
    }

    pub async fn recv(&mut self) -> Termination {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Termination::Interrupt,
            Err(e) => {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending().await
            }
        }
    }
}

/// Re-raises `signal` with its default action. Does not return.
#[cfg(unix)]
pub fn reraise(signal: Termination) -> ! {
    use nix::sys::signal::{SigHandler, Signal, raise};

    let sig = match signal {
        Termination::Terminate => Signal::SIGTERM,
        Termination::Interrupt => Signal::SIGINT,
    };

    // SAFETY: SIG_DFL installs no handler code.
    if let Err(e) = unsafe { nix::sys::signal::signal(sig, SigHandler::SigDfl) } {
        tracing::warn!(error = %e, "failed to reset signal disposition");
    }
    if let Err(e) = raise(sig) {
        tracing::warn!(error = %e, "failed to re-raise signal");
    }
    std::process::exit(128 + sig as i32)
}

#[cfg(not(unix))]
pub fn reraise(_signal: Termination) -> ! {
    std::process::exit(130)
}
