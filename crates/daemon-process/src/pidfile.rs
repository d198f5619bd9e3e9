//! Pid file and process liveness helpers.

use std::io;
use std::path::Path;

use hyperdaemon_supervisor::DaemonError;

/// Reads a positive pid from `path`.
///
/// A missing, empty, or malformed file means no daemon is recorded as running.
pub fn read_pid(path: &Path) -> Result<i32, DaemonError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DaemonError::NotRunning(format!(
                "no pid file at {}",
                path.display()
            )));
        }
        Err(e) => return Err(DaemonError::Io(e)),
    };

    parse_pid(&contents).ok_or_else(|| {
        DaemonError::NotRunning(format!("invalid pid file at {}", path.display()))
    })
}

fn parse_pid(contents: &str) -> Option<i32> {
    contents.trim().parse::<i32>().ok().filter(|pid| *pid > 0)
}

/// Returns `true` if a process with this pid exists.
#[cfg(unix)]
pub fn is_alive(pid: i32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Signal 0 only checks existence.
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Sends SIGTERM to `pid`.
#[cfg(unix)]
pub fn terminate(pid: i32) -> Result<(), DaemonError> {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid), Signal::SIGTERM).map_err(|e| DaemonError::Io(io::Error::from(e)))
}
