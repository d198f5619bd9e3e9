//! Single-instance guard.
//!
//! The first instance publishes its pid in a lock file. Later instances find a
//! live pid there and exit. A lock left behind by a dead process is replaced.
//!
//! Outside Unix there is no liveness check, so a lock left by a crash has to
//! be removed by hand (or `single_instance` turned off).

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long an unreadable lock is assumed to belong to an instance that is
/// still starting.
const UNREADABLE_GRACE: Duration = Duration::from_secs(5);

/// Errors from acquiring the instance lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("another instance is running (pid {0})")]
    AlreadyRunning(i32),

    #[error("another instance is starting (lock {0} has no pid yet)")]
    Starting(PathBuf),

    #[error("lock file error: {0}")]
    Io(#[from] io::Error),
}

/// Held for the lifetime of the process. Removes the lock file on drop.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    pub fn acquire(path: &Path) -> Result<Self, LockError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // One retry after clearing a stale lock.
        for _ in 0..2 {
            match publish(path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "instance lock acquired");
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => match holder(path)? {
                    Holder::Live(pid) => return Err(LockError::AlreadyRunning(pid)),
                    Holder::Unreadable => return Err(LockError::Starting(path.to_path_buf())),
                    Holder::Stale => {
                        tracing::debug!(path = %path.display(), "removing stale instance lock");
                        match std::fs::remove_file(path) {
                            Ok(()) => {}
                            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                            Err(e) => return Err(e.into()),
                        }
                    }
                },
                Err(e) => return Err(e.into()),
            }
        }

        Err(LockError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "instance lock keeps reappearing",
        )))
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(error = %e, "failed to remove instance lock");
        }
    }
}

/// Writes the pid to a private file, then hard-links it into place.
///
/// The link fails with `AlreadyExists` when the lock is taken, and the lock
/// never exists without its pid.
fn publish(path: &Path) -> io::Result<()> {
    let pid = std::process::id();
    let mut scratch = OsString::from(path.as_os_str());
    scratch.push(format!(".{pid}.tmp"));
    let scratch = PathBuf::from(scratch);

    std::fs::write(&scratch, format!("{pid}\n"))?;
    let linked = std::fs::hard_link(&scratch, path);
    if let Err(e) = std::fs::remove_file(&scratch) {
        tracing::debug!(error = %e, "failed to remove scratch lock file");
    }
    linked
}

/// Who holds an existing lock file.
#[derive(Debug, PartialEq, Eq)]
enum Holder {
    Live(i32),
    /// No pid could be read and the file is recent.
    Unreadable,
    Stale,
}

fn holder(path: &Path) -> io::Result<Holder> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Holder::Stale),
        Err(e) => return Err(e),
    };

    match contents.trim().parse::<i32>() {
        Ok(pid) if pid > 0 => Ok(if is_alive(pid) {
            Holder::Live(pid)
        } else {
            Holder::Stale
        }),
        _ => {
            let age = match std::fs::metadata(path).and_then(|m| m.modified()) {
                Ok(modified) => modified.elapsed().unwrap_or_default(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Holder::Stale),
                Err(e) => return Err(e),
            };
            Ok(if age < UNREADABLE_GRACE {
                Holder::Unreadable
            } else {
                Holder::Stale
            })
        }
    }
}

#[cfg(unix)]
fn is_alive(pid: i32) -> bool {
    hyperdaemon_process::pidfile::is_alive(pid)
}

#[cfg(not(unix))]
fn is_alive(_pid: i32) -> bool {
    true
}
