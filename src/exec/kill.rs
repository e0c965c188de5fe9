// src/exec/kill.rs

//! `wyp kill <pid>`: terminate a process by id, outside of any group.

use tracing::{debug, info};

use crate::errors::Result;

/// Send SIGTERM to `pid`. A pid that no longer exists is not an error.
#[cfg(unix)]
pub fn kill_pid(pid: i32) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => {
            info!(pid, "sent SIGTERM");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            debug!(pid, "process already gone; nothing to kill");
            Ok(())
        }
        Err(errno) => Err(std::io::Error::from(errno).into()),
    }
}

#[cfg(not(unix))]
pub fn kill_pid(pid: i32) -> Result<()> {
    Err(crate::errors::WypError::ConfigError(format!(
        "killing pid {pid} is only supported on unix"
    )))
}
