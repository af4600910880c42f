use std::fmt;

use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use thiserror::Error;

pub mod executor;
pub mod reaper;
pub mod signal;

pub use executor::{Launch, Launcher};
pub use reaper::Reaped;
pub use signal::{Mode, ModeSwitch};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("fork failed: {}", .0.desc())]
    Spawn(Errno),
    #[error("wait failed: {}", .0.desc())]
    Wait(Errno),
    #[error("argument contains a NUL byte: {0:?}")]
    InvalidArgument(String),
    #[error("nothing to run")]
    EmptyCommand,
    #[error("signal setup failed: {0}")]
    SignalError(String),
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Exited(i32),
    Signaled(i32),
}

impl Default for ChildStatus {
    fn default() -> Self {
        ChildStatus::Exited(0)
    }
}

impl ChildStatus {
    /// `None` for wait results that are not a termination.
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ChildStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ChildStatus::Signaled(signal as i32)),
            _ => None,
        }
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildStatus::Exited(code) => write!(f, "exit value {}", code),
            ChildStatus::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;
    use nix::unistd::Pid;

    #[test]
    fn test_status_display() {
        assert_eq!(ChildStatus::Exited(1).to_string(), "exit value 1");
        assert_eq!(ChildStatus::Signaled(15).to_string(), "terminated by signal 15");
        assert_eq!(ChildStatus::default().to_string(), "exit value 0");
    }

    #[test]
    fn test_from_wait() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            ChildStatus::from_wait(WaitStatus::Exited(pid, 3)),
            Some(ChildStatus::Exited(3))
        );
        assert_eq!(
            ChildStatus::from_wait(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ChildStatus::Signaled(9))
        );
        assert_eq!(ChildStatus::from_wait(WaitStatus::StillAlive), None);
        assert_eq!(
            ChildStatus::from_wait(WaitStatus::Stopped(pid, Signal::SIGSTOP)),
            None
        );
    }
}
