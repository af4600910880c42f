use std::env;
use std::path::{Path, PathBuf};

use nix::unistd::{getpid, Pid};

use crate::process::ChildStatus;

/// Interpreter-wide state owned by the control loop.
///
/// The foreground-only flag is not here: it belongs to the signal side and
/// lives in [`crate::process::ModeSwitch`].
#[derive(Debug)]
pub struct ShellState {
    pid: Pid,
    last_status: ChildStatus,
    current_dir: PathBuf,
    background: Vec<Pid>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        ShellState {
            pid: getpid(),
            last_status: ChildStatus::default(),
            current_dir: env::current_dir().unwrap_or_default(),
            background: Vec::new(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn last_status(&self) -> ChildStatus {
        self.last_status
    }

    pub fn record_status(&mut self, status: ChildStatus) {
        self.last_status = status;
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn set_current_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
    }

    /// Remembers a background child until it is reaped.
    pub fn track(&mut self, pid: Pid) {
        self.background.push(pid);
    }

    pub fn untrack(&mut self, pid: Pid) {
        self.background.retain(|&p| p != pid);
    }

    pub fn background(&self) -> &[Pid] {
        &self.background
    }

    pub fn take_background(&mut self) -> Vec<Pid> {
        std::mem::take(&mut self.background)
    }
}
