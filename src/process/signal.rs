//! Signal dispositions for the interpreter and its children, and the
//! foreground-only mode switch driven by the terminal's suspend key.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use libc::{c_int, sighandler_t, signal, SIGINT, SIGTSTP, SIG_DFL, SIG_ERR, SIG_IGN};
use signal_hook::SigId;
use tracing::debug;

use crate::process::ProcessError;

fn set_disposition(signum: c_int, handler: sighandler_t) -> Result<(), ProcessError> {
    let previous = unsafe { signal(signum, handler) };
    if previous == SIG_ERR {
        return Err(ProcessError::SignalError(format!(
            "cannot change disposition of signal {}: {}",
            signum,
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}

/// Keeps Ctrl-C from ever terminating the interpreter itself.
pub fn ignore_interrupt() -> Result<(), ProcessError> {
    set_disposition(SIGINT, SIG_IGN)
}

/// Runs in a freshly forked child before exec. Only async-signal-safe calls.
///
/// Foreground programs get the default interrupt action back; background ones
/// keep ignoring it. No child reacts to the suspend key.
pub fn prepare_child(foreground: bool) {
    unsafe {
        if foreground {
            signal(SIGINT, SIG_DFL);
        }
        signal(SIGTSTP, SIG_IGN);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    ForegroundOnly,
}

impl Mode {
    fn after_toggles(count: usize) -> Self {
        if count % 2 == 1 {
            Mode::ForegroundOnly
        } else {
            Mode::Normal
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::ForegroundOnly => write!(f, "Entering foreground-only mode (& is now ignored)"),
            Mode::Normal => write!(f, "Exiting foreground-only mode"),
        }
    }
}

/// The suspend handler only bumps a counter; the mode is its parity.
pub struct ModeSwitch {
    toggles: Arc<AtomicUsize>,
    reported: usize,
    sig_id: Option<SigId>,
}

impl Default for ModeSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeSwitch {
    pub fn new() -> Self {
        ModeSwitch {
            toggles: Arc::new(AtomicUsize::new(0)),
            reported: 0,
            sig_id: None,
        }
    }

    /// Routes SIGTSTP to `toggle` for as long as this switch lives.
    pub fn install(&mut self) -> Result<(), ProcessError> {
        if self.sig_id.is_some() {
            return Ok(());
        }

        let toggles = Arc::clone(&self.toggles);
        let id = unsafe {
            signal_hook::low_level::register(SIGTSTP, move || {
                toggles.fetch_add(1, Ordering::SeqCst);
            })
        }
        .map_err(|e| ProcessError::SignalError(e.to_string()))?;

        debug!("suspend handler installed");
        self.sig_id = Some(id);
        Ok(())
    }

    pub fn toggle(&self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }

    pub fn mode(&self) -> Mode {
        Mode::after_toggles(self.toggles.load(Ordering::SeqCst))
    }

    pub fn is_foreground_only(&self) -> bool {
        self.mode() == Mode::ForegroundOnly
    }

    /// Modes entered since the last call, oldest first.
    pub fn drain_transitions(&mut self) -> Vec<Mode> {
        let seen = self.toggles.load(Ordering::SeqCst);
        let transitions = (self.reported + 1..=seen).map(Mode::after_toggles).collect();
        self.reported = seen;
        transitions
    }
}

impl Drop for ModeSwitch {
    fn drop(&mut self) {
        if let Some(id) = self.sig_id.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}
