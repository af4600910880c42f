use std::time::Duration;

use tracing::{debug, info};

use super::environment::expand_command;
use crate::core::commands::{Builtins, Flow};
use crate::core::ShellState;
use crate::error::ShellError;
use crate::input::Command;
use crate::process::{reaper, signal, ChildStatus, Launch, Launcher, ModeSwitch, Reaped};

/// How long background children get to exit after SIGTERM before SIGKILL.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub(crate) trait CommandHandler {
    fn execute_command(&mut self, line: &str) -> Result<Flow, ShellError>;
}

/// Runs one input line at a time: tokenize, substitute, dispatch.
pub struct Interpreter {
    state: ShellState,
    builtins: Builtins,
    launcher: Launcher,
    mode: ModeSwitch,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            state: ShellState::new(),
            builtins: Builtins::new(),
            launcher: Launcher::new(),
            mode: ModeSwitch::new(),
        }
    }

    pub fn install_signal_handlers(&mut self) -> Result<(), ShellError> {
        signal::ignore_interrupt()?;
        self.mode.install()?;
        Ok(())
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn mode(&self) -> &ModeSwitch {
        &self.mode
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let Some(mut command) = Command::parse(line)? else {
            return Ok(Flow::Continue);
        };
        if command.is_empty() {
            debug!("nothing to run in {:?}", line);
            return Ok(Flow::Continue);
        }

        let pid = self.state.pid().to_string();
        expand_command(&mut command, &pid);
        debug!("parsed {:?}", command);

        let name = command.argv[0].as_str();
        if let Some(result) = self.builtins.execute(name, command.args(), &mut self.state) {
            debug!("builtin {}", name);
            return result.map_err(ShellError::from);
        }

        self.launch(&command)
    }

    fn launch(&mut self, command: &Command) -> Result<Flow, ShellError> {
        let foreground_only = self.mode.is_foreground_only();

        match self.launcher.launch(command, foreground_only)? {
            Launch::Foreground { status, .. } => {
                self.state.record_status(status);
                if matches!(status, ChildStatus::Signaled(_)) {
                    println!("{}", status);
                }
                self.report_mode_changes();
            }
            Launch::Background { pid, finished } => {
                println!("background pid is {}", pid);
                match finished {
                    Some(status) => {
                        self.state.record_status(status);
                        println!("{}", Reaped { pid, status });
                    }
                    None => self.state.track(pid),
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Prints one notice per suspend-key toggle seen since the last call.
    pub fn report_mode_changes(&mut self) {
        for mode in self.mode.drain_transitions() {
            info!("mode is now {:?}", mode);
            println!("{}", mode);
        }
    }

    /// Polls for finished children and reports each one.
    pub fn report_finished(&mut self) -> Vec<Reaped> {
        let reaped = reaper::reap_finished();
        for child in &reaped {
            self.state.untrack(child.pid);
            self.state.record_status(child.status);
            println!("{}", child);
        }
        reaped
    }

    /// Stops and collects background children that are still running.
    pub fn shutdown(&mut self) {
        let pending = self.state.take_background();
        if pending.is_empty() {
            return;
        }

        info!("terminating {} background children", pending.len());
        for child in reaper::terminate_all(&pending, SHUTDOWN_GRACE) {
            debug!("{}", child);
        }
    }
}

impl CommandHandler for Interpreter {
    fn execute_command(&mut self, line: &str) -> Result<Flow, ShellError> {
        self.execute_line(line)
    }
}
