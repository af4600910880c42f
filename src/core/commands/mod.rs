use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

mod cd;
mod exit;
mod status;

pub use cd::CdCommand;
pub use exit::ExitCommand;
pub use status::StatusCommand;

use super::state::ShellState;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cd: home directory not found")]
    HomeDirNotFound,
    #[error("cd: {}: {source}", .path.display())]
    ChangeDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the control loop does after a builtin returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub trait Builtin {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<Flow, CommandError>;
}

#[derive(Clone)]
enum BuiltinKind {
    Cd(CdCommand),
    Status(StatusCommand),
    Exit(ExitCommand),
}

impl Builtin for BuiltinKind {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<Flow, CommandError> {
        match self {
            BuiltinKind::Cd(cmd) => cmd.execute(args, state),
            BuiltinKind::Status(cmd) => cmd.execute(args, state),
            BuiltinKind::Exit(cmd) => cmd.execute(args, state),
        }
    }
}

/// Built-in commands, looked up by exact name.
#[derive(Clone)]
pub struct Builtins {
    commands: BTreeMap<&'static str, BuiltinKind>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd", BuiltinKind::Cd(CdCommand::new()));
        commands.insert("status", BuiltinKind::Status(StatusCommand::new()));
        commands.insert("exit", BuiltinKind::Exit(ExitCommand::new()));
        Self { commands }
    }

    /// `None` when `name` is not a builtin and has to be launched.
    pub fn execute(
        &self,
        name: &str,
        args: &[String],
        state: &mut ShellState,
    ) -> Option<Result<Flow, CommandError>> {
        self.commands
            .get(name)
            .map(|command| command.execute(args, state))
    }
}
