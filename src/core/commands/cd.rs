use std::env;
use std::path::PathBuf;

use tracing::debug;

use super::{Builtin, CommandError, Flow};
use crate::core::state::ShellState;

const HOME_MARKER: char = '~';

#[derive(Clone)]
pub struct CdCommand;

impl Default for CdCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdCommand {
    pub fn new() -> Self {
        Self
    }

    fn home_dir() -> Option<PathBuf> {
        env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }

    /// No argument, or one mentioning `~`, means home. Extra arguments are ignored.
    fn resolve_target(args: &[String], home: Option<PathBuf>) -> Result<PathBuf, CommandError> {
        match args.first() {
            Some(arg) if !arg.contains(HOME_MARKER) => Ok(PathBuf::from(arg)),
            _ => home.ok_or(CommandError::HomeDirNotFound),
        }
    }
}

impl Builtin for CdCommand {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<Flow, CommandError> {
        let target = Self::resolve_target(args, Self::home_dir())?;

        env::set_current_dir(&target).map_err(|source| CommandError::ChangeDirectory {
            path: target.clone(),
            source,
        })?;

        let current = env::current_dir().unwrap_or_else(|_| state.current_dir().join(&target));
        debug!("cd: now in {}", current.display());
        state.set_current_dir(current);
        Ok(Flow::Continue)
    }
}
