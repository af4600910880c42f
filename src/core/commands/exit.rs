use super::{Builtin, CommandError, Flow};
use crate::core::state::ShellState;

/// Hands control back to the loop, which cleans up background children
/// before the process exits with status 0.
#[derive(Clone)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Builtin for ExitCommand {
    fn execute(&self, _args: &[String], _state: &mut ShellState) -> Result<Flow, CommandError> {
        Ok(Flow::Exit)
    }
}
