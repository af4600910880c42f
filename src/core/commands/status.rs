use super::{Builtin, CommandError, Flow};
use crate::core::state::ShellState;

#[derive(Clone)]
pub struct StatusCommand;

impl Default for StatusCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Builtin for StatusCommand {
    fn execute(&self, _args: &[String], state: &mut ShellState) -> Result<Flow, CommandError> {
        println!("{}", state.last_status());
        Ok(Flow::Continue)
    }
}
