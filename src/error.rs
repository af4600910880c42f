use thiserror::Error;

use crate::core::commands::CommandError;
use crate::input::tokenizer::ParseError;
use crate::process::ProcessError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Command(#[from] CommandError),
    #[error("{0}")]
    Process(#[from] ProcessError),
    #[error("Flag error: {0}")]
    FlagError(String),
    #[error("Logging error: {0}")]
    Logging(String),
}

impl ShellError {
    /// Whether the interpreter can no longer run commands and has to stop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Process(ProcessError::Spawn(_)))
    }
}
