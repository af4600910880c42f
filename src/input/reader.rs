use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

use crate::config::ShellConfig;
use crate::error::ShellError;

pub enum ReadOutcome {
    Line(String),
    Interrupted,
    Eof,
}

pub struct LineReader {
    editor: DefaultEditor,
    quiet: bool,
}

impl LineReader {
    pub fn new(config: &ShellConfig) -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()?;
        editor.set_max_history_size(config.history_size)?;
        editor.set_auto_add_history(false);

        Ok(LineReader {
            editor,
            quiet: config.quiet,
        })
    }

    pub fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        if !self.quiet {
                            warn!("couldn't add to history: {}", e);
                        }
                    }
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }
}
