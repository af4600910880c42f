use tracing::{debug, error};

pub mod environment;
mod executor;

pub use executor::Interpreter;

use crate::{
    config::{ShellConfig, PROMPT},
    core::commands::Flow,
    error::ShellError,
    highlight::Highlighter,
    input::{LineReader, ReadOutcome},
};

use executor::CommandHandler;

pub struct Shell {
    reader: LineReader,
    interpreter: Interpreter,
    highlighter: Highlighter,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Result<Self, ShellError> {
        let reader = LineReader::new(&config)?;

        let mut interpreter = Interpreter::new();
        interpreter.install_signal_handlers()?;

        Ok(Shell {
            reader,
            interpreter,
            highlighter: Highlighter::new(config.color),
        })
    }

    /// Runs until `exit`, end of input, or a fatal error. Background children
    /// still running at that point are terminated and collected.
    pub fn run(&mut self) -> Result<(), ShellError> {
        let result = self.run_loop();
        self.interpreter.shutdown();
        result
    }

    fn run_loop(&mut self) -> Result<(), ShellError> {
        loop {
            self.interpreter.report_mode_changes();
            self.interpreter.report_finished();

            match self.reader.read_line(PROMPT)? {
                ReadOutcome::Line(line) => match self.interpreter.execute_command(&line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => {
                        debug!("exit requested");
                        return Ok(());
                    }
                    Err(e) if e.is_fatal() => {
                        error!("{}", e);
                        return Err(e);
                    }
                    Err(e) => self.report(&e),
                },
                ReadOutcome::Interrupted => println!(),
                ReadOutcome::Eof => {
                    debug!("end of input");
                    return Ok(());
                }
            }
        }
    }

    fn report(&self, e: &ShellError) {
        eprintln!("{}", self.highlighter.highlight_error(&format!("smallsh: {}", e)));
    }
}
