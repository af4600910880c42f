pub mod reader;
pub mod tokenizer;

pub use reader::{LineReader, ReadOutcome};
pub use tokenizer::{Command, ParseError};
