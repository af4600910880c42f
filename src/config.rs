use std::env;
use std::io::IsTerminal;

use crate::flags::Flags;

pub const PROMPT: &str = ": ";
pub const LOG_ENV: &str = "SMALLSH_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";
const DEBUG_LOG_FILTER: &str = "smallsh=debug";
const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Start-up settings resolved from the command line and the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub quiet: bool,
    pub color: bool,
    pub log_filter: String,
    pub history_size: usize,
}

impl ShellConfig {
    pub fn from_flags(flags: &Flags) -> Self {
        Self::resolve(
            flags,
            env::var(LOG_ENV).ok(),
            env::var_os("NO_COLOR").is_some(),
            std::io::stderr().is_terminal(),
        )
    }

    fn resolve(
        flags: &Flags,
        log_env: Option<String>,
        no_color: bool,
        stderr_is_tty: bool,
    ) -> Self {
        let log_filter = if flags.is_set("debug") {
            DEBUG_LOG_FILTER.to_string()
        } else {
            log_env
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
        };

        ShellConfig {
            quiet: flags.is_set("quiet"),
            color: stderr_is_tty && !no_color,
            log_filter,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}
