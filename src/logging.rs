use tracing_subscriber::EnvFilter;

use crate::config::ShellConfig;
use crate::error::ShellError;

/// Installs the global subscriber. Everything goes to stderr so stdout only
/// carries what the user asked the shell to print.
pub fn init(config: &ShellConfig) -> Result<(), ShellError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| ShellError::Logging(format!("invalid filter {:?}: {}", config.log_filter, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.color)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|e| ShellError::Logging(e.to_string()))
}
