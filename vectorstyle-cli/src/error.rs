//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use vectorstyle::config::ConfigError;
use vectorstyle::loader::LoadError;
use vectorstyle::logging::LoggingError;
use vectorstyle::render::RenderError;

/// Errors surfaced to the user. Every variant exits with status 1.
#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Load(LoadError),
    Render(RenderError),
    /// The tile file could not be read or parsed.
    Tile { path: PathBuf, reason: String },
    /// Invalid combination of command-line arguments.
    InvalidArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Load(e) => write!(f, "Load error: {}", e),
            CliError::Render(e) => write!(f, "Render error: {}", e),
            CliError::Tile { path, reason } => {
                write!(f, "Cannot read tile {}: {}", path.display(), reason)
            }
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        CliError::Load(e)
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Render(e)
    }
}

impl CliError {
    /// Print the error and exit with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(1);
    }
}
