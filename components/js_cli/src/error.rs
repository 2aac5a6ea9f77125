//! Error types for the CLI

use core_types::BindingError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// The binding layer rejected an operation
    #[error("Engine error: {0}")]
    Binding(#[from] BindingError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// The runtime configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
