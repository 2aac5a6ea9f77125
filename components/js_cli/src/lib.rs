//! Command-line front end for the QuickJS binding
//!
//! Provides the Runtime struct and supporting modules for the `qjs-bind`
//! binary: evaluate a file, an inline expression, or run a REPL, printing
//! each completion value or the uncaught exception with its stack.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod logger;
pub mod repl;
pub mod runtime;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use runtime::{Evaluation, Runtime};
