//! Command-line arguments

use clap::Parser;

/// Evaluate JavaScript with the embedded QuickJS interpreter
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "qjs-bind", version, about)]
pub struct Cli {
    /// JavaScript file to execute
    #[arg(short, long)]
    pub file: Option<String>,

    /// Inline JavaScript to evaluate
    #[arg(short, long)]
    pub eval: Option<String>,

    /// Start the interactive REPL
    #[arg(short, long)]
    pub repl: bool,

    /// Evaluate as an ES module
    #[arg(short, long)]
    pub module: bool,

    /// Force strict mode
    #[arg(short, long)]
    pub strict: bool,

    /// Heap limit in bytes
    #[arg(long, value_name = "BYTES")]
    pub memory_limit: Option<usize>,

    /// Native stack limit in bytes
    #[arg(long, value_name = "BYTES")]
    pub stack_size: Option<usize>,

    /// JSON file with runtime limits; flags override its fields
    #[arg(short, long, value_name = "JSON")]
    pub config: Option<String>,

    /// Print the value tag next to each result
    #[arg(short = 't', long)]
    pub show_tag: bool,

    /// Log engine activity to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Arguments with every option unset
    pub fn new() -> Self {
        Cli {
            file: None,
            eval: None,
            repl: false,
            module: false,
            strict: false,
            memory_limit: None,
            stack_size: None,
            config: None,
            show_tag: false,
            verbose: false,
        }
    }

    /// Arguments that execute `file`
    pub fn with_file(file: String) -> Self {
        Cli {
            file: Some(file),
            ..Cli::new()
        }
    }

    /// Arguments that start the REPL
    pub fn with_repl() -> Self {
        Cli {
            repl: true,
            ..Cli::new()
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}
