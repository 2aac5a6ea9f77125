//! Runtime orchestration for JavaScript execution
//!
//! The Runtime owns one interpreter runtime and one context for its whole
//! life, so globals defined by one evaluation are visible to the next.

use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use core_types::{JsException, Tag};
use quickjs::{ContextPtr, EvalFlags, QuickJs, RuntimeConfig, RuntimePtr, ValuePtr};
use std::fmt;

/// File name reported in stack traces for inline source
pub const INLINE_SOURCE: &str = "<input>";

/// What evaluating a piece of source produced
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Completed normally
    Value {
        /// Runtime tag of the completion value
        tag: Tag,
        /// Display form of the completion value
        text: String,
    },
    /// Threw; the thrown value with its stack
    Thrown(JsException),
}

impl Evaluation {
    /// Whether the evaluation threw.
    pub fn is_thrown(&self) -> bool {
        matches!(self, Evaluation::Thrown(_))
    }

    /// The completion value's tag, or [`Tag::Exception`] for a throw.
    pub fn tag(&self) -> Tag {
        match self {
            Evaluation::Value { tag, .. } => *tag,
            Evaluation::Thrown(_) => Tag::Exception,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Value { text, .. } => write!(f, "{}", text),
            Evaluation::Thrown(thrown) => {
                write!(f, "Uncaught {}", thrown.exception())?;
                if let Some(trace) = thrown.stack_trace() {
                    write!(f, "\n{}", trace.trim_end())?;
                }
                Ok(())
            }
        }
    }
}

/// Interpreter runtime plus one context, released on drop
pub struct Runtime {
    engine: QuickJs,
    runtime: RuntimePtr,
    context: ContextPtr,
    flags: EvalFlags,
    show_tag: bool,
}

impl Runtime {
    /// Create a new runtime with the given limits
    ///
    /// # Example
    /// ```
    /// use js_cli::Runtime;
    /// use quickjs::RuntimeConfig;
    ///
    /// let mut runtime = Runtime::new(&RuntimeConfig::default()).unwrap();
    /// let result = runtime.execute_string("1 + 1").unwrap();
    /// assert_eq!(result.to_string(), "2");
    /// ```
    pub fn new(config: &RuntimeConfig) -> CliResult<Self> {
        let engine = QuickJs::new();
        let runtime = engine.create_runtime_with(config)?;
        let context = match engine.create_context(runtime) {
            Ok(context) => context,
            Err(err) => {
                engine.destroy_runtime(runtime)?;
                return Err(err.into());
            }
        };
        Ok(Self {
            engine,
            runtime,
            context,
            flags: EvalFlags::empty(),
            show_tag: false,
        })
    }

    /// Create a runtime configured from command-line arguments
    ///
    /// Limits come from the `--config` JSON file first, then the limit flags
    /// override individual fields.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let mut flags = EvalFlags::empty();
        flags.set(EvalFlags::MODULE, cli.module);
        flags.set(EvalFlags::STRICT, cli.strict);

        Ok(Self::new(&load_config(cli)?)?
            .with_flags(flags)
            .with_show_tag(cli.show_tag))
    }

    /// Set the evaluation flags
    pub fn with_flags(mut self, flags: EvalFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Print the value tag next to each result
    pub fn with_show_tag(mut self, enabled: bool) -> Self {
        self.show_tag = enabled;
        self
    }

    /// Execute a JavaScript file
    ///
    /// Stack traces name the file by `path`.
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read or the engine fails
    pub fn execute_file(&mut self, path: &str) -> CliResult<Evaluation> {
        let source = std::fs::read_to_string(path)?;
        self.execute_named(&source, path)
    }

    /// Execute a JavaScript source string
    ///
    /// A JavaScript throw is an [`Evaluation::Thrown`], not an error.
    pub fn execute_string(&mut self, source: &str) -> CliResult<Evaluation> {
        self.execute_named(source, INLINE_SOURCE)
    }

    /// Execute source, reporting `file_name` in stack traces
    pub fn execute_named(&mut self, source: &str, file_name: &str) -> CliResult<Evaluation> {
        let value = self
            .engine
            .evaluate(self.context, source, file_name, self.flags)?;
        let described = self.describe(value);
        self.engine.destroy_value(self.context, value)?;
        described
    }

    /// Render an evaluation the way the CLI prints it
    pub fn format(&self, evaluation: &Evaluation) -> String {
        if self.show_tag {
            format!("{} ({})", evaluation, evaluation.tag())
        } else {
            evaluation.to_string()
        }
    }

    /// Start the REPL (Read-Eval-Print Loop)
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }

    /// The evaluation flags
    pub fn flags(&self) -> EvalFlags {
        self.flags
    }

    /// Check if tag printing is enabled
    pub fn is_show_tag_enabled(&self) -> bool {
        self.show_tag
    }

    /// Get access to the handle table for direct manipulation
    pub fn engine(&self) -> &QuickJs {
        &self.engine
    }

    /// The context every evaluation runs in
    pub fn context(&self) -> ContextPtr {
        self.context
    }

    fn describe(&self, value: ValuePtr) -> CliResult<Evaluation> {
        let engine = &self.engine;
        let tag = engine.get_value_tag(value)?;
        let text = match tag {
            Tag::Exception => return Ok(Evaluation::Thrown(engine.get_exception(self.context)?)),
            Tag::Bool => engine.get_value_boolean(value)?.to_string(),
            Tag::Int => engine.get_value_int(value)?.to_string(),
            Tag::Float64 => format_double(engine.get_value_double(value)?),
            Tag::String => engine.get_value_string(self.context, value)?,
            Tag::Null | Tag::Undefined => tag.to_string(),
            other => format!("[{}]", other),
        };
        Ok(Evaluation::Value { tag, text })
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        let released = self
            .engine
            .destroy_context(self.context)
            .and_then(|()| self.engine.destroy_runtime(self.runtime));
        if let Err(err) = released {
            log::warn!("failed to release runtime: {}", err);
        }
    }
}

fn load_config(cli: &Cli) -> CliResult<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str::<RuntimeConfig>(&text)
                .map_err(|e| CliError::Config(format!("{}: {}", path, e)))?
        }
        None => RuntimeConfig::default(),
    };
    if let Some(limit) = cli.memory_limit {
        config = config.with_memory_limit(limit);
    }
    if let Some(size) = cli.stack_size {
        config = config.with_max_stack_size(size);
    }
    Ok(config)
}

/// Formats a double the way JavaScript prints numbers
pub fn format_double(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        n.to_string()
    }
}
