//! Stack frames reported by the engine for thrown Error objects.
//!
//! The interpreter hands out stack traces as text, one frame per line. This
//! module parses that text into [`StackFrame`]s and renders frames back in the
//! canonical `    at <name> (<file>[:<line>])` form. Column numbers, when the
//! engine reports them, are dropped.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static FRAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*at\s+(.+?)\s+\((.*)\)\s*$").expect("valid frame regex"));

static LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?):(\d+)(?::\d+)?$").expect("valid location regex"));

/// Function name the engine uses for top-level evaluated code.
pub const EVAL_FRAME: &str = "<eval>";

/// Function name the engine uses for anonymous functions.
pub const ANONYMOUS_FRAME: &str = "<anonymous>";

/// A single frame in a JavaScript call stack.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame::new("f1", "source.js", Some(3));
/// assert_eq!(frame.to_string(), "    at f1 (source.js:3)");
///
/// let top = StackFrame::new("<eval>", "source.js", None);
/// assert_eq!(top.to_string(), "    at <eval> (source.js)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Function name, `<anonymous>` or `<eval>`
    pub function_name: String,
    /// Source file the function was defined in
    pub file_name: String,
    /// Line number, when the engine knows it
    pub line: Option<u32>,
}

impl StackFrame {
    /// Create a new stack frame
    pub fn new(function_name: impl Into<String>, file_name: impl Into<String>, line: Option<u32>) -> Self {
        StackFrame {
            function_name: function_name.into(),
            file_name: file_name.into(),
            line,
        }
    }

    /// Whether this frame is top-level evaluated code.
    pub fn is_eval(&self) -> bool {
        self.function_name == EVAL_FRAME
    }

    /// Whether this frame belongs to an anonymous function.
    pub fn is_anonymous(&self) -> bool {
        self.function_name == ANONYMOUS_FRAME
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "    at {} ({}:{})", self.function_name, self.file_name, line),
            None => write!(f, "    at {} ({})", self.function_name, self.file_name),
        }
    }
}

/// Parses engine stack text into frames, innermost first.
///
/// Lines that are not of the form `at <name> (<location>)` are skipped.
///
/// # Examples
///
/// ```
/// use core_types::parse_stack;
///
/// let frames = parse_stack("    at f1 (source.js:3:15)\n    at <eval> (source.js:5)\n");
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[0].function_name, "f1");
/// assert_eq!(frames[0].line, Some(3));
/// assert_eq!(frames[1].to_string(), "    at <eval> (source.js:5)");
/// ```
pub fn parse_stack(text: &str) -> Vec<StackFrame> {
    text.lines().filter_map(parse_frame).collect()
}

fn parse_frame(line: &str) -> Option<StackFrame> {
    let caps = FRAME_LINE.captures(line)?;
    let function_name = caps[1].to_string();
    let location = &caps[2];

    let frame = match LOCATION.captures(location) {
        Some(loc) => StackFrame {
            function_name,
            file_name: loc[1].to_string(),
            line: loc[2].parse().ok(),
        },
        None => StackFrame {
            function_name,
            file_name: location.to_string(),
            line: None,
        },
    };
    Some(frame)
}
