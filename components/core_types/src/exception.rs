//! The exception model.
//!
//! A [`JsException`] is a snapshot of whatever value was pending on a context
//! when it was inspected. It is never cached by the binding layer and goes
//! stale as soon as the context evaluates more code.

use crate::StackFrame;
use std::fmt;

/// Text reported when no exception was pending.
pub const NO_EXCEPTION: &str = "null";

/// A thrown JavaScript value, materialized from a context's exception slot.
///
/// Thrown `Error` objects carry a parsed stack; any other thrown value (say,
/// `throw 1`) never has one.
///
/// # Examples
///
/// ```
/// use core_types::{JsException, StackFrame};
///
/// let thrown = JsException::value("1");
/// assert!(!thrown.is_error());
/// assert_eq!(thrown.exception(), "1");
/// assert!(thrown.stack().is_none());
///
/// let error = JsException::error("Error", vec![StackFrame::new("<eval>", "source.js", None)]);
/// assert!(error.is_error());
/// assert_eq!(error.stack_trace().as_deref(), Some("    at <eval> (source.js)\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsException {
    is_error: bool,
    exception: String,
    stack: Option<Vec<StackFrame>>,
    pending: bool,
}

impl JsException {
    /// A thrown Error-like object with its display text and stack.
    pub fn error(exception: impl Into<String>, stack: Vec<StackFrame>) -> Self {
        JsException {
            is_error: true,
            exception: exception.into(),
            stack: Some(stack),
            pending: true,
        }
    }

    /// A thrown non-Error value, identified by its string form.
    pub fn value(exception: impl Into<String>) -> Self {
        JsException {
            is_error: false,
            exception: exception.into(),
            stack: None,
            pending: true,
        }
    }

    /// The snapshot taken when no exception was pending.
    pub fn none() -> Self {
        JsException {
            pending: false,
            ..JsException::value(NO_EXCEPTION)
        }
    }

    /// Whether an exception was actually pending when this snapshot was taken.
    ///
    /// Tells [`JsException::none`] apart from a thrown `null`, which has the
    /// same string form.
    pub fn was_pending(&self) -> bool {
        self.pending
    }

    /// Whether the thrown value is an Error-like object.
    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// String form of the thrown value, or `"null"` when nothing was pending.
    pub fn exception(&self) -> &str {
        &self.exception
    }

    /// Stack frames, innermost first. Absent for non-Error throws.
    pub fn stack(&self) -> Option<&[StackFrame]> {
        self.stack.as_deref()
    }

    /// The stack rendered one frame per line, each line ending in `\n`.
    pub fn stack_trace(&self) -> Option<String> {
        self.stack.as_ref().map(|frames| {
            frames.iter().fold(String::new(), |mut out, frame| {
                out.push_str(&frame.to_string());
                out.push('\n');
                out
            })
        })
    }
}

impl fmt::Display for JsException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.exception)?;
        if let Some(trace) = self.stack_trace() {
            write!(f, "\n{}", trace.trim_end_matches('\n'))?;
        }
        Ok(())
    }
}
