//! Error taxonomy of the binding layer.
//!
//! Four kinds of failure cross the binding boundary:
//!
//! - precondition violations (a null or stale handle), which always point at a
//!   lifecycle bug in the caller and surface as [`BindingError::IllegalState`]
//! - data mismatches between an engine value and the requested managed type,
//!   carried by [`JsDataError`]
//! - types no translator factory can handle
//! - JavaScript-level throws, which are ordinary data ([`JsException`]) until a
//!   caller chooses to escalate them

use crate::{JsException, Tag};
use thiserror::Error;

/// The kind of engine handle a pointer refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Interpreter runtime
    Runtime,
    /// Execution context bound to a runtime
    Context,
    /// Value owned by a context
    Value,
}

impl HandleKind {
    /// Name used in error messages, e.g. `JSValue`.
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Runtime => "JSRuntime",
            HandleKind::Context => "JSContext",
            HandleKind::Value => "JSValue",
        }
    }
}

/// A value did not have the shape the requested managed type needs.
///
/// The message always names what was expected and what was observed.
///
/// # Examples
///
/// ```
/// use core_types::{JsDataError, Tag};
///
/// let err = JsDataError::invalid_tag("boolean", Tag::Int);
/// assert_eq!(err.to_string(), "Invalid JSValue tag for boolean: 0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct JsDataError {
    message: String,
}

impl JsDataError {
    /// Creates a data error with a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        JsDataError {
            message: message.into(),
        }
    }

    /// An accessor for `kind` was invoked on a value tagged `tag`.
    pub fn invalid_tag(kind: &str, tag: Tag) -> Self {
        JsDataError::new(format!("Invalid JSValue tag for {}: {}", kind, tag.code()))
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Any failure raised by the binding layer.
#[derive(Debug, Clone, Error)]
pub enum BindingError {
    /// A handle was null, stale, or used with the wrong owner
    #[error("{0}")]
    IllegalState(String),

    /// Engine value and managed type disagree
    #[error(transparent)]
    Data(#[from] JsDataError),

    /// No translator factory accepted the type
    #[error("Unsupported type: {type_name}{}", format_detail(.detail))]
    UnsupportedType {
        /// Name of the requested type
        type_name: String,
        /// Extra context, e.g. a factory returning the wrong translator
        detail: Option<String>,
    },

    /// A type was requested again while its own resolution was in progress
    #[error("Recursive translator resolution for type: {0}")]
    RecursiveType(String),

    /// JavaScript code threw and the caller asked for it to be escalated
    #[error("JavaScript exception: {}", .0.exception())]
    Exception(JsException),

    /// The interpreter itself failed (allocation, runtime creation)
    #[error("Engine error: {0}")]
    Engine(String),
}

impl BindingError {
    /// A required handle of `kind` was the null sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::{BindingError, HandleKind};
    ///
    /// let err = BindingError::null_pointer(HandleKind::Value);
    /// assert_eq!(err.to_string(), "Null JSValue pointer");
    /// ```
    pub fn null_pointer(kind: HandleKind) -> Self {
        BindingError::IllegalState(format!("Null {} pointer", kind.name()))
    }

    /// A non-null handle of `kind` does not refer to a live object.
    pub fn invalid_pointer(kind: HandleKind) -> Self {
        BindingError::IllegalState(format!("Invalid {} pointer", kind.name()))
    }

    /// No factory produced a translator for `type_name`.
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        BindingError::UnsupportedType {
            type_name: type_name.into(),
            detail: None,
        }
    }

    /// Whether this error is a precondition violation.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, BindingError::IllegalState(_))
    }
}

fn format_detail(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(" ({})", detail),
        None => String::new(),
    }
}

/// Result type for binding operations
pub type BindingResult<T> = Result<T, BindingError>;
