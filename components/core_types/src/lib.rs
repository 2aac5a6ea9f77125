//! Engine value tags, the exception model, and the binding error taxonomy.
//!
//! This crate provides the engine-independent vocabulary shared by the
//! translator framework and the QuickJS boundary.
//!
//! # Overview
//!
//! - [`Tag`] - Runtime kind of an engine value, with the interpreter's codes
//! - [`JsException`] - A thrown value materialized from a context
//! - [`StackFrame`] - One frame of a thrown Error's call stack
//! - [`BindingError`] - Every failure the binding layer raises
//! - [`JsDataError`] - Mismatch between an engine value and a managed type
//!
//! # Examples
//!
//! ```
//! use core_types::{JsDataError, JsException, Tag};
//!
//! let err = JsDataError::invalid_tag("double", Tag::Int);
//! assert_eq!(err.to_string(), "Invalid JSValue tag for double: 0");
//!
//! let thrown = JsException::value("1");
//! assert!(!thrown.is_error());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod exception;
mod source;
mod tag;

pub use error::{BindingError, BindingResult, HandleKind, JsDataError};
pub use exception::{JsException, NO_EXCEPTION};
pub use source::{parse_stack, StackFrame, ANONYMOUS_FRAME, EVAL_FRAME};
pub use tag::Tag;
