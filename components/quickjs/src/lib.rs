//! Handle-based binding to the embedded QuickJS interpreter.
//!
//! This crate is the engine boundary of the binding layer. Runtimes, contexts
//! and values are exposed as opaque integer handles, checked before any call
//! reaches the interpreter, and released in owner order.
//!
//! # Overview
//!
//! - [`QuickJs`] - Handle table and every boundary operation
//! - [`RuntimePtr`] / [`ContextPtr`] / [`ValuePtr`] - Handles, with `0` as null
//! - [`EvalFlags`] / [`RuntimeConfig`] - Evaluation flags and runtime limits
//! - [`JsRuntime`] / [`JsContext`] / [`JsValue`] - Scoped handles released on drop
//!
//! # Examples
//!
//! ```
//! use quickjs::{JsRuntime, QuickJs};
//!
//! let js = QuickJs::new();
//! let runtime = JsRuntime::new(&js).unwrap();
//! let context = runtime.context().unwrap();
//!
//! let value = context.evaluate("throw new Error('boom')", "boom.js").unwrap();
//! let thrown = context.exception().unwrap();
//! assert!(thrown.is_error());
//! assert_eq!(thrown.exception(), "Error: boom");
//! # drop(value);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod access;
mod config;
mod engine;
mod exception;
mod handle;
mod pickle;
mod scope;

pub use config::{EvalFlags, RuntimeConfig};
pub use engine::{LiveHandles, QuickJs};
pub use handle::{ContextPtr, RuntimePtr, ValuePtr};
pub use scope::{JsContext, JsRuntime, JsValue};
