//! Scoped handles that release themselves.
//!
//! [`JsRuntime`], [`JsContext`] and [`JsValue`] each own one handle and
//! destroy it when dropped. A context borrows its runtime and a value borrows
//! its context, so the borrow checker enforces the release order the
//! interpreter requires: values, then contexts, then runtimes.

use crate::config::{EvalFlags, RuntimeConfig};
use crate::engine::QuickJs;
use crate::handle::{ContextPtr, RuntimePtr, ValuePtr};
use core_types::{BindingError, BindingResult, JsException, Tag};
use std::fmt;
use translator::Depot;

/// An owned interpreter runtime.
///
/// # Examples
///
/// ```
/// use quickjs::{JsRuntime, QuickJs};
///
/// let js = QuickJs::new();
/// let runtime = JsRuntime::new(&js).unwrap();
/// let context = runtime.context().unwrap();
/// let value = context.evaluate("'a' + 'b'", "concat.js").unwrap();
/// assert_eq!(value.as_string().unwrap(), "ab");
/// ```
pub struct JsRuntime<'q> {
    engine: &'q QuickJs,
    ptr: RuntimePtr,
}

impl<'q> JsRuntime<'q> {
    /// Creates a runtime with interpreter defaults.
    pub fn new(engine: &'q QuickJs) -> BindingResult<Self> {
        Self::with_config(engine, &RuntimeConfig::default())
    }

    /// Creates a runtime with the given limits.
    pub fn with_config(engine: &'q QuickJs, config: &RuntimeConfig) -> BindingResult<Self> {
        let ptr = engine.create_runtime_with(config)?;
        Ok(JsRuntime { engine, ptr })
    }

    /// Creates a context on this runtime.
    pub fn context(&self) -> BindingResult<JsContext<'_>> {
        let ptr = self.engine.create_context(self.ptr)?;
        Ok(JsContext {
            runtime: self,
            ptr,
            flags: EvalFlags::empty(),
        })
    }

    /// The underlying handle.
    pub fn as_ptr(&self) -> RuntimePtr {
        self.ptr
    }

    /// The handle table this runtime lives in.
    pub fn engine(&self) -> &'q QuickJs {
        self.engine
    }
}

impl Drop for JsRuntime<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.engine.destroy_runtime(self.ptr) {
            log::warn!("failed to destroy {}: {}", self.ptr, err);
        }
    }
}

impl fmt::Debug for JsRuntime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsRuntime").field(&self.ptr).finish()
    }
}

/// An owned execution context.
pub struct JsContext<'r> {
    runtime: &'r JsRuntime<'r>,
    ptr: ContextPtr,
    flags: EvalFlags,
}

impl<'r> JsContext<'r> {
    /// Sets the flags used by [`JsContext::evaluate`].
    pub fn with_flags(mut self, flags: EvalFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Evaluates `source` with this context's flags.
    ///
    /// A throw yields a value tagged [`Tag::Exception`]; read the thrown
    /// value with [`JsContext::exception`].
    pub fn evaluate(&self, source: &str, file_name: &str) -> BindingResult<JsValue<'_>> {
        self.evaluate_with(source, file_name, self.flags)
    }

    /// Evaluates `source` with explicit flags.
    pub fn evaluate_with(&self, source: &str, file_name: &str, flags: EvalFlags) -> BindingResult<JsValue<'_>> {
        let ptr = self.engine().evaluate(self.ptr, source, file_name, flags)?;
        Ok(JsValue { context: self, ptr })
    }

    /// Evaluates `source` and translates its completion value to `T`.
    ///
    /// Unlike [`JsContext::evaluate`], a throw is escalated as
    /// [`BindingError::Exception`].
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::BindingError;
    /// use quickjs::{JsRuntime, QuickJs};
    /// use translator::Depot;
    ///
    /// let js = QuickJs::new();
    /// let depot = Depot::new();
    /// let runtime = JsRuntime::new(&js).unwrap();
    /// let context = runtime.context().unwrap();
    ///
    /// let sum: Option<i32> = context.evaluate_as(&depot, "1 + 2", "sum.js").unwrap();
    /// assert_eq!(sum, Some(3));
    ///
    /// let err = context.evaluate_as::<i32>(&depot, "throw 1", "throw.js").unwrap_err();
    /// assert!(matches!(err, BindingError::Exception(_)));
    /// ```
    pub fn evaluate_as<T: 'static>(&self, depot: &Depot, source: &str, file_name: &str) -> BindingResult<T> {
        let value = self.evaluate(source, file_name)?;
        if value.tag()? == Tag::Exception {
            return Err(BindingError::Exception(self.exception()?));
        }
        value.get::<T>(depot)
    }

    /// Translates `value` into a new engine value owned by this context.
    pub fn to_js<T: 'static>(&self, depot: &Depot, value: &T) -> BindingResult<JsValue<'_>> {
        let translator = depot.resolve::<T>()?;
        let bytes = translator.encode_to_bytes(value)?;
        let ptr = self.engine().create_value(self.ptr, &bytes)?;
        Ok(JsValue { context: self, ptr })
    }

    /// Takes the pending exception, or [`JsException::none`].
    pub fn exception(&self) -> BindingResult<JsException> {
        self.engine().get_exception(self.ptr)
    }

    /// The underlying handle.
    pub fn as_ptr(&self) -> ContextPtr {
        self.ptr
    }

    /// The flags used by [`JsContext::evaluate`].
    pub fn flags(&self) -> EvalFlags {
        self.flags
    }

    fn engine(&self) -> &QuickJs {
        self.runtime.engine
    }
}

impl Drop for JsContext<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.engine().destroy_context(self.ptr) {
            log::warn!("failed to destroy {}: {}", self.ptr, err);
        }
    }
}

impl fmt::Debug for JsContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsContext")
            .field("ptr", &self.ptr)
            .field("flags", &self.flags)
            .finish()
    }
}

/// An owned engine value.
pub struct JsValue<'c> {
    context: &'c JsContext<'c>,
    ptr: ValuePtr,
}

impl JsValue<'_> {
    /// The value's runtime tag.
    pub fn tag(&self) -> BindingResult<Tag> {
        self.engine().get_value_tag(self.ptr)
    }

    /// Reads a boolean.
    pub fn as_bool(&self) -> BindingResult<bool> {
        self.engine().get_value_boolean(self.ptr)
    }

    /// Reads an integer.
    pub fn as_int(&self) -> BindingResult<i32> {
        self.engine().get_value_int(self.ptr)
    }

    /// Reads a double.
    pub fn as_double(&self) -> BindingResult<f64> {
        self.engine().get_value_double(self.ptr)
    }

    /// Reads a string.
    pub fn as_string(&self) -> BindingResult<String> {
        self.engine().get_value_string(self.context.ptr, self.ptr)
    }

    /// Translates this value to `T` through the depot.
    pub fn get<T: 'static>(&self, depot: &Depot) -> BindingResult<T> {
        let translator = depot.resolve::<T>()?;
        let bytes = self
            .engine()
            .pickle_value(self.context.ptr, self.ptr, translator.signature())?;
        Ok(translator.decode_bytes(&bytes)?)
    }

    /// The underlying handle.
    pub fn as_ptr(&self) -> ValuePtr {
        self.ptr
    }

    fn engine(&self) -> &QuickJs {
        self.context.engine()
    }
}

impl Drop for JsValue<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.engine().destroy_value(self.context.ptr, self.ptr) {
            log::warn!("failed to destroy {}: {}", self.ptr, err);
        }
    }
}

impl fmt::Debug for JsValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsValue")
            .field("ptr", &self.ptr)
            .field("tag", &self.tag().ok())
            .finish()
    }
}
