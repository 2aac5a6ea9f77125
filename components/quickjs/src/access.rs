//! Tag inspection and typed primitive accessors.
//!
//! Every accessor validates its handles in the same order: context null
//! check (string only), value null check, value lookup, tag check, then
//! extraction. A tag mismatch is a [`JsDataError`] naming the accessor and
//! the observed tag code, e.g. `Invalid JSValue tag for boolean: 0`.

use crate::engine::{Payload, QuickJs};
use crate::handle::{ContextPtr, ValuePtr};
use core_types::{BindingError, BindingResult, JsDataError, Tag};

impl QuickJs {
    /// The runtime tag of a value.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickjs::{QuickJs, ValuePtr};
    ///
    /// let js = QuickJs::new();
    /// let err = js.get_value_tag(ValuePtr::NULL).unwrap_err();
    /// assert_eq!(err.to_string(), "Null JSValue pointer");
    /// ```
    pub fn get_value_tag(&self, value: ValuePtr) -> BindingResult<Tag> {
        let id = value.non_null()?;
        Ok(self.table.borrow().value(id)?.tag)
    }

    /// Reads a boolean value.
    pub fn get_value_boolean(&self, value: ValuePtr) -> BindingResult<bool> {
        self.read_inline(value, "boolean", |payload| match payload {
            Payload::Bool(b) => Some(*b),
            _ => None,
        })
    }

    /// Reads an integer value. Doubles are rejected even when integral.
    pub fn get_value_int(&self, value: ValuePtr) -> BindingResult<i32> {
        self.read_inline(value, "int", |payload| match payload {
            Payload::Int(n) => Some(*n),
            _ => None,
        })
    }

    /// Reads a double value. Integers are rejected.
    pub fn get_value_double(&self, value: ValuePtr) -> BindingResult<f64> {
        self.read_inline(value, "double", |payload| match payload {
            Payload::Float(n) => Some(*n),
            _ => None,
        })
    }

    /// Reads a string value through the context that owns it.
    pub fn get_value_string(&self, context: ContextPtr, value: ValuePtr) -> BindingResult<String> {
        context.non_null()?;
        let id = value.non_null()?;
        let tag = self.table.borrow().value(id)?.tag;
        if tag != Tag::String {
            return Err(JsDataError::invalid_tag("string", tag).into());
        }
        self.check_owner(context, value)?;

        self.with_heap_value(value, |_, engine_value| {
            let string = engine_value
                .as_string()
                .ok_or_else(|| JsDataError::invalid_tag("string", tag))?;
            string.to_string().map_err(crate::engine::engine_error)
        })
    }

    fn read_inline<T>(
        &self,
        value: ValuePtr,
        kind: &str,
        extract: impl FnOnce(&Payload) -> Option<T>,
    ) -> BindingResult<T> {
        let id = value.non_null()?;
        let table = self.table.borrow();
        let entry = table.value(id)?;
        extract(&entry.payload).ok_or_else(|| BindingError::from(JsDataError::invalid_tag(kind, entry.tag)))
    }
}
