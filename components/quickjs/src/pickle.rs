//! Engine-side marshaling between engine values and the wire format.
//!
//! [`QuickJs::pickle_value`] checks a value against the first flag of a
//! translator's pickle signature and writes its wire encoding;
//! [`QuickJs::create_value`] reads one wire value back into a new engine
//! value. Both use the byte layout documented in [`translator::bits`].

use crate::engine::{engine_error, Payload, QuickJs};
use crate::handle::{ContextPtr, ValuePtr};
use core_types::{BindingResult, JsDataError, Tag};
use rquickjs::Persistent;
use translator::{is_nullable_flag, BitSink, BitSource, Number, PickleFlag, WireTag};

impl QuickJs {
    /// Encodes a value for a translator with the given pickle signature.
    ///
    /// Null and undefined satisfy a NULL flag or any flag carrying the
    /// nullable attribute. OBJECT and ARRAY flags have no wire encoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use quickjs::{EvalFlags, QuickJs};
    /// use translator::{BitSource, PickleFlag};
    ///
    /// let js = QuickJs::new();
    /// let runtime = js.create_runtime().unwrap();
    /// let context = js.create_context(runtime).unwrap();
    /// let value = js.evaluate(context, "'hi'", "s.js", EvalFlags::empty()).unwrap();
    ///
    /// let bytes = js
    ///     .pickle_value(context, value, &[PickleFlag::String.as_byte()])
    ///     .unwrap();
    /// assert_eq!(BitSource::new(&bytes).next_string().unwrap(), "hi");
    ///
    /// js.destroy_runtime(runtime).unwrap();
    /// ```
    pub fn pickle_value(&self, context: ContextPtr, value: ValuePtr, signature: &[u8]) -> BindingResult<Vec<u8>> {
        context.non_null()?;
        let id = value.non_null()?;
        let &first = signature
            .first()
            .ok_or_else(|| JsDataError::new("Empty pickle signature"))?;
        let flag = PickleFlag::from_byte(first)
            .ok_or_else(|| JsDataError::new(format!("Unknown pickle flag: {:#04x}", first)))?;

        let tag = self.table.borrow().value(id)?.tag;
        self.check_owner(context, value)?;

        let mut sink = BitSink::new();
        if tag.is_nullish() && (flag == PickleFlag::Null || is_nullable_flag(first)) {
            sink.write_null();
            return Ok(sink.into_bytes());
        }

        match (flag, tag) {
            (PickleFlag::Boolean, Tag::Bool) => sink.write_boolean(self.get_value_boolean(value)?),
            (PickleFlag::Number, Tag::Int) => sink.write_int(self.get_value_int(value)?),
            (PickleFlag::Number, Tag::Float64) => sink.write_double(self.get_value_double(value)?),
            (PickleFlag::String, Tag::String) => sink.write_string(&self.get_value_string(context, value)?)?,
            (PickleFlag::Object | PickleFlag::Array, _) => {
                return Err(JsDataError::new(format!("No wire encoding for pickle flag {}", flag.name())).into());
            }
            _ => {
                let kind = flag.name().to_ascii_lowercase();
                return Err(JsDataError::invalid_tag(&kind, tag).into());
            }
        }
        log::trace!("pickled {} as {} byte(s)", value, sink.len());
        Ok(sink.into_bytes())
    }

    /// Decodes exactly one wire value into a new value owned by `context`.
    pub fn create_value(&self, context: ContextPtr, bytes: &[u8]) -> BindingResult<ValuePtr> {
        let engine_context = self.engine_context(context)?;
        let mut source = BitSource::new(bytes);

        let (tag, payload) = match source.peek_tag()? {
            WireTag::Null => {
                source.next_null()?;
                (Tag::Null, Payload::Empty)
            }
            WireTag::Boolean => (Tag::Bool, Payload::Bool(source.next_boolean()?)),
            WireTag::Int | WireTag::Double => match source.next_number()? {
                Number::Int(n) => (Tag::Int, Payload::Int(n)),
                Number::Double(n) => (Tag::Float64, Payload::Float(n)),
            },
            WireTag::String => {
                let text = source.next_string()?;
                let saved = engine_context.with(|ctx| -> BindingResult<_> {
                    let string = rquickjs::String::from_str(ctx.clone(), &text).map_err(engine_error)?;
                    Ok(Persistent::save(&ctx, string.into_value()))
                })?;
                (Tag::String, Payload::Heap(saved))
            }
        };

        if !source.is_exhausted() {
            return Err(JsDataError::new(format!(
                "Trailing bytes after pickled value: {} unread",
                source.remaining()
            ))
            .into());
        }
        self.issue_value(context, tag, payload)
    }
}
