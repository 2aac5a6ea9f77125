//! The per-type converter between Rust values and the wire format.

use crate::bits::{BitSink, BitSource, PickleFlag, PICKLE_FLAG_ATTR_NULLABLE};
use core_types::JsDataError;
use std::fmt;
use std::sync::Arc;

type DecodeFn<T> = dyn Fn(&mut BitSource<'_>) -> Result<T, JsDataError> + Send + Sync;
type EncodeFn<T> = dyn Fn(&T, &mut BitSink) -> Result<(), JsDataError> + Send + Sync;

/// Bidirectional converter for one Rust type.
///
/// A translator is immutable: a pickle signature describing the shape the
/// engine side must produce, a nullable flag, and a decode/encode pair. It
/// does not interpret its own signature; the engine side checks it before
/// marshaling.
///
/// # Examples
///
/// ```
/// use translator::{BitSink, BitSource, PickleFlag, Translator};
///
/// let celsius = Translator::new(
///     vec![PickleFlag::Number.as_byte()],
///     |source: &mut BitSource<'_>| source.next_double(),
///     |value: &f64, sink: &mut BitSink| {
///         sink.write_double(*value);
///         Ok(())
///     },
/// );
///
/// let bytes = celsius.encode_to_bytes(&21.5).unwrap();
/// assert_eq!(celsius.decode_bytes(&bytes).unwrap(), 21.5);
/// ```
pub struct Translator<T> {
    type_name: &'static str,
    signature: Box<[u8]>,
    nullable: bool,
    decode: Arc<DecodeFn<T>>,
    encode: Arc<EncodeFn<T>>,
}

impl<T: 'static> Translator<T> {
    /// Builds a translator from a signature and a decode/encode pair.
    pub fn new(
        signature: impl Into<Box<[u8]>>,
        decode: impl Fn(&mut BitSource<'_>) -> Result<T, JsDataError> + Send + Sync + 'static,
        encode: impl Fn(&T, &mut BitSink) -> Result<(), JsDataError> + Send + Sync + 'static,
    ) -> Self {
        Translator {
            type_name: std::any::type_name::<T>(),
            signature: signature.into(),
            nullable: false,
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        }
    }

    /// Reads one value from `source`.
    ///
    /// Consumes exactly the bytes of one value, or nothing on failure.
    pub fn decode(&self, source: &mut BitSource<'_>) -> Result<T, JsDataError> {
        log::trace!("decode {} at offset {}", self.type_name, source.position());
        (self.decode)(source)
    }

    /// Appends the encoding of `value` to `sink`.
    pub fn encode(&self, value: &T, sink: &mut BitSink) -> Result<(), JsDataError> {
        log::trace!("encode {}", self.type_name);
        (self.encode)(value, sink)
    }

    /// Decodes a buffer holding exactly one value.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<T, JsDataError> {
        let mut source = BitSource::new(bytes);
        let value = self.decode(&mut source)?;
        if !source.is_exhausted() {
            return Err(JsDataError::new(format!(
                "Trailing bytes after {}: {} unread",
                self.type_name,
                source.remaining()
            )));
        }
        Ok(value)
    }

    /// Encodes one value into a fresh buffer.
    pub fn encode_to_bytes(&self, value: &T) -> Result<Vec<u8>, JsDataError> {
        let mut sink = BitSink::new();
        self.encode(value, &mut sink)?;
        Ok(sink.into_bytes())
    }

    /// The pickle signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The leading signature flag, if the signature is well formed.
    pub fn flag(&self) -> Option<PickleFlag> {
        self.signature.first().copied().and_then(PickleFlag::from_byte)
    }

    /// Whether this translator accepts null.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Name of the translated type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Wraps this translator so that null decodes to `None`.
    ///
    /// The wrapper shares this translator; it never modifies it.
    pub fn nullable(self: &Arc<Self>) -> Translator<Option<T>> {
        let mut signature = self.signature.to_vec();
        if let Some(first) = signature.first_mut() {
            *first |= PICKLE_FLAG_ATTR_NULLABLE;
        }

        let decode_base = Arc::clone(self);
        let encode_base = Arc::clone(self);
        let mut wrapper = Translator::new(
            signature,
            move |source: &mut BitSource<'_>| {
                if source.peek_tag()? == crate::bits::WireTag::Null {
                    source.next_null()?;
                    Ok(None)
                } else {
                    decode_base.decode(source).map(Some)
                }
            },
            move |value: &Option<T>, sink: &mut BitSink| match value {
                Some(value) => encode_base.encode(value, sink),
                None => {
                    sink.write_null();
                    Ok(())
                }
            },
        );
        wrapper.nullable = true;
        wrapper
    }
}

impl<T> fmt::Debug for Translator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("type_name", &self.type_name)
            .field("signature", &crate::bits::describe_signature(&self.signature))
            .field("nullable", &self.nullable)
            .finish()
    }
}
