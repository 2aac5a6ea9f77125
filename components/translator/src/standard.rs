//! Built-in translators for primitives, strings, and their nullable forms.
//!
//! | Rust type | Signature flag | Nullable form |
//! |---|---|---|
//! | `()` | NULL | `Option<()>` |
//! | `bool` | BOOLEAN | `Option<bool>` |
//! | `i8`, `i16`, `i32`, `i64` | NUMBER | `Option<_>` |
//! | `char` | STRING | `Option<char>` |
//! | `f32`, `f64` | NUMBER | `Option<_>` |
//! | `String` | STRING | `Option<String>` |
//!
//! The primitive translators are process-wide singletons; the nullable forms
//! wrap them without copying. An `i64` beyond ±2^53 has no exact number form
//! and fails to encode.

use crate::bits::{BitSink, BitSource, PickleFlag};
use crate::depot::{Depot, ErasedTranslator, Factory, TypeDescriptor};
use crate::Translator;
use core_types::{BindingResult, JsDataError};
use std::sync::{Arc, LazyLock};

type Shared<T> = LazyLock<Arc<Translator<T>>>;

/// Every `i64` up to this magnitude converts to `f64` exactly.
const MAX_EXACT_LONG: u64 = 1 << 53;

fn primitive<T: 'static>(
    flag: PickleFlag,
    decode: fn(&mut BitSource<'_>) -> Result<T, JsDataError>,
    encode: fn(&T, &mut BitSink) -> Result<(), JsDataError>,
) -> Arc<Translator<T>> {
    Arc::new(Translator::new(vec![flag.as_byte()], decode, encode))
}

static VOID: Shared<()> = LazyLock::new(|| {
    primitive(PickleFlag::Null, |source| source.next_null(), |_, sink| {
        sink.write_null();
        Ok(())
    })
});

static BOOLEAN: Shared<bool> = LazyLock::new(|| {
    primitive(PickleFlag::Boolean, |source| source.next_boolean(), |value, sink| {
        sink.write_boolean(*value);
        Ok(())
    })
});

static BYTE: Shared<i8> = LazyLock::new(|| {
    primitive(PickleFlag::Number, |source| source.next_byte(), |value, sink| {
        sink.write_int(i32::from(*value));
        Ok(())
    })
});

static CHAR: Shared<char> = LazyLock::new(|| {
    primitive(PickleFlag::String, |source| source.next_char(), |value, sink| {
        let mut buf = [0u8; 4];
        sink.write_string(value.encode_utf8(&mut buf))
    })
});

static SHORT: Shared<i16> = LazyLock::new(|| {
    primitive(PickleFlag::Number, |source| source.next_short(), |value, sink| {
        sink.write_int(i32::from(*value));
        Ok(())
    })
});

static INT: Shared<i32> = LazyLock::new(|| {
    primitive(PickleFlag::Number, |source| source.next_int(), |value, sink| {
        sink.write_int(*value);
        Ok(())
    })
});

static LONG: Shared<i64> = LazyLock::new(|| {
    primitive(PickleFlag::Number, |source| source.next_long(), |value, sink| {
        match i32::try_from(*value) {
            Ok(n) => sink.write_int(n),
            Err(_) if value.unsigned_abs() <= MAX_EXACT_LONG => sink.write_double(*value as f64),
            Err(_) => {
                return Err(JsDataError::new(format!(
                    "Long not exactly representable as a number: {}",
                    value
                )))
            }
        }
        Ok(())
    })
});

static FLOAT: Shared<f32> = LazyLock::new(|| {
    primitive(PickleFlag::Number, |source| source.next_float(), |value, sink| {
        sink.write_double(f64::from(*value));
        Ok(())
    })
});

static DOUBLE: Shared<f64> = LazyLock::new(|| {
    primitive(PickleFlag::Number, |source| source.next_double(), |value, sink| {
        sink.write_double(*value);
        Ok(())
    })
});

static STRING: Shared<String> = LazyLock::new(|| {
    primitive(PickleFlag::String, |source| source.next_string(), |value, sink| {
        sink.write_string(value)
    })
});

/// Factory for the closed set of built-in types.
///
/// Matches by type identity and declines everything else. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactory;

impl Factory for StandardFactory {
    fn create(&self, _depot: &Depot, ty: &TypeDescriptor) -> BindingResult<Option<ErasedTranslator>> {
        let found = plain(ty, &VOID)
            .or_else(|| plain(ty, &BOOLEAN))
            .or_else(|| plain(ty, &BYTE))
            .or_else(|| plain(ty, &CHAR))
            .or_else(|| plain(ty, &SHORT))
            .or_else(|| plain(ty, &INT))
            .or_else(|| plain(ty, &LONG))
            .or_else(|| plain(ty, &FLOAT))
            .or_else(|| plain(ty, &DOUBLE))
            .or_else(|| plain(ty, &STRING))
            .or_else(|| boxed(ty, &VOID))
            .or_else(|| boxed(ty, &BOOLEAN))
            .or_else(|| boxed(ty, &BYTE))
            .or_else(|| boxed(ty, &CHAR))
            .or_else(|| boxed(ty, &SHORT))
            .or_else(|| boxed(ty, &INT))
            .or_else(|| boxed(ty, &LONG))
            .or_else(|| boxed(ty, &FLOAT))
            .or_else(|| boxed(ty, &DOUBLE))
            .or_else(|| boxed(ty, &STRING));
        Ok(found)
    }
}

fn plain<T: 'static>(ty: &TypeDescriptor, shared: &Shared<T>) -> Option<ErasedTranslator> {
    ty.is::<T>()
        .then(|| ErasedTranslator::new(Arc::clone(LazyLock::force(shared))))
}

fn boxed<T: 'static>(ty: &TypeDescriptor, shared: &Shared<T>) -> Option<ErasedTranslator> {
    ty.is::<Option<T>>()
        .then(|| ErasedTranslator::from(LazyLock::force(shared).nullable()))
}
