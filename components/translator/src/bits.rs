//! Compact tagged byte stream used to move values across the engine boundary.
//!
//! Every value is one wire tag byte followed by a tag-specific payload:
//!
//! | Wire tag | Byte | Payload |
//! |---|---|---|
//! | NULL | 0 | none |
//! | BOOLEAN | 1 | one byte, 0 or 1 |
//! | INT | 2 | i32, little-endian |
//! | DOUBLE | 3 | f64, little-endian |
//! | STRING | 4 | u32 byte length, little-endian, then UTF-8 bytes |
//!
//! The engine side and the translator side both read and write exactly this
//! layout.

use core_types::JsDataError;
use std::fmt;

/// Attribute bit marking a signature flag as accepting null.
pub const PICKLE_FLAG_ATTR_NULLABLE: u8 = 0b1000_0000;

const FLAG_TYPE_MASK: u8 = 0b0111_1111;

/// Shape flags used in pickle signatures.
///
/// A signature is a byte sequence of these flags (optionally carrying
/// [`PICKLE_FLAG_ATTR_NULLABLE`]) that the engine side checks before it
/// marshals a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickleFlag {
    /// `null` / absent
    Null,
    /// Boolean
    Boolean,
    /// Any JavaScript number
    Number,
    /// String
    String,
    /// Plain object
    Object,
    /// Array
    Array,
}

impl PickleFlag {
    /// The flag's byte value, without attributes.
    pub fn as_byte(self) -> u8 {
        match self {
            PickleFlag::Null => 0,
            PickleFlag::Boolean => 1,
            PickleFlag::Number => 2,
            PickleFlag::String => 3,
            PickleFlag::Object => 4,
            PickleFlag::Array => 5,
        }
    }

    /// Decodes a signature byte, ignoring the nullable attribute.
    pub fn from_byte(byte: u8) -> Option<PickleFlag> {
        match byte & FLAG_TYPE_MASK {
            0 => Some(PickleFlag::Null),
            1 => Some(PickleFlag::Boolean),
            2 => Some(PickleFlag::Number),
            3 => Some(PickleFlag::String),
            4 => Some(PickleFlag::Object),
            5 => Some(PickleFlag::Array),
            _ => None,
        }
    }

    /// The flag's byte value with the nullable attribute set.
    pub fn nullable(self) -> u8 {
        self.as_byte() | PICKLE_FLAG_ATTR_NULLABLE
    }

    /// Upper-case name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            PickleFlag::Null => "NULL",
            PickleFlag::Boolean => "BOOLEAN",
            PickleFlag::Number => "NUMBER",
            PickleFlag::String => "STRING",
            PickleFlag::Object => "OBJECT",
            PickleFlag::Array => "ARRAY",
        }
    }
}

/// Whether a signature byte carries the nullable attribute.
pub fn is_nullable_flag(byte: u8) -> bool {
    byte & PICKLE_FLAG_ATTR_NULLABLE != 0
}

/// Renders a signature for logs and error messages, e.g. `[NUMBER?]`.
pub fn describe_signature(signature: &[u8]) -> String {
    let parts: Vec<String> = signature
        .iter()
        .map(|&byte| {
            let name = PickleFlag::from_byte(byte).map_or("?INVALID", PickleFlag::name);
            if is_nullable_flag(byte) {
                format!("{}?", name)
            } else {
                name.to_string()
            }
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Tag byte leading every value in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    /// `null` or `undefined`
    Null,
    /// Boolean
    Boolean,
    /// 32-bit integer number
    Int,
    /// Double-precision number
    Double,
    /// UTF-8 string
    String,
}

impl WireTag {
    /// The tag's byte value.
    pub fn as_byte(self) -> u8 {
        match self {
            WireTag::Null => 0,
            WireTag::Boolean => 1,
            WireTag::Int => 2,
            WireTag::Double => 3,
            WireTag::String => 4,
        }
    }

    /// Decodes a tag byte.
    pub fn from_byte(byte: u8) -> Option<WireTag> {
        match byte {
            0 => Some(WireTag::Null),
            1 => Some(WireTag::Boolean),
            2 => Some(WireTag::Int),
            3 => Some(WireTag::Double),
            4 => Some(WireTag::String),
            _ => None,
        }
    }

    /// The signature flag this wire tag satisfies.
    pub fn flag(self) -> PickleFlag {
        match self {
            WireTag::Null => PickleFlag::Null,
            WireTag::Boolean => PickleFlag::Boolean,
            WireTag::Int | WireTag::Double => PickleFlag::Number,
            WireTag::String => PickleFlag::String,
        }
    }
}

impl fmt::Display for WireTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireTag::Null => "NULL",
            WireTag::Boolean => "BOOLEAN",
            WireTag::Int => "INT",
            WireTag::Double => "DOUBLE",
            WireTag::String => "STRING",
        };
        write!(f, "{} ({})", name, self.as_byte())
    }
}

/// A decoded JavaScript number, before narrowing to a Rust type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Carried with the INT wire tag
    Int(i32),
    /// Carried with the DOUBLE wire tag
    Double(f64),
}

impl Number {
    /// The number as a double.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => f64::from(n),
            Number::Double(n) => n,
        }
    }

    /// The number as an integer, if it is integral.
    fn as_integral(self) -> Option<f64> {
        let n = self.as_f64();
        (n.is_finite() && n.fract() == 0.0).then_some(n)
    }
}

/// Append-only writer for the wire format.
///
/// # Examples
///
/// ```
/// use translator::{BitSink, BitSource};
///
/// let mut sink = BitSink::new();
/// sink.write_boolean(true);
/// sink.write_int(-1);
///
/// let bytes = sink.into_bytes();
/// let mut source = BitSource::new(&bytes);
/// assert!(source.next_boolean().unwrap());
/// assert_eq!(source.next_int().unwrap(), -1);
/// assert!(source.is_exhausted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSink {
    buffer: Vec<u8>,
}

impl BitSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a NULL value.
    pub fn write_null(&mut self) {
        self.buffer.push(WireTag::Null.as_byte());
    }

    /// Writes a BOOLEAN value.
    pub fn write_boolean(&mut self, value: bool) {
        self.buffer.push(WireTag::Boolean.as_byte());
        self.buffer.push(u8::from(value));
    }

    /// Writes an INT value.
    pub fn write_int(&mut self, value: i32) {
        self.buffer.push(WireTag::Int.as_byte());
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a DOUBLE value.
    pub fn write_double(&mut self, value: f64) {
        self.buffer.push(WireTag::Double.as_byte());
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a STRING value.
    ///
    /// Fails if the string is longer than the 32-bit length prefix allows.
    pub fn write_string(&mut self, value: &str) -> Result<(), JsDataError> {
        let len = u32::try_from(value.len())
            .map_err(|_| JsDataError::new(format!("String too long to pickle: {} bytes", value.len())))?;
        self.buffer.push(WireTag::String.as_byte());
        self.buffer.extend_from_slice(&len.to_le_bytes());
        self.buffer.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the sink, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Cursor reading the wire format.
///
/// Every `next_*` call consumes exactly one value. On failure the cursor is
/// left where the failing value started.
#[derive(Debug, Clone)]
pub struct BitSource<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BitSource<'a> {
    /// Create a source positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        BitSource { data, position: 0 }
    }

    /// Byte offset of the next value.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Whether every byte has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// The tag of the next value, without consuming it.
    pub fn peek_tag(&self) -> Result<WireTag, JsDataError> {
        let byte = *self
            .data
            .get(self.position)
            .ok_or_else(unexpected_end)?;
        WireTag::from_byte(byte)
            .ok_or_else(|| JsDataError::new(format!("Unknown pickle tag: {:#04x}", byte)))
    }

    /// Consumes a NULL value.
    pub fn next_null(&mut self) -> Result<(), JsDataError> {
        self.read(|cursor| {
            cursor.expect_tag("null", PickleFlag::Null, &[WireTag::Null])?;
            Ok(())
        })
    }

    /// Consumes a BOOLEAN value.
    pub fn next_boolean(&mut self) -> Result<bool, JsDataError> {
        self.read(|cursor| {
            cursor.expect_tag("boolean", PickleFlag::Boolean, &[WireTag::Boolean])?;
            match cursor.take::<1>()? {
                [0] => Ok(false),
                [1] => Ok(true),
                [other] => Err(JsDataError::new(format!("Invalid boolean payload: {}", other))),
            }
        })
    }

    /// Consumes a number, INT or DOUBLE.
    pub fn next_number(&mut self) -> Result<Number, JsDataError> {
        self.read(|cursor| cursor.number("number"))
    }

    /// Consumes an integral number that fits in `i8`.
    pub fn next_byte(&mut self) -> Result<i8, JsDataError> {
        self.read(|cursor| {
            let n = cursor.integral("byte", f64::from(i8::MIN), f64::from(i8::MAX))?;
            Ok(n as i8)
        })
    }

    /// Consumes an integral number that fits in `i16`.
    pub fn next_short(&mut self) -> Result<i16, JsDataError> {
        self.read(|cursor| {
            let n = cursor.integral("short", f64::from(i16::MIN), f64::from(i16::MAX))?;
            Ok(n as i16)
        })
    }

    /// Consumes an integral number that fits in `i32`.
    pub fn next_int(&mut self) -> Result<i32, JsDataError> {
        self.read(|cursor| {
            let n = cursor.integral("int", f64::from(i32::MIN), f64::from(i32::MAX))?;
            Ok(n as i32)
        })
    }

    /// Consumes an integral number that fits in `i64`.
    pub fn next_long(&mut self) -> Result<i64, JsDataError> {
        self.read(|cursor| match cursor.number("long")? {
            Number::Int(n) => Ok(i64::from(n)),
            number @ Number::Double(d) => {
                // i64::MAX is not representable; 2^63 is the exclusive bound.
                let in_range = d >= -9_223_372_036_854_775_808.0 && d < 9_223_372_036_854_775_808.0;
                match number.as_integral() {
                    Some(n) if in_range => Ok(n as i64),
                    _ => Err(out_of_range("long", d)),
                }
            }
        })
    }

    /// Consumes a number as `f32`, rounding to the nearest `f32`.
    ///
    /// Finite numbers beyond the `f32` range fail; NaN and the infinities
    /// pass through.
    pub fn next_float(&mut self) -> Result<f32, JsDataError> {
        self.read(|cursor| {
            let n = cursor.number("float")?.as_f64();
            if n.is_finite() && n.abs() > f64::from(f32::MAX) {
                return Err(out_of_range("float", n));
            }
            Ok(n as f32)
        })
    }

    /// Consumes a number as `f64`.
    pub fn next_double(&mut self) -> Result<f64, JsDataError> {
        self.read(|cursor| Ok(cursor.number("double")?.as_f64()))
    }

    /// Consumes a STRING holding exactly one character.
    pub fn next_char(&mut self) -> Result<char, JsDataError> {
        self.read(|cursor| {
            let s = cursor.string("char")?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(JsDataError::new(format!(
                    "Expected a single character, got {} characters",
                    s.chars().count()
                ))),
            }
        })
    }

    /// Consumes a STRING value.
    pub fn next_string(&mut self) -> Result<String, JsDataError> {
        self.read(|cursor| cursor.string("string"))
    }

    /// Runs `op`, rewinding to the value start if it fails.
    fn read<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T, JsDataError>) -> Result<T, JsDataError> {
        let start = self.position;
        let result = op(self);
        if result.is_err() {
            self.position = start;
        }
        result
    }

    fn expect_tag(&mut self, kind: &str, expected: PickleFlag, accepted: &[WireTag]) -> Result<WireTag, JsDataError> {
        let tag = self.peek_tag()?;
        if !accepted.contains(&tag) {
            return Err(JsDataError::new(format!(
                "Invalid pickle tag for {}: expected {}, got {}",
                kind,
                expected.name(),
                tag
            )));
        }
        self.position += 1;
        Ok(tag)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], JsDataError> {
        let end = self.position.checked_add(N).ok_or_else(unexpected_end)?;
        let bytes = self.data.get(self.position..end).ok_or_else(unexpected_end)?;
        self.position = end;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn number(&mut self, kind: &str) -> Result<Number, JsDataError> {
        match self.expect_tag(kind, PickleFlag::Number, &[WireTag::Int, WireTag::Double])? {
            WireTag::Int => Ok(Number::Int(i32::from_le_bytes(self.take::<4>()?))),
            _ => Ok(Number::Double(f64::from_le_bytes(self.take::<8>()?))),
        }
    }

    fn integral(&mut self, kind: &str, min: f64, max: f64) -> Result<f64, JsDataError> {
        let number = self.number(kind)?;
        match number.as_integral() {
            Some(n) if n >= min && n <= max => Ok(n),
            _ => Err(out_of_range(kind, number.as_f64())),
        }
    }

    fn string(&mut self, kind: &str) -> Result<String, JsDataError> {
        self.expect_tag(kind, PickleFlag::String, &[WireTag::String])?;
        let len = u32::from_le_bytes(self.take::<4>()?) as usize;
        let end = self.position.checked_add(len).ok_or_else(unexpected_end)?;
        let bytes = self.data.get(self.position..end).ok_or_else(unexpected_end)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| JsDataError::new(format!("Invalid UTF-8 in pickled string: {}", e)))?;
        self.position = end;
        Ok(s.to_string())
    }
}

fn unexpected_end() -> JsDataError {
    JsDataError::new("Unexpected end of pickle stream")
}

fn out_of_range(kind: &str, value: f64) -> JsDataError {
    JsDataError::new(format!("Number out of range for {}: {}", kind, value))
}
