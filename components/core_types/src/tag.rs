//! Runtime kind tags of engine values.
//!
//! The embedded interpreter stores every value as a small discriminator plus a
//! payload. This module names the discriminators the binding layer can observe
//! and keeps their integer codes stable, since those codes appear verbatim in
//! error messages handed to callers.

use std::fmt;

/// Runtime kind of an engine value.
///
/// The integer codes match the interpreter's own `JS_TAG_*` constants. Negative
/// codes denote reference-counted heap values.
///
/// # Examples
///
/// ```
/// use core_types::Tag;
///
/// assert_eq!(Tag::Int.code(), 0);
/// assert_eq!(Tag::Float64.code(), 7);
/// assert_eq!(Tag::from_code(1), Some(Tag::Bool));
/// assert!(Tag::String.is_heap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Arbitrary precision integer
    BigInt,
    /// Symbol primitive
    Symbol,
    /// String primitive
    String,
    /// Module record
    Module,
    /// Any object, including functions, arrays and Error instances
    Object,
    /// 32-bit integer number
    Int,
    /// Boolean
    Bool,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// Binding in its temporal dead zone
    Uninitialized,
    /// Evaluation threw; the thrown value is pending on the context
    Exception,
    /// Double-precision number
    Float64,
}

impl Tag {
    /// Every tag, ordered by code.
    pub const ALL: [Tag; 12] = [
        Tag::BigInt,
        Tag::Symbol,
        Tag::String,
        Tag::Module,
        Tag::Object,
        Tag::Int,
        Tag::Bool,
        Tag::Null,
        Tag::Undefined,
        Tag::Uninitialized,
        Tag::Exception,
        Tag::Float64,
    ];

    /// Integer code of this tag.
    pub fn code(self) -> i32 {
        match self {
            Tag::BigInt => -10,
            Tag::Symbol => -8,
            Tag::String => -7,
            Tag::Module => -3,
            Tag::Object => -1,
            Tag::Int => 0,
            Tag::Bool => 1,
            Tag::Null => 2,
            Tag::Undefined => 3,
            Tag::Uninitialized => 4,
            Tag::Exception => 6,
            Tag::Float64 => 7,
        }
    }

    /// Looks up the tag for an integer code.
    pub fn from_code(code: i32) -> Option<Tag> {
        Tag::ALL.iter().copied().find(|tag| tag.code() == code)
    }

    /// Whether values of this kind live on the engine heap.
    pub fn is_heap(self) -> bool {
        self.code() < 0
    }

    /// Whether this tag denotes a JavaScript number.
    pub fn is_number(self) -> bool {
        matches!(self, Tag::Int | Tag::Float64)
    }

    /// Whether this tag denotes `null` or `undefined`.
    pub fn is_nullish(self) -> bool {
        matches!(self, Tag::Null | Tag::Undefined)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::BigInt => "bigint",
            Tag::Symbol => "symbol",
            Tag::String => "string",
            Tag::Module => "module",
            Tag::Object => "object",
            Tag::Int => "int",
            Tag::Bool => "boolean",
            Tag::Null => "null",
            Tag::Undefined => "undefined",
            Tag::Uninitialized => "uninitialized",
            Tag::Exception => "exception",
            Tag::Float64 => "double",
        };
        write!(f, "{}", name)
    }
}
