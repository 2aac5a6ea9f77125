//! Type-directed marshaling between Rust values and engine values.
//!
//! Values cross the engine boundary as a compact tagged byte stream. A
//! [`Translator`] knows how to read and write one Rust type in that stream; a
//! [`Depot`] finds the translator for a requested type by asking registered
//! [`Factory`] objects in order.
//!
//! # Overview
//!
//! - [`BitSource`] / [`BitSink`] - Reader and writer for the wire format
//! - [`PickleFlag`] - Shape flags making up a translator's pickle signature
//! - [`Translator`] - Decode/encode pair plus signature for one type
//! - [`Depot`] - Cached, thread-safe type-to-translator registry
//! - [`StandardFactory`] - Built-in primitives, `String` and `Option` forms
//!
//! # Examples
//!
//! ```
//! use translator::{BitSink, BitSource, Depot};
//!
//! let depot = Depot::new();
//! let maybe_int = depot.resolve::<Option<i32>>().unwrap();
//!
//! let mut sink = BitSink::new();
//! sink.write_null();
//! sink.write_int(42);
//! let bytes = sink.into_bytes();
//!
//! let mut source = BitSource::new(&bytes);
//! assert_eq!(maybe_int.decode(&mut source).unwrap(), None);
//! assert_eq!(maybe_int.decode(&mut source).unwrap(), Some(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bits;
pub mod depot;
pub mod standard;
mod translator;

pub use bits::{
    describe_signature, is_nullable_flag, BitSink, BitSource, Number, PickleFlag, WireTag,
    PICKLE_FLAG_ATTR_NULLABLE,
};
pub use depot::{Depot, DepotBuilder, ErasedTranslator, Factory, TypeDescriptor};
pub use standard::StandardFactory;
pub use translator::Translator;
