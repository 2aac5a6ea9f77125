//! Opaque integer handles for engine objects.
//!
//! Handles are plain `u64` identifiers issued by [`QuickJs`](crate::QuickJs).
//! Zero is the null sentinel and is never issued. Every entry point passes
//! its handles through `non_null()` before anything reaches the interpreter,
//! so a null handle fails with an illegal-state error naming its kind.

use core_types::{BindingError, BindingResult, HandleKind};
use std::fmt;
use std::num::NonZeroU64;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u64);

        impl $name {
            /// The null sentinel.
            pub const NULL: $name = $name(0);

            /// Wraps a raw handle value.
            pub fn from_raw(raw: u64) -> Self {
                $name(raw)
            }

            /// The raw handle value.
            pub fn as_raw(self) -> u64 {
                self.0
            }

            /// Whether this is the null sentinel.
            pub fn is_null(self) -> bool {
                self.0 == 0
            }

            /// The checked form of this handle.
            ///
            /// # Errors
            ///
            /// [`BindingError::IllegalState`] when the handle is null.
            pub fn non_null(self) -> BindingResult<NonZeroU64> {
                NonZeroU64::new(self.0).ok_or_else(|| BindingError::null_pointer(Self::KIND))
            }

            /// The handle kind, for error messages.
            pub const KIND: HandleKind = $kind;

            pub(crate) fn from_id(id: NonZeroU64) -> Self {
                $name(id.get())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}@{:#x}", Self::KIND.name(), self.0)
            }
        }
    };
}

handle_type!(
    /// Handle to an interpreter runtime.
    RuntimePtr,
    HandleKind::Runtime
);

handle_type!(
    /// Handle to an execution context bound to a runtime.
    ContextPtr,
    HandleKind::Context
);

handle_type!(
    /// Handle to a value owned by a context.
    ValuePtr,
    HandleKind::Value
);
