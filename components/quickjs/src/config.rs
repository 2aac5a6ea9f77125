//! Runtime limits and evaluation flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Flags controlling how source code is evaluated.
    ///
    /// The empty set evaluates a global, sloppy-mode script. Bit values match
    /// the interpreter's `JS_EVAL_*` constants so raw flags can be passed
    /// through [`EvalFlags::from_bits_truncate`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EvalFlags: u32 {
        /// Evaluate as an ES module
        const MODULE = 1 << 0;
        /// Force strict mode
        const STRICT = 1 << 3;
        /// Hide frames below this evaluation from `Error` stacks
        const BACKTRACE_BARRIER = 1 << 6;
    }
}

/// Limits applied to an interpreter runtime when it is created.
///
/// Every field is optional; `None` keeps the interpreter default.
///
/// # Examples
///
/// ```
/// use quickjs::RuntimeConfig;
///
/// let config = RuntimeConfig::default()
///     .with_memory_limit(16 * 1024 * 1024)
///     .with_max_stack_size(512 * 1024);
/// assert_eq!(config.memory_limit, Some(16 * 1024 * 1024));
/// assert_eq!(config.gc_threshold, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Heap limit in bytes
    pub memory_limit: Option<usize>,
    /// Native stack limit in bytes
    pub max_stack_size: Option<usize>,
    /// Allocation volume in bytes that triggers a collection
    pub gc_threshold: Option<usize>,
}

impl RuntimeConfig {
    /// Sets the heap limit.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Sets the native stack limit.
    pub fn with_max_stack_size(mut self, bytes: usize) -> Self {
        self.max_stack_size = Some(bytes);
        self
    }

    /// Sets the collection threshold.
    pub fn with_gc_threshold(mut self, bytes: usize) -> Self {
        self.gc_threshold = Some(bytes);
        self
    }

    /// Overlays the fields set in `other` onto this config.
    pub fn merge(mut self, other: &RuntimeConfig) -> Self {
        self.memory_limit = other.memory_limit.or(self.memory_limit);
        self.max_stack_size = other.max_stack_size.or(self.max_stack_size);
        self.gc_threshold = other.gc_threshold.or(self.gc_threshold);
        self
    }

    pub(crate) fn apply(&self, runtime: &rquickjs::Runtime) {
        if let Some(limit) = self.memory_limit {
            runtime.set_memory_limit(limit);
        }
        if let Some(size) = self.max_stack_size {
            runtime.set_max_stack_size(size);
        }
        if let Some(threshold) = self.gc_threshold {
            runtime.set_gc_threshold(threshold);
        }
    }
}
