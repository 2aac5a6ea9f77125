//! The handle table owning every runtime, context and value.
//!
//! [`QuickJs`] hands out integer handles and keeps the engine objects they
//! stand for. Values record the context that created them; contexts record
//! their runtime. Releasing an owner releases whatever it still owns first,
//! so the interpreter never sees a runtime freed under a live context or a
//! context freed under a live value.

use crate::config::{EvalFlags, RuntimeConfig};
use crate::exception::materialize;
use crate::handle::{ContextPtr, RuntimePtr, ValuePtr};
use core_types::{BindingError, BindingResult, HandleKind, JsException, Tag};
use rquickjs::context::EvalOptions;
use rquickjs::{Context, Ctx, Module, Persistent, Runtime, Type, Value};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::num::NonZeroU64;

/// Storage for one engine value.
///
/// Primitives are copied out when the value is issued; everything else stays
/// in the interpreter behind a persistent reference.
pub(crate) enum Payload {
    Empty,
    Bool(bool),
    Int(i32),
    Float(f64),
    Heap(Persistent<Value<'static>>),
}

pub(crate) struct ValueEntry {
    pub(crate) context: NonZeroU64,
    pub(crate) tag: Tag,
    pub(crate) payload: Payload,
}

pub(crate) struct ContextEntry {
    pending: Option<Persistent<Value<'static>>>,
    values: BTreeSet<NonZeroU64>,
    pub(crate) context: Context,
    runtime: NonZeroU64,
}

struct RuntimeEntry {
    contexts: BTreeSet<NonZeroU64>,
    runtime: Runtime,
}

/// Field order is drop order: values, then contexts, then runtimes.
#[derive(Default)]
pub(crate) struct HandleTable {
    values: HashMap<NonZeroU64, ValueEntry>,
    contexts: HashMap<NonZeroU64, ContextEntry>,
    runtimes: HashMap<NonZeroU64, RuntimeEntry>,
    issued: u64,
}

impl HandleTable {
    fn issue(&mut self) -> NonZeroU64 {
        let id = NonZeroU64::MIN.saturating_add(self.issued);
        self.issued += 1;
        id
    }

    pub(crate) fn value(&self, id: NonZeroU64) -> BindingResult<&ValueEntry> {
        self.values
            .get(&id)
            .ok_or_else(|| BindingError::invalid_pointer(HandleKind::Value))
    }

    pub(crate) fn context(&self, id: NonZeroU64) -> BindingResult<&ContextEntry> {
        self.contexts
            .get(&id)
            .ok_or_else(|| BindingError::invalid_pointer(HandleKind::Context))
    }

    fn context_mut(&mut self, id: NonZeroU64) -> BindingResult<&mut ContextEntry> {
        self.contexts
            .get_mut(&id)
            .ok_or_else(|| BindingError::invalid_pointer(HandleKind::Context))
    }

    fn insert_value(&mut self, context: NonZeroU64, tag: Tag, payload: Payload) -> NonZeroU64 {
        let id = self.issue();
        if let Some(owner) = self.contexts.get_mut(&context) {
            owner.values.insert(id);
        }
        self.values.insert(id, ValueEntry { context, tag, payload });
        id
    }

    fn release_context(&mut self, id: NonZeroU64) {
        let Some(entry) = self.contexts.remove(&id) else {
            return;
        };
        if !entry.values.is_empty() {
            log::warn!(
                "releasing {} value(s) still owned by JSContext {}",
                entry.values.len(),
                id
            );
        }
        for value in &entry.values {
            self.values.remove(value);
        }
        log::debug!("destroyed JSContext {}", id);
    }
}

/// Counts of live handles, by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveHandles {
    /// Live runtimes
    pub runtimes: usize,
    /// Live contexts
    pub contexts: usize,
    /// Live values
    pub values: usize,
}

impl LiveHandles {
    /// Whether nothing is live.
    pub fn is_empty(&self) -> bool {
        self.runtimes == 0 && self.contexts == 0 && self.values == 0
    }
}

/// Entry point to the embedded interpreter.
///
/// Every operation takes and returns integer handles and validates them
/// before touching the interpreter. The table is confined to the thread that
/// created it; use one `QuickJs` per logical thread.
///
/// # Examples
///
/// ```
/// use core_types::Tag;
/// use quickjs::{EvalFlags, QuickJs};
///
/// let js = QuickJs::new();
/// let runtime = js.create_runtime().unwrap();
/// let context = js.create_context(runtime).unwrap();
///
/// let value = js.evaluate(context, "6 * 7", "answer.js", EvalFlags::empty()).unwrap();
/// assert_eq!(js.get_value_tag(value).unwrap(), Tag::Int);
/// assert_eq!(js.get_value_int(value).unwrap(), 42);
///
/// js.destroy_value(context, value).unwrap();
/// js.destroy_context(context).unwrap();
/// js.destroy_runtime(runtime).unwrap();
/// assert!(js.live_handles().is_empty());
/// ```
#[derive(Default)]
pub struct QuickJs {
    pub(crate) table: RefCell<HandleTable>,
}

impl QuickJs {
    /// Creates an empty handle table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runtime with interpreter defaults.
    pub fn create_runtime(&self) -> BindingResult<RuntimePtr> {
        self.create_runtime_with(&RuntimeConfig::default())
    }

    /// Creates a runtime with the given limits.
    pub fn create_runtime_with(&self, config: &RuntimeConfig) -> BindingResult<RuntimePtr> {
        let runtime = Runtime::new().map_err(engine_error)?;
        config.apply(&runtime);

        let mut table = self.table.borrow_mut();
        let id = table.issue();
        table.runtimes.insert(
            id,
            RuntimeEntry {
                contexts: BTreeSet::new(),
                runtime,
            },
        );
        log::debug!("created JSRuntime {} with {:?}", id, config);
        Ok(RuntimePtr::from_id(id))
    }

    /// Destroys a runtime, releasing any contexts it still owns first.
    pub fn destroy_runtime(&self, runtime: RuntimePtr) -> BindingResult<()> {
        let id = runtime.non_null()?;
        let mut table = self.table.borrow_mut();
        let entry = table
            .runtimes
            .remove(&id)
            .ok_or_else(|| BindingError::invalid_pointer(HandleKind::Runtime))?;

        if !entry.contexts.is_empty() {
            log::warn!(
                "releasing {} context(s) still owned by JSRuntime {}",
                entry.contexts.len(),
                id
            );
        }
        for context in &entry.contexts {
            table.release_context(*context);
        }
        drop(entry);
        log::debug!("destroyed JSRuntime {}", id);
        Ok(())
    }

    /// Creates a context bound to `runtime`, with the standard intrinsics.
    pub fn create_context(&self, runtime: RuntimePtr) -> BindingResult<ContextPtr> {
        let runtime_id = runtime.non_null()?;
        let mut table = self.table.borrow_mut();
        let engine_runtime = table
            .runtimes
            .get(&runtime_id)
            .ok_or_else(|| BindingError::invalid_pointer(HandleKind::Runtime))?
            .runtime
            .clone();
        let context = Context::full(&engine_runtime).map_err(engine_error)?;

        let id = table.issue();
        table.contexts.insert(
            id,
            ContextEntry {
                pending: None,
                values: BTreeSet::new(),
                context,
                runtime: runtime_id,
            },
        );
        if let Some(owner) = table.runtimes.get_mut(&runtime_id) {
            owner.contexts.insert(id);
        }
        log::debug!("created JSContext {} on JSRuntime {}", id, runtime_id);
        Ok(ContextPtr::from_id(id))
    }

    /// Destroys a context, releasing any values it still owns first.
    pub fn destroy_context(&self, context: ContextPtr) -> BindingResult<()> {
        let id = context.non_null()?;
        let mut table = self.table.borrow_mut();
        let runtime_id = table.context(id)?.runtime;
        table.release_context(id);
        if let Some(owner) = table.runtimes.get_mut(&runtime_id) {
            owner.contexts.remove(&id);
        }
        Ok(())
    }

    /// Evaluates `source` and returns a handle to its completion value.
    ///
    /// A throw is not an error here: the returned value carries
    /// [`Tag::Exception`] and the thrown value becomes the context's pending
    /// exception, readable once through [`QuickJs::get_exception`]. Any
    /// exception left pending by an earlier evaluation is discarded.
    ///
    /// # Errors
    ///
    /// Illegal-state errors for null or stale handles, and
    /// [`BindingError::Engine`] when the interpreter fails without throwing.
    pub fn evaluate(
        &self,
        context: ContextPtr,
        source: &str,
        file_name: &str,
        flags: EvalFlags,
    ) -> BindingResult<ValuePtr> {
        let id = context.non_null()?;
        let engine_context = {
            let mut table = self.table.borrow_mut();
            let entry = table.context_mut(id)?;
            entry.pending = None;
            entry.context.clone()
        };

        log::debug!("evaluating {} ({} bytes, {:?})", file_name, source.len(), flags);
        let outcome = engine_context.with(|ctx| run_source(&ctx, source, file_name, flags))?;

        let mut table = self.table.borrow_mut();
        let (tag, payload) = match outcome {
            Completion::Normal(tag, payload) => (tag, payload),
            Completion::Threw(thrown) => {
                table.context_mut(id)?.pending = Some(thrown);
                (Tag::Exception, Payload::Empty)
            }
        };
        Ok(ValuePtr::from_id(table.insert_value(id, tag, payload)))
    }

    /// Releases a value through the context that owns it.
    pub fn destroy_value(&self, context: ContextPtr, value: ValuePtr) -> BindingResult<()> {
        let context_id = context.non_null()?;
        let value_id = value.non_null()?;
        let mut table = self.table.borrow_mut();
        let owner = table.value(value_id)?.context;
        if owner != context_id {
            return Err(not_owned(value, context));
        }
        table.values.remove(&value_id);
        if let Some(entry) = table.contexts.get_mut(&context_id) {
            entry.values.remove(&value_id);
        }
        Ok(())
    }

    /// Takes the context's pending exception.
    ///
    /// With nothing pending this returns [`JsException::none`], whose
    /// exception text is `"null"`. The slot is empty afterwards.
    pub fn get_exception(&self, context: ContextPtr) -> BindingResult<JsException> {
        let id = context.non_null()?;
        let (engine_context, pending) = {
            let mut table = self.table.borrow_mut();
            let entry = table.context_mut(id)?;
            (entry.context.clone(), entry.pending.take())
        };

        let Some(thrown) = pending else {
            return Ok(JsException::none());
        };
        engine_context.with(|ctx| {
            let value = thrown.restore(&ctx).map_err(engine_error)?;
            materialize(value)
        })
    }

    /// Counts the live handles of each kind.
    pub fn live_handles(&self) -> LiveHandles {
        let table = self.table.borrow();
        LiveHandles {
            runtimes: table.runtimes.len(),
            contexts: table.contexts.len(),
            values: table.values.len(),
        }
    }

    /// Checks that `context` is live and owns `value`.
    pub(crate) fn check_owner(&self, context: ContextPtr, value: ValuePtr) -> BindingResult<()> {
        let context_id = context.non_null()?;
        let value_id = value.non_null()?;
        let table = self.table.borrow();
        table.context(context_id)?;
        if table.value(value_id)?.context != context_id {
            return Err(not_owned(value, context));
        }
        Ok(())
    }

    /// Runs `f` on the engine value behind a heap payload.
    pub(crate) fn with_heap_value<R>(
        &self,
        value: ValuePtr,
        f: impl for<'js> FnOnce(&Ctx<'js>, Value<'js>) -> BindingResult<R>,
    ) -> BindingResult<R> {
        let (engine_context, persistent) = {
            let table = self.table.borrow();
            let entry = table.value(value.non_null()?)?;
            let Payload::Heap(persistent) = &entry.payload else {
                return Err(BindingError::IllegalState(format!(
                    "{} holds no engine reference",
                    value
                )));
            };
            (table.context(entry.context)?.context.clone(), persistent.clone())
        };
        engine_context.with(|ctx| {
            let restored = persistent.restore(&ctx).map_err(engine_error)?;
            f(&ctx, restored)
        })
    }

    /// Issues a value handle owned by `context`.
    pub(crate) fn issue_value(&self, context: ContextPtr, tag: Tag, payload: Payload) -> BindingResult<ValuePtr> {
        let id = context.non_null()?;
        let mut table = self.table.borrow_mut();
        table.context(id)?;
        Ok(ValuePtr::from_id(table.insert_value(id, tag, payload)))
    }

    /// The engine context behind a live handle.
    pub(crate) fn engine_context(&self, context: ContextPtr) -> BindingResult<Context> {
        let id = context.non_null()?;
        Ok(self.table.borrow().context(id)?.context.clone())
    }
}

impl fmt::Debug for QuickJs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickJs")
            .field("live", &self.live_handles())
            .finish()
    }
}

enum Completion {
    Normal(Tag, Payload),
    Threw(Persistent<Value<'static>>),
}

fn run_source(ctx: &Ctx<'_>, source: &str, file_name: &str, flags: EvalFlags) -> BindingResult<Completion> {
    let result = if flags.contains(EvalFlags::MODULE) {
        Module::evaluate(ctx.clone(), file_name, source).and_then(|promise| promise.finish::<Value>())
    } else {
        let mut options = EvalOptions::default();
        options.global = true;
        options.strict = flags.contains(EvalFlags::STRICT);
        options.backtrace_barrier = flags.contains(EvalFlags::BACKTRACE_BARRIER);
        options.filename = Some(file_name.to_string());
        ctx.eval_with_options::<Value, _>(source, options)
    };

    match result {
        Ok(value) => {
            let tag = tag_of(&value);
            Ok(Completion::Normal(tag, snapshot(ctx, tag, value)))
        }
        Err(rquickjs::Error::Exception) => Ok(Completion::Threw(Persistent::save(ctx, ctx.catch()))),
        Err(err) => Err(engine_error(err)),
    }
}

/// The tag of an engine value. Functions, arrays and Error instances are all
/// objects.
pub(crate) fn tag_of(value: &Value<'_>) -> Tag {
    match value.type_of() {
        Type::Bool => Tag::Bool,
        Type::Int => Tag::Int,
        Type::Float => Tag::Float64,
        Type::String => Tag::String,
        Type::Null => Tag::Null,
        Type::Undefined => Tag::Undefined,
        Type::Uninitialized => Tag::Uninitialized,
        Type::Symbol => Tag::Symbol,
        Type::BigInt => Tag::BigInt,
        _ => Tag::Object,
    }
}

fn snapshot<'js>(ctx: &Ctx<'js>, tag: Tag, value: Value<'js>) -> Payload {
    let inline = match tag {
        Tag::Bool => value.as_bool().map(Payload::Bool),
        Tag::Int => value.as_int().map(Payload::Int),
        Tag::Float64 => value.as_float().map(Payload::Float),
        Tag::Null | Tag::Undefined => Some(Payload::Empty),
        _ => None,
    };
    inline.unwrap_or_else(|| Payload::Heap(Persistent::save(ctx, value)))
}

pub(crate) fn engine_error(err: rquickjs::Error) -> BindingError {
    BindingError::Engine(err.to_string())
}

fn not_owned(value: ValuePtr, context: ContextPtr) -> BindingError {
    BindingError::IllegalState(format!("{} is not owned by {}", value, context))
}
