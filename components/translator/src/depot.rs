//! Registry resolving Rust types to translators.
//!
//! A [`Depot`] asks an ordered list of [`Factory`] objects for a translator,
//! takes the first one that does not decline, and caches it by [`TypeId`].
//! The standard factory is always consulted last, so registered factories can
//! override built-in behavior.

use crate::standard::StandardFactory;
use crate::Translator;
use core_types::{BindingError, BindingResult};
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Identity of a requested Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    /// Descriptor for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeDescriptor {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type's identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name, for messages only.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this descriptor denotes `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A shared translator with its type parameter erased.
///
/// Factories return these; [`Depot::resolve`] turns them back into a typed
/// `Arc<Translator<T>>`.
#[derive(Clone)]
pub struct ErasedTranslator {
    produces: TypeId,
    type_name: &'static str,
    signature: Box<[u8]>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedTranslator {
    /// Erases a shared translator.
    pub fn new<T: 'static>(translator: Arc<Translator<T>>) -> Self {
        ErasedTranslator {
            produces: TypeId::of::<T>(),
            type_name: translator.type_name(),
            signature: translator.signature().into(),
            inner: translator,
        }
    }

    /// Whether this translator produces values of type `id`.
    pub fn produces(&self, id: TypeId) -> bool {
        self.produces == id
    }

    /// Name of the translated type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The pickle signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Recovers the typed translator.
    pub fn downcast<T: 'static>(&self) -> Option<Arc<Translator<T>>> {
        Arc::clone(&self.inner).downcast::<Translator<T>>().ok()
    }
}

impl<T: 'static> From<Translator<T>> for ErasedTranslator {
    fn from(translator: Translator<T>) -> Self {
        ErasedTranslator::new(Arc::new(translator))
    }
}

impl<T: 'static> From<Arc<Translator<T>>> for ErasedTranslator {
    fn from(translator: Arc<Translator<T>>) -> Self {
        ErasedTranslator::new(translator)
    }
}

impl fmt::Debug for ErasedTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedTranslator")
            .field("type_name", &self.type_name)
            .field("signature", &crate::bits::describe_signature(&self.signature))
            .finish()
    }
}

/// Extension point producing translators for types the depot does not know.
///
/// Returning `Ok(None)` declines the type. A factory may call back into the
/// depot to resolve component types, as long as each step narrows the type.
pub trait Factory: Send + Sync {
    /// Creates a translator for `ty`, or declines.
    fn create(&self, depot: &Depot, ty: &TypeDescriptor) -> BindingResult<Option<ErasedTranslator>>;
}

impl<F> Factory for F
where
    F: Fn(&Depot, &TypeDescriptor) -> BindingResult<Option<ErasedTranslator>> + Send + Sync,
{
    fn create(&self, depot: &Depot, ty: &TypeDescriptor) -> BindingResult<Option<ErasedTranslator>> {
        self(depot, ty)
    }
}

/// Builder registering factories in priority order.
#[derive(Default)]
pub struct DepotBuilder {
    factories: Vec<Box<dyn Factory>>,
}

impl DepotBuilder {
    /// Registers a factory after those already registered.
    pub fn add_factory(mut self, factory: impl Factory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Builds the depot, appending the standard factory.
    pub fn build(mut self) -> Depot {
        self.factories.push(Box::new(StandardFactory));
        Depot {
            factories: self.factories,
            cache: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }
}

/// Registry mapping Rust types to their translators.
///
/// Resolution is cached and safe to share between threads. When two threads
/// race to resolve the same type, the first insertion wins and both observe
/// the same translator instance.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use translator::Depot;
///
/// let depot = Depot::new();
/// let first = depot.resolve::<i32>().unwrap();
/// let second = depot.resolve::<i32>().unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
///
/// assert!(depot.resolve::<Vec<u8>>().is_err());
/// ```
pub struct Depot {
    factories: Vec<Box<dyn Factory>>,
    cache: RwLock<HashMap<TypeId, ErasedTranslator>>,
    in_flight: Mutex<HashSet<(ThreadId, TypeId)>>,
}

impl Depot {
    /// A depot with only the standard translators.
    pub fn new() -> Self {
        Depot::builder().build()
    }

    /// Starts registering custom factories.
    pub fn builder() -> DepotBuilder {
        DepotBuilder::default()
    }

    /// Resolves the translator for `T`.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnsupportedType`] when every factory declines, and
    /// [`BindingError::RecursiveType`] when `T` is requested again while its
    /// own resolution is still running on this thread.
    pub fn resolve<T: 'static>(&self) -> BindingResult<Arc<Translator<T>>> {
        let ty = TypeDescriptor::of::<T>();
        let erased = self.resolve_descriptor(&ty)?;
        erased.downcast::<T>().ok_or_else(|| mismatch(&ty, &erased))
    }

    /// Resolves a translator by descriptor, without recovering its type.
    pub fn resolve_descriptor(&self, ty: &TypeDescriptor) -> BindingResult<ErasedTranslator> {
        if let Some(hit) = self.cache.read().get(&ty.id()) {
            return Ok(hit.clone());
        }

        let created = {
            let _guard = InFlight::enter(&self.in_flight, ty)?;
            self.create(ty)?
        };
        if !created.produces(ty.id()) {
            return Err(mismatch(ty, &created));
        }

        let mut cache = self.cache.write();
        let winner = cache.entry(ty.id()).or_insert(created).clone();
        log::debug!(
            "resolved translator for {} {}",
            ty,
            crate::bits::describe_signature(winner.signature())
        );
        Ok(winner)
    }

    /// Whether a translator for `T` is already cached.
    pub fn is_cached<T: 'static>(&self) -> bool {
        self.cache.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of cached translators.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Number of registered factories, including the standard one.
    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    fn create(&self, ty: &TypeDescriptor) -> BindingResult<ErasedTranslator> {
        for factory in &self.factories {
            if let Some(translator) = factory.create(self, ty)? {
                return Ok(translator);
            }
        }
        Err(BindingError::unsupported(ty.name()))
    }
}

impl Default for Depot {
    fn default() -> Self {
        Depot::new()
    }
}

impl fmt::Debug for Depot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Depot")
            .field("factories", &self.factories.len())
            .field("cached", &self.cached_len())
            .finish()
    }
}

fn mismatch(ty: &TypeDescriptor, got: &ErasedTranslator) -> BindingError {
    BindingError::UnsupportedType {
        type_name: ty.name().to_string(),
        detail: Some(format!("factory produced a translator for {}", got.type_name())),
    }
}

/// Marks a type as being resolved on the current thread until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<(ThreadId, TypeId)>>,
    key: (ThreadId, TypeId),
}

impl<'a> InFlight<'a> {
    fn enter(set: &'a Mutex<HashSet<(ThreadId, TypeId)>>, ty: &TypeDescriptor) -> BindingResult<Self> {
        let key = (thread::current().id(), ty.id());
        if !set.lock().insert(key) {
            return Err(BindingError::RecursiveType(ty.name().to_string()));
        }
        Ok(InFlight { set, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}
