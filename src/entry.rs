//! Entry definitions and the per-entry creation protocol.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;

use crate::error::{BoxError, MakerError, MakerResult};
use crate::hook::MakerHook;
use crate::internal::CreationLock;
use crate::lifetime::Lifetime;
use crate::registry::{MakeContext, Registry};
use crate::traits::Shutdown;
use crate::ConfigurationBag;

/// Type-erased shared instance
pub type AnyArc = Arc<dyn Any + Send + Sync>;

type Constructor = Arc<dyn for<'a> Fn(&MakeContext<'a>) -> MakerResult<AnyArc> + Send + Sync>;
type CreatedCallback = Arc<dyn Fn(&AnyArc) + Send + Sync>;
type ShutdownCallback = Arc<dyn Fn(Option<&AnyArc>) -> Result<(), BoxError> + Send + Sync>;

/// Typed definition of a named entry.
///
/// `S` is the stored type: the concrete instance type, or `Arc<dyn Trait>` for
/// entries that expose a capability. Definitions are collected by a
/// [`RegistryBuilder`](crate::RegistryBuilder) and frozen when it is built.
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, EntryDefinition, RegistryBuilder, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// struct Dog { name: String }
///
/// let started = Arc::new(AtomicUsize::new(0));
/// let counter = started.clone();
///
/// let mut builder = RegistryBuilder::new();
/// builder.add(
///     EntryDefinition::singleton("sparky", |ctx| {
///         Ok(Dog { name: ctx.require("sparky.name")?.to_string() })
///     })
///     .on_created(move |_dog: &Dog| {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
/// );
/// let registry = builder.build(ConfigurationBag::new().with("sparky.name", "Sparky"));
///
/// assert_eq!(registry.get::<Dog>("sparky").unwrap().name, "Sparky");
/// registry.get::<Dog>("sparky").unwrap();
/// assert_eq!(started.load(Ordering::SeqCst), 1);
/// ```
pub struct EntryDefinition<S> {
    name: String,
    lifetime: Lifetime,
    ctor: Constructor,
    on_created: Option<CreatedCallback>,
    on_shutdown: Option<ShutdownCallback>,
    _stored: PhantomData<fn() -> S>,
}

impl<S> EntryDefinition<S>
where
    S: Any + Send + Sync,
{
    pub fn new<F>(name: impl Into<String>, lifetime: Lifetime, ctor: F) -> Self
    where
        F: Fn(&MakeContext<'_>) -> MakerResult<S> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            lifetime,
            ctor: Arc::new(move |ctx: &MakeContext<'_>| ctor(ctx).map(|value| Arc::new(value) as AnyArc)),
            on_created: None,
            on_shutdown: None,
            _stored: PhantomData,
        }
    }

    pub fn singleton<F>(name: impl Into<String>, ctor: F) -> Self
    where
        F: Fn(&MakeContext<'_>) -> MakerResult<S> + Send + Sync + 'static,
    {
        Self::new(name, Lifetime::Singleton, ctor)
    }

    pub fn prototype<F>(name: impl Into<String>, ctor: F) -> Self
    where
        F: Fn(&MakeContext<'_>) -> MakerResult<S> + Send + Sync + 'static,
    {
        Self::new(name, Lifetime::Prototype, ctor)
    }

    /// Post-construction callback.
    ///
    /// Runs once per successful construction: on every resolution of a
    /// prototype, once per cache fill of a singleton. Hook output is started too.
    pub fn on_created<F>(mut self, callback: F) -> Self
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.on_created = Some(Arc::new(move |instance: &AnyArc| {
            if let Some(value) = (**instance).downcast_ref::<S>() {
                callback(value);
            }
        }));
        self
    }

    /// Shutdown callback, handed the cached instance if there is one.
    ///
    /// Prototypes always see `None`.
    pub fn on_shutdown<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<&S>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.on_shutdown = Some(Arc::new(move |cached: Option<&AnyArc>| {
            callback(cached.and_then(|instance| (**instance).downcast_ref::<S>()))
        }));
        self
    }

    /// Shuts the cached instance down through its [`Shutdown`] impl.
    pub fn shutdown_instance(self) -> Self
    where
        S: Shutdown,
    {
        self.on_shutdown(|cached| match cached {
            Some(instance) => instance.shutdown(),
            None => Ok(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn into_entry(self) -> Entry {
        Entry {
            name: self.name,
            lifetime: self.lifetime,
            stored_type: TypeId::of::<S>(),
            type_name: type_name::<S>(),
            ctor: self.ctor,
            on_created: self.on_created,
            on_shutdown: self.on_shutdown,
            hook: ArcSwapOption::empty(),
            cached: ArcSwapOption::empty(),
            lock: CreationLock::new(),
        }
    }
}

/// A registered entry: identity, policy, construction logic and cached state.
///
/// Only the hook slot and the cached-instance slot change after the registry is
/// built. Both are swapped atomically; the cache is filled and emptied only
/// while this entry's creation lock is held.
pub struct Entry {
    name: String,
    lifetime: Lifetime,
    stored_type: TypeId,
    type_name: &'static str,
    ctor: Constructor,
    on_created: Option<CreatedCallback>,
    on_shutdown: Option<ShutdownCallback>,
    hook: ArcSwapOption<Arc<dyn MakerHook>>,
    cached: ArcSwapOption<AnyArc>,
    lock: CreationLock,
}

impl Entry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime.is_singleton()
    }

    /// Name of the stored type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn has_hook(&self) -> bool {
        self.hook.load().is_some()
    }

    /// Whether a singleton instance is currently cached. Always false for prototypes.
    pub fn is_cached(&self) -> bool {
        self.cached.load().is_some()
    }

    /// Returns the cached singleton, or a new instance.
    ///
    /// Singletons use double-checked locking: the lock-free load answers every
    /// call after the first, and the creation lock makes concurrent first calls
    /// construct exactly once. A failed construction leaves the cache empty.
    pub(crate) fn resolve(&self, registry: &Registry, config: &ConfigurationBag) -> MakerResult<AnyArc> {
        match self.lifetime {
            Lifetime::Prototype => {
                let instance = self.construct(registry, config)?;
                self.started(&instance);
                Ok(instance)
            }
            Lifetime::Singleton => {
                if let Some(cached) = self.cached.load_full() {
                    return Ok(AnyArc::clone(&cached));
                }

                let _guard = self.lock.acquire();
                if let Some(cached) = self.cached.load_full() {
                    return Ok(AnyArc::clone(&cached));
                }

                let instance = self.construct(registry, config)?;
                // Started before publishing so lock-free readers never see it un-started
                self.started(&instance);
                self.cached.store(Some(Arc::new(instance.clone())));
                Ok(instance)
            }
        }
    }

    fn construct(&self, registry: &Registry, config: &ConfigurationBag) -> MakerResult<AnyArc> {
        let observers = registry.observers();
        let began = observers.has_observers().then(Instant::now);

        let hook = self.hook.load_full();
        let result = match &hook {
            Some(hook) => hook.make_instance(),
            None => (self.ctor)(&MakeContext::new(registry, config, &self.name)),
        }
        .and_then(|instance| self.check_type(instance));

        if let Some(began) = began {
            match &result {
                Ok(_) => observers.created(&self.name, self.lifetime, hook.is_some(), began.elapsed()),
                Err(error) => observers.failed(&self.name, error),
            }
        }
        result
    }

    fn check_type(&self, instance: AnyArc) -> MakerResult<AnyArc> {
        if (*instance).type_id() == self.stored_type {
            Ok(instance)
        } else {
            Err(MakerError::TypeMismatch {
                entry: self.name.clone(),
                expected: self.type_name,
            })
        }
    }

    fn started(&self, instance: &AnyArc) {
        if let Some(callback) = &self.on_created {
            callback(instance);
        }
    }

    /// Replaces the hook. An already cached singleton is kept until cleared.
    pub(crate) fn install_hook(&self, hook: Arc<dyn MakerHook>) {
        self.hook.store(Some(Arc::new(hook)));
    }

    /// Drops the cached instance; returns whether there was one.
    ///
    /// Waits for a construction of this entry in progress, so the instance it
    /// publishes is the one dropped. A constructor clearing its own entry
    /// deadlocks.
    pub(crate) fn clear(&self) -> bool {
        let _guard = self.lock.acquire();
        self.cached.swap(None).is_some()
    }

    pub(crate) fn shutdown(&self) -> MakerResult<()> {
        let Some(callback) = &self.on_shutdown else {
            return Ok(());
        };

        let cached = self.cached.load_full();
        callback(cached.as_deref()).map_err(|e| MakerError::ShutdownFailure {
            entry: self.name.clone(),
            message: e.to_string(),
        })
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime)
            .field("type_name", &self.type_name)
            .field("has_hook", &self.has_hook())
            .field("is_cached", &self.is_cached())
            .finish()
    }
}
