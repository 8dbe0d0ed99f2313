//! Construction hooks and hook discovery.
//!
//! A hook replaces an entry's default construction logic. It takes no
//! configuration: whatever it needs was captured when it was built. Locating
//! hooks is left to a [`HookDiscovery`] collaborator run by application start-up
//! code; the registry only installs what it is handed.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::entry::AnyArc;
use crate::error::MakerResult;

/// Override constructor for a single entry.
///
/// The returned value must have the type the entry stores: `T` for entries
/// added with `add_singleton`/`add_prototype`, `Arc<dyn Trait>` for capability
/// entries. [`FnHook`] takes care of the wrapping.
pub trait MakerHook: Send + Sync {
    fn make_instance(&self) -> MakerResult<AnyArc>;
}

/// Hook backed by a closure producing the entry's stored type.
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, FnHook, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Dog { name: String }
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_prototype("labrador", |_| Ok(Dog { name: "Lab".into() }));
/// let registry = builder.build(ConfigurationBag::new());
///
/// registry
///     .install_hook("labrador", Arc::new(FnHook::new(|| Ok(Dog { name: "Golden".into() }))))
///     .unwrap();
/// assert_eq!(registry.get::<Dog>("labrador").unwrap().name, "Golden");
/// ```
pub struct FnHook<S, F> {
    make: F,
    _stored: PhantomData<fn() -> S>,
}

impl<S, F> FnHook<S, F>
where
    S: Any + Send + Sync,
    F: Fn() -> MakerResult<S> + Send + Sync,
{
    pub fn new(make: F) -> Self {
        Self {
            make,
            _stored: PhantomData,
        }
    }
}

impl<S, F> MakerHook for FnHook<S, F>
where
    S: Any + Send + Sync,
    F: Fn() -> MakerResult<S> + Send + Sync,
{
    fn make_instance(&self) -> MakerResult<AnyArc> {
        let value = (self.make)()?;
        Ok(Arc::new(value) as AnyArc)
    }
}

/// Ordered manifest of hooks keyed by entry name.
///
/// Registering a second hook for the same entry replaces the first one but keeps
/// its original position.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<(String, Arc<dyn MakerHook>)>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the hook for `name`.
    pub fn register(&mut self, name: impl Into<String>, hook: Arc<dyn MakerHook>) -> &mut Self {
        let name = name.into();
        match self.hooks.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = hook,
            None => self.hooks.push((name, hook)),
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, hook: Arc<dyn MakerHook>) -> Self {
        self.register(name, hook);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn MakerHook>> {
        self.hooks.iter().find(|(n, _)| n == name).map(|(_, h)| h)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Entry names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn MakerHook>)> {
        self.hooks.iter().map(|(n, h)| (n.as_str(), h))
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("entries", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Start-up collaborator that supplies hooks before the first resolution.
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, FnHook, HookRegistry, MakerResult, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// fn application_hooks(hooks: &mut HookRegistry) -> MakerResult<()> {
///     hooks.register("greeting", Arc::new(FnHook::new(|| Ok("hola".to_string()))));
///     Ok(())
/// }
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_singleton("greeting", |_| Ok("hello".to_string()));
/// let registry = builder.build(ConfigurationBag::new());
///
/// assert_eq!(registry.discover_hooks(&application_hooks).unwrap(), 1);
/// assert_eq!(*registry.get::<String>("greeting").unwrap(), "hola");
/// ```
pub trait HookDiscovery {
    /// Adds every hook this collaborator knows about to `hooks`.
    fn discover(&self, hooks: &mut HookRegistry) -> MakerResult<()>;
}

impl<F> HookDiscovery for F
where
    F: Fn(&mut HookRegistry) -> MakerResult<()>,
{
    fn discover(&self, hooks: &mut HookRegistry) -> MakerResult<()> {
        self(hooks)
    }
}

impl HookDiscovery for HookRegistry {
    fn discover(&self, hooks: &mut HookRegistry) -> MakerResult<()> {
        for (name, hook) in self.iter() {
            hooks.register(name, hook.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MakerError;

    fn constant(value: u32) -> Arc<dyn MakerHook> {
        Arc::new(FnHook::new(move || Ok(value)))
    }

    #[test]
    fn fn_hook_wraps_stored_type() {
        let out = constant(7).make_instance().unwrap();
        assert_eq!(*out.downcast::<u32>().unwrap(), 7);
    }

    #[test]
    fn fn_hook_propagates_failure() {
        let hook = FnHook::new(|| -> MakerResult<u32> {
            Err(MakerError::construction("hooked", "backend offline"))
        });
        assert!(matches!(
            hook.make_instance(),
            Err(MakerError::ConstructionFailure { .. })
        ));
    }

    #[test]
    fn later_registration_overwrites_in_place() {
        let mut hooks = HookRegistry::new();
        hooks.register("a", constant(1));
        hooks.register("b", constant(2));
        hooks.register("a", constant(3));

        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks.names().collect::<Vec<_>>(), vec!["a", "b"]);
        let a = hooks.get("a").unwrap().make_instance().unwrap();
        assert_eq!(*a.downcast::<u32>().unwrap(), 3);
    }

    #[test]
    fn manifest_discovery_copies_everything() {
        let source = HookRegistry::new().with("x", constant(1)).with("y", constant(2));
        let mut target = HookRegistry::new().with("x", constant(9));

        source.discover(&mut target).unwrap();
        assert_eq!(target.len(), 2);
        let x = target.get("x").unwrap().make_instance().unwrap();
        assert_eq!(*x.downcast::<u32>().unwrap(), 1);
    }
}
