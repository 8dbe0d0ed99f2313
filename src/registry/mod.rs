//! The registry: lookup by name and lifecycle fan-out.
//!
//! The set of entries is frozen when the registry is built. Only per-entry
//! state (cached instance, hook) and the current configuration bag change
//! afterwards, so lookups need no synchronization beyond what each entry does.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::entry::{AnyArc, Entry};
use crate::hook::{HookDiscovery, HookRegistry, MakerHook};
use crate::observer::Observers;
use crate::traits::ResolverCore;
use crate::{ConfigurationBag, EntryDescriptor, Lifetime, MakerError, MakerResult};

pub mod context;
pub use context::MakeContext;

#[cfg(feature = "ahash")]
type IndexHasher = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
type IndexHasher = std::collections::hash_map::RandomState;

/// Fixed set of named entries.
///
/// Cloning is cheap and every clone shares the same entries and caches. The
/// registry is `Send + Sync`; concurrent callers may resolve from any thread.
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, MakerError, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Ceiba { age: u32 }
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_singleton("ceiba", |ctx| Ok(Ceiba { age: ctx.parse("ceiba_age")? }));
/// let registry = builder.build(ConfigurationBag::new());
///
/// // Missing configuration: nothing is cached, so a retry can succeed
/// assert!(matches!(
///     registry.get::<Ceiba>("ceiba"),
///     Err(MakerError::MissingConfiguration(_))
/// ));
/// registry.replace_configuration(ConfigurationBag::new().with("ceiba_age", "120"));
///
/// let first = registry.get::<Ceiba>("ceiba").unwrap();
/// assert_eq!(first.age, 120);
///
/// registry.clear("ceiba").unwrap();
/// let second = registry.get::<Ceiba>("ceiba").unwrap();
/// assert!(!Arc::ptr_eq(&first, &second));
/// ```
pub struct Registry {
    inner: Arc<RegistryInner>,
}

pub(crate) struct RegistryInner {
    entries: Vec<Entry>,
    index: HashMap<String, usize, IndexHasher>,
    config: ArcSwap<ConfigurationBag>,
    observers: Observers,
}

impl Registry {
    pub(crate) fn new(entries: Vec<Entry>, config: ConfigurationBag, observers: Observers) -> Self {
        let mut index = HashMap::with_capacity_and_hasher(entries.len(), IndexHasher::default());
        for (position, entry) in entries.iter().enumerate() {
            index.insert(entry.name().to_string(), position);
        }

        Self {
            inner: Arc::new(RegistryInner {
                entries,
                index,
                config: ArcSwap::from_pointee(config),
                observers,
            }),
        }
    }

    #[inline]
    pub(crate) fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    /// Looks an entry up by name.
    pub fn entry(&self, name: &str) -> MakerResult<&Entry> {
        self.inner
            .index
            .get(name)
            .map(|&position| &self.inner.entries[position])
            .ok_or_else(|| MakerError::UnknownEntry(name.to_string()))
    }

    /// Entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.inner.entries.iter()
    }

    /// Entry names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries().map(Entry::name)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.index.contains_key(name)
    }

    pub fn lifetime(&self, name: &str) -> MakerResult<Lifetime> {
        Ok(self.entry(name)?.lifetime())
    }

    pub fn is_cached(&self, name: &str) -> MakerResult<bool> {
        Ok(self.entry(name)?.is_cached())
    }

    /// Snapshot of every entry's definition and state.
    pub fn descriptors(&self) -> Vec<EntryDescriptor> {
        self.entries().map(EntryDescriptor::of).collect()
    }

    /// The configuration bag used by [`resolve_any`](ResolverCore::resolve_any).
    pub fn configuration(&self) -> Arc<ConfigurationBag> {
        self.inner.config.load_full()
    }

    /// Swaps in a new configuration bag for later constructions.
    ///
    /// Cached singletons keep the state they were built with until cleared.
    pub fn replace_configuration(&self, config: ConfigurationBag) {
        self.inner.config.store(Arc::new(config));
    }

    /// Resolves `name` against an explicit configuration bag.
    ///
    /// Fails with [`MakerError::UnknownEntry`] before any construction if the
    /// name is not registered.
    pub fn resolve_with(&self, name: &str, config: &ConfigurationBag) -> MakerResult<AnyArc> {
        let entry = self.entry(name)?;
        if self.observers().has_observers() {
            self.observers().resolving(name);
        }
        entry.resolve(self, config)
    }

    /// Installs (or replaces) the construction hook of `name`.
    pub fn install_hook(&self, name: &str, hook: Arc<dyn MakerHook>) -> MakerResult<()> {
        self.entry(name)?.install_hook(hook);
        self.observers().hook_installed(name);
        Ok(())
    }

    pub fn has_hook(&self, name: &str) -> MakerResult<bool> {
        Ok(self.entry(name)?.has_hook())
    }

    /// Installs every hook of a manifest.
    ///
    /// All names are checked first; if any is unknown nothing is installed.
    /// Returns the number of hooks installed.
    pub fn install_hooks(&self, hooks: &HookRegistry) -> MakerResult<usize> {
        let targets = hooks
            .iter()
            .map(|(name, hook)| -> MakerResult<_> { Ok((self.entry(name)?, hook)) })
            .collect::<MakerResult<Vec<_>>>()?;

        for (entry, hook) in &targets {
            entry.install_hook(Arc::clone(hook));
            self.observers().hook_installed(entry.name());
        }
        Ok(targets.len())
    }

    /// Runs a discovery collaborator and installs what it found.
    pub fn discover_hooks(&self, discovery: &dyn HookDiscovery) -> MakerResult<usize> {
        let mut hooks = HookRegistry::new();
        discovery.discover(&mut hooks)?;
        self.install_hooks(&hooks)
    }

    /// Drops the cached instance of `name`. A no-op for prototypes.
    ///
    /// Blocks while the entry is being constructed; the next resolution after
    /// `clear` returns always constructs anew.
    pub fn clear(&self, name: &str) -> MakerResult<()> {
        let entry = self.entry(name)?;
        if entry.clear() {
            self.observers().cleared(name);
        }
        Ok(())
    }

    /// Drops every cached instance, in registration order.
    pub fn clear_all(&self) {
        for entry in self.entries() {
            if entry.clear() {
                self.observers().cleared(entry.name());
            }
        }
    }

    /// Runs the shutdown callback of `name`.
    ///
    /// Shutdown does not clear the cache; call [`clear`](Self::clear) for that.
    pub fn shutdown(&self, name: &str) -> MakerResult<()> {
        let entry = self.entry(name)?;
        let outcome = entry.shutdown();
        self.observers().shut_down(name, &outcome);
        outcome
    }

    /// Runs every entry's shutdown callback in registration order.
    ///
    /// Every entry gets its turn regardless of earlier failures. If any failed,
    /// the result is [`MakerError::ShutdownAll`] holding each failure in
    /// registration order.
    pub fn shutdown_all(&self) -> MakerResult<()> {
        let failures: Vec<MakerError> = self
            .entries()
            .filter_map(|entry| {
                let outcome = entry.shutdown();
                self.observers().shut_down(entry.name(), &outcome);
                outcome.err()
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MakerError::ShutdownAll(failures))
        }
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Registry Debug ===\n");
        for entry in self.entries() {
            s.push_str(&format!(
                "  {} ({}): {} hook={} cached={}\n",
                entry.name(),
                entry.type_name(),
                entry.lifetime(),
                entry.has_hook(),
                entry.is_cached()
            ));
        }
        s
    }
}

impl ResolverCore for Registry {
    fn resolve_any(&self, name: &str) -> MakerResult<AnyArc> {
        let config = self.inner.config.load_full();
        self.resolve_with(name, &config)
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.inner.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxError, EntryDefinition, FnHook, RegistryBuilder, Resolver};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn unknown_entry_is_reported_everywhere() {
        let registry = RegistryBuilder::new().build(ConfigurationBag::new());
        assert!(matches!(registry.resolve_any("x"), Err(MakerError::UnknownEntry(_))));
        assert!(matches!(registry.clear("x"), Err(MakerError::UnknownEntry(_))));
        assert!(matches!(registry.shutdown("x"), Err(MakerError::UnknownEntry(_))));
        assert!(matches!(registry.has_hook("x"), Err(MakerError::UnknownEntry(_))));
        assert!(matches!(registry.lifetime("x"), Err(MakerError::UnknownEntry(_))));
    }

    #[test]
    fn install_hooks_is_all_or_nothing() {
        let mut builder = RegistryBuilder::new();
        builder.add_singleton("known", |_| Ok(1u8));
        let registry = builder.build(ConfigurationBag::new());

        let hooks = HookRegistry::new()
            .with("known", Arc::new(FnHook::new(|| Ok(2u8))))
            .with("unknown", Arc::new(FnHook::new(|| Ok(3u8))));

        match registry.install_hooks(&hooks) {
            Err(MakerError::UnknownEntry(name)) => assert_eq!(name, "unknown"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(!registry.has_hook("known").unwrap());
        assert_eq!(*registry.get::<u8>("known").unwrap(), 1);
    }

    #[test]
    fn shutdown_all_runs_in_registration_order_and_collects_failures() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut builder = RegistryBuilder::new();
        for (name, fails) in [("first", true), ("second", false), ("third", true)] {
            let order = order.clone();
            builder.add(EntryDefinition::singleton(name, |_| Ok(())).on_shutdown(
                move |_: Option<&()>| -> Result<(), BoxError> {
                    order.lock().unwrap().push(name);
                    if fails {
                        Err(format!("{} refused", name).into())
                    } else {
                        Ok(())
                    }
                },
            ));
        }
        let registry = builder.build(ConfigurationBag::new());

        match registry.shutdown_all() {
            Err(MakerError::ShutdownAll(failures)) => {
                assert_eq!(failures.len(), 2);
                assert!(matches!(&failures[0], MakerError::ShutdownFailure { entry, .. } if entry == "first"));
                assert!(matches!(&failures[1], MakerError::ShutdownFailure { entry, .. } if entry == "third"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn resolve_with_does_not_touch_registry_configuration() {
        let mut builder = RegistryBuilder::new();
        builder.add_prototype("name", |ctx| Ok(ctx.require("name")?.to_string()));
        let registry = builder.build(ConfigurationBag::new().with("name", "default"));

        let other = ConfigurationBag::new().with("name", "explicit");
        let explicit = registry.resolve_with("name", &other).unwrap();
        assert_eq!(*explicit.downcast::<String>().unwrap(), "explicit");
        assert_eq!(*registry.get::<String>("name").unwrap(), "default");
    }

    #[test]
    fn clones_share_caches() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let mut builder = RegistryBuilder::new();
        builder.add_singleton("shared", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("one"))
        });
        let registry = builder.build(ConfigurationBag::new());
        let clone = registry.clone();

        let a = registry.get::<String>("shared").unwrap();
        let b = clone.get::<String>("shared").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }
}
