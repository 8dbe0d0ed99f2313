//! Registry builder.
//!
//! Definitions are collected in registration order and frozen by
//! [`RegistryBuilder::build`]; the resulting registry can never gain or lose
//! entries.

use std::any::Any;
use std::sync::Arc;

use crate::entry::{Entry, EntryDefinition};
use crate::observer::{Observers, RegistryObserver};
use crate::registry::MakeContext;
use crate::{ConfigurationBag, MakerResult, Registry};

/// Collects entry definitions and builds a [`Registry`].
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Animal: Send + Sync {
///     fn noise(&self) -> &'static str;
/// }
///
/// struct Cat;
/// impl Animal for Cat {
///     fn noise(&self) -> &'static str { "meow" }
/// }
///
/// let mut builder = RegistryBuilder::new();
/// builder
///     .add_singleton("daisy_kind", |ctx| Ok(ctx.require("daisy_kind")?.to_string()))
///     .add_prototype_trait::<dyn Animal, _>("siamese", |_| Ok(Arc::new(Cat) as Arc<dyn Animal>));
///
/// let registry = builder.build(ConfigurationBag::new().with("daisy_kind", "oxeye"));
/// assert_eq!(registry.names().collect::<Vec<_>>(), vec!["daisy_kind", "siamese"]);
/// assert_eq!(registry.get_trait::<dyn Animal>("siamese").unwrap().noise(), "meow");
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
    observers: Observers,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            observers: Observers::new(),
        }
    }

    /// Adds a definition.
    ///
    /// A definition with an already used name replaces the earlier one and
    /// keeps its position.
    pub fn add<S>(&mut self, definition: EntryDefinition<S>) -> &mut Self
    where
        S: Any + Send + Sync,
    {
        let entry = definition.into_entry();
        match self.entries.iter().position(|e| e.name() == entry.name()) {
            Some(position) => self.entries[position] = entry,
            None => self.entries.push(entry),
        }
        self
    }

    pub fn add_singleton<T, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&MakeContext<'_>) -> MakerResult<T> + Send + Sync + 'static,
    {
        self.add(EntryDefinition::singleton(name, ctor))
    }

    pub fn add_prototype<T, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&MakeContext<'_>) -> MakerResult<T> + Send + Sync + 'static,
    {
        self.add(EntryDefinition::prototype(name, ctor))
    }

    /// Adds a singleton exposed as a capability (`Arc<dyn Trait>`).
    pub fn add_singleton_trait<T, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&MakeContext<'_>) -> MakerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(EntryDefinition::<Arc<T>>::singleton(name, ctor))
    }

    /// Adds a prototype exposed as a capability (`Arc<dyn Trait>`).
    pub fn add_prototype_trait<T, F>(&mut self, name: impl Into<String>, ctor: F) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&MakeContext<'_>) -> MakerResult<Arc<T>> + Send + Sync + 'static,
    {
        self.add(EntryDefinition::<Arc<T>>::prototype(name, ctor))
    }

    pub fn add_observer(&mut self, observer: Arc<dyn RegistryObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name() == name)
    }

    /// Freezes the definitions into a registry that resolves against `config`.
    pub fn build(self, config: ConfigurationBag) -> Registry {
        Registry::new(self.entries, config, self.observers)
    }
}
