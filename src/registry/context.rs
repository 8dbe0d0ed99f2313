//! Construction context handed to entry constructors.

use std::fmt;
use std::str::FromStr;

use crate::entry::AnyArc;
use crate::traits::ResolverCore;
use crate::{ConfigurationBag, MakerError, MakerResult, Registry};

/// Context passed to constructors for reading configuration and wiring entries.
///
/// Lookups made through the context resolve against the same configuration bag
/// as the entry being built.
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Dog { name: String }
/// struct DogFamily { parents: (Arc<Dog>, Arc<Dog>) }
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_singleton("sparky", |ctx| Ok(Dog { name: ctx.require("sparky.name")?.into() }));
/// builder.add_singleton("pinky", |ctx| Ok(Dog { name: ctx.require("pinky.name")?.into() }));
/// builder.add_singleton("sparky_family", |ctx| {
///     Ok(DogFamily { parents: (ctx.get::<Dog>("sparky")?, ctx.get::<Dog>("pinky")?) })
/// });
///
/// let config = ConfigurationBag::new()
///     .with("sparky.name", "Sparky")
///     .with("pinky.name", "Pinky");
/// let registry = builder.build(config);
///
/// let family = registry.get::<DogFamily>("sparky_family").unwrap();
/// assert_eq!(family.parents.1.name, "Pinky");
/// assert!(Arc::ptr_eq(&family.parents.0, &registry.get::<Dog>("sparky").unwrap()));
/// ```
pub struct MakeContext<'a> {
    registry: &'a Registry,
    config: &'a ConfigurationBag,
    entry: &'a str,
}

impl<'a> MakeContext<'a> {
    pub(crate) fn new(registry: &'a Registry, config: &'a ConfigurationBag, entry: &'a str) -> Self {
        Self {
            registry,
            config,
            entry,
        }
    }

    pub fn config(&self) -> &'a ConfigurationBag {
        self.config
    }

    /// Name of the entry being constructed.
    pub fn entry_name(&self) -> &'a str {
        self.entry
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Shortcut for [`ConfigurationBag::require`].
    pub fn require(&self, key: &str) -> MakerResult<&'a str> {
        self.config.require(key)
    }

    /// Shortcut for [`ConfigurationBag::parse`].
    pub fn parse<T>(&self, key: &str) -> MakerResult<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.config.parse(key)
    }

    /// Wraps any error as a construction failure of this entry.
    pub fn fail(&self, error: impl fmt::Display) -> MakerError {
        MakerError::construction(self.entry, error)
    }
}

impl ResolverCore for MakeContext<'_> {
    fn resolve_any(&self, name: &str) -> MakerResult<AnyArc> {
        self.registry.resolve_with(name, self.config)
    }
}
