//! Entry lifetime definitions.

/// Entry lifetimes controlling instance caching behavior
///
/// Fixed when an entry is defined and never changed afterwards.
///
/// # Examples
///
/// ```rust
/// use maker_registry::{ConfigurationBag, Lifetime, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// struct Kennel { capacity: u32 }
/// struct Puppy;
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_singleton("kennel", |_| Ok(Kennel { capacity: 4 }));
/// builder.add_prototype("puppy", |_| Ok(Puppy));
/// let registry = builder.build(ConfigurationBag::new());
///
/// assert_eq!(registry.lifetime("kennel").unwrap(), Lifetime::Singleton);
///
/// // Singleton: same instance until cleared
/// let k1 = registry.get::<Kennel>("kennel").unwrap();
/// let k2 = registry.get::<Kennel>("kennel").unwrap();
/// assert!(Arc::ptr_eq(&k1, &k2));
/// assert_eq!(k1.capacity, 4);
///
/// // Prototype: a fresh instance on every resolution
/// let p1 = registry.get::<Puppy>("puppy").unwrap();
/// let p2 = registry.get::<Puppy>("puppy").unwrap();
/// assert!(!Arc::ptr_eq(&p1, &p2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// At most one instance, created lazily on first resolution
    ///
    /// The instance is cached by its entry and shared by every caller until the
    /// entry is cleared. Concurrent first resolutions construct exactly once.
    Singleton,
    /// New instance per resolution, never cached
    Prototype,
}

impl Lifetime {
    /// Whether instances of this lifetime are cached.
    pub fn is_singleton(self) -> bool {
        matches!(self, Lifetime::Singleton)
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lifetime::Singleton => f.write_str("singleton"),
            Lifetime::Prototype => f.write_str("prototype"),
        }
    }
}
