//! Entry descriptors for introspection and diagnostics.

use crate::entry::Entry;
use crate::lifetime::Lifetime;

/// Point-in-time description of a registered entry
///
/// The definition part (name, lifetime, stored type) never changes; `has_hook`
/// and `is_cached` reflect the moment the descriptor was taken.
///
/// # Examples
///
/// ```rust
/// use maker_registry::{ConfigurationBag, Lifetime, RegistryBuilder, Resolver};
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_singleton("sparky", |_| Ok("Sparky".to_string()));
/// builder.add_prototype("labrador", |_| Ok(3u8));
/// let registry = builder.build(ConfigurationBag::new());
/// registry.get::<String>("sparky").unwrap();
///
/// let descriptors = registry.descriptors();
/// assert_eq!(descriptors[0].name, "sparky");
/// assert!(descriptors[0].is_cached);
/// assert_eq!(descriptors[1].lifetime, Lifetime::Prototype);
/// assert_eq!(descriptors[1].type_name, "u8");
/// assert!(!descriptors[1].is_cached);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDescriptor {
    pub name: String,
    pub lifetime: Lifetime,
    /// Stored type (`Arc<dyn Trait>` for capability entries)
    pub type_name: &'static str,
    pub has_hook: bool,
    pub is_cached: bool,
}

impl EntryDescriptor {
    pub(crate) fn of(entry: &Entry) -> Self {
        Self {
            name: entry.name().to_string(),
            lifetime: entry.lifetime(),
            type_name: entry.type_name(),
            has_hook: entry.has_hook(),
            is_cached: entry.is_cached(),
        }
    }

    pub fn is_singleton(&self) -> bool {
        self.lifetime.is_singleton()
    }
}
