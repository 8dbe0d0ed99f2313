//! Shutdown capability for cached instances.

use crate::error::BoxError;

/// Trait for instances that release external resources at shutdown.
///
/// Entries opt in with
/// [`EntryDefinition::shutdown_instance`](crate::EntryDefinition::shutdown_instance);
/// the registry then calls `shutdown` on the cached instance from
/// `Registry::shutdown` and `Registry::shutdown_all`.
///
/// # Examples
///
/// ```
/// use maker_registry::{BoxError, ConfigurationBag, EntryDefinition, RegistryBuilder, Resolver, Shutdown};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct Kennel {
///     open: AtomicBool,
/// }
///
/// impl Shutdown for Kennel {
///     fn shutdown(&self) -> Result<(), BoxError> {
///         self.open.store(false, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// let mut builder = RegistryBuilder::new();
/// builder.add(
///     EntryDefinition::singleton("kennel", |_| Ok(Kennel { open: AtomicBool::new(true) }))
///         .shutdown_instance(),
/// );
/// let registry = builder.build(ConfigurationBag::new());
///
/// let kennel = registry.get::<Kennel>("kennel").unwrap();
/// registry.shutdown_all().unwrap();
/// assert!(!kennel.open.load(Ordering::SeqCst));
/// ```
pub trait Shutdown: Send + Sync + 'static {
    /// Release whatever the instance holds.
    fn shutdown(&self) -> Result<(), BoxError>;
}
