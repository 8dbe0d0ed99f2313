//! Resolver traits for entry lookup.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::entry::AnyArc;
use crate::error::{MakerError, MakerResult};

/// Object-safe lookup by entry name.
///
/// Implemented by [`Registry`](crate::Registry) and by the
/// [`MakeContext`](crate::MakeContext) handed to constructors. Most callers use
/// the typed methods of [`Resolver`] instead.
pub trait ResolverCore: Send + Sync {
    /// Resolves the named entry to its type-erased instance.
    ///
    /// * `Ok(AnyArc)` - cached singleton, fresh prototype, or hook output
    /// * `Err(MakerError)` - unknown name, configuration or construction failure
    fn resolve_any(&self, name: &str) -> MakerResult<AnyArc>;
}

/// Typed lookup built on [`ResolverCore`].
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, RegistryBuilder, Resolver};
/// use std::sync::Arc;
///
/// trait Plant: Send + Sync {
///     fn grow(&self) -> &str;
/// }
///
/// struct Daisy;
/// impl Plant for Daisy {
///     fn grow(&self) -> &str { "daisy grows" }
/// }
///
/// let mut builder = RegistryBuilder::new();
/// builder.add_singleton("answer", |_| Ok(42u32));
/// builder.add_prototype_trait::<dyn Plant, _>("daisy", |_| Ok(Arc::new(Daisy) as Arc<dyn Plant>));
/// let registry = builder.build(ConfigurationBag::new());
///
/// assert_eq!(*registry.get::<u32>("answer").unwrap(), 42);
/// assert_eq!(registry.get_trait::<dyn Plant>("daisy").unwrap().grow(), "daisy grows");
///
/// // Asking for the wrong type is an error, not a panic
/// assert!(registry.get::<String>("answer").is_err());
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete entry.
    fn get<T>(&self, name: &str) -> MakerResult<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let any = self.resolve_any(name)?;
        any.downcast::<T>().map_err(|_| MakerError::TypeMismatch {
            entry: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Resolves a capability entry registered as `Arc<dyn Trait>`.
    fn get_trait<T>(&self, name: &str) -> MakerResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let any = self.resolve_any(name)?;
        // Capability entries store Arc<Arc<dyn Trait>>
        any.downcast::<Arc<T>>()
            .map(|outer| (*outer).clone())
            .map_err(|_| MakerError::TypeMismatch {
                entry: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolves a concrete entry, panicking on failure.
    fn get_required<T>(&self, name: &str) -> Arc<T>
    where
        T: Any + Send + Sync,
    {
        self.get::<T>(name)
            .unwrap_or_else(|e| panic!("failed to resolve {}: {}", name, e))
    }

    /// Resolves a capability entry, panicking on failure.
    fn get_required_trait<T>(&self, name: &str) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_trait::<T>(name)
            .unwrap_or_else(|e| panic!("failed to resolve {}: {}", name, e))
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}
