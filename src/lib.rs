//! # maker-registry
//!
//! A small, reflection-free object lifecycle registry: a fixed, enumerable set
//! of named entries, each either a singleton or a prototype, each building its
//! instance from a configuration bag, and each overridable at runtime by a hook.
//!
//! ## Features
//!
//! - **Named entries**: lookup by name, typed access through [`Resolver`]
//! - **Singleton and prototype** lifetimes; singletons are created lazily and at most once
//! - **Thread-safe**: lock-free cached reads, one creation lock per entry
//! - **Failure never caches**: a failed construction can simply be retried
//! - **Hooks**: replace an entry's construction logic without touching its definition
//! - **Lifecycle**: post-construction callbacks, shutdown, clear
//!
//! ## Quick Start
//!
//! ```rust
//! use maker_registry::{ConfigurationBag, RegistryBuilder, Resolver};
//! use std::sync::Arc;
//!
//! struct Dog {
//!     name: String,
//! }
//!
//! struct DogFamily {
//!     parent: Arc<Dog>,
//! }
//!
//! let mut builder = RegistryBuilder::new();
//! builder.add_singleton("sparky", |ctx| {
//!     Ok(Dog { name: ctx.require("sparky.name")?.to_string() })
//! });
//! builder.add_singleton("sparky_family", |ctx| {
//!     Ok(DogFamily { parent: ctx.get::<Dog>("sparky")? })
//! });
//! builder.add_prototype("labrador", |_| Ok(Dog { name: "Lab".to_string() }));
//!
//! let registry = builder.build(ConfigurationBag::new().with("sparky.name", "Sparky"));
//!
//! let family = registry.get::<DogFamily>("sparky_family").unwrap();
//! assert_eq!(family.parent.name, "Sparky");
//!
//! let lab1 = registry.get::<Dog>("labrador").unwrap();
//! let lab2 = registry.get::<Dog>("labrador").unwrap();
//! assert!(!Arc::ptr_eq(&lab1, &lab2));
//! ```
//!
//! ## Hooks
//!
//! ```rust
//! use maker_registry::{ConfigurationBag, FnHook, RegistryBuilder, Resolver};
//! use std::sync::Arc;
//!
//! let mut builder = RegistryBuilder::new();
//! builder.add_singleton("greeting", |_| Ok("hello".to_string()));
//! let registry = builder.build(ConfigurationBag::new());
//!
//! registry
//!     .install_hook("greeting", Arc::new(FnHook::new(|| Ok("bonjour".to_string()))))
//!     .unwrap();
//! assert_eq!(*registry.get::<String>("greeting").unwrap(), "bonjour");
//! ```
//!
//! ## Concurrency
//!
//! A singleton's cached instance is read without locking. The first resolutions
//! race for that entry's creation lock; the winner constructs, runs the
//! post-construction callback and publishes the instance, and everyone else
//! observes it. A constructor that never returns blocks every resolver of that
//! entry; there is no timeout. Locks are per entry, so other entries are never
//! blocked by it.

// Module declarations
pub mod collection;
pub mod config;
pub mod descriptors;
pub mod entry;
pub mod error;
pub mod hook;
pub mod lifetime;
pub mod observer;
pub mod registry;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use collection::RegistryBuilder;
pub use config::ConfigurationBag;
pub use descriptors::EntryDescriptor;
pub use entry::{AnyArc, Entry, EntryDefinition};
pub use error::{BoxError, MakerError, MakerResult};
pub use hook::{FnHook, HookDiscovery, HookRegistry, MakerHook};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, MetricsObserver, RegistryObserver};
pub use registry::{MakeContext, Registry};
pub use traits::{Resolver, ResolverCore, Shutdown};
