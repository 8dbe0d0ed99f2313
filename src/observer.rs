//! Observers for registry lifecycle events.
//!
//! Observers are how the registry reports what it does: resolutions,
//! constructions (default or hooked), construction failures, cache clears,
//! shutdowns and hook installations. They are told about failures, they never
//! decide them; every error still reaches the caller as a `MakerError`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{Lifetime, MakerError, MakerResult};

/// Observer trait for registry events.
///
/// Calls are made synchronously on the resolving thread, and `created`/`failed`
/// run while a singleton's creation lock is held. Keep implementations cheap.
///
/// # Examples
///
/// ```
/// use maker_registry::{ConfigurationBag, Lifetime, MakerError, RegistryBuilder, RegistryObserver, Resolver};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Journal {
///     lines: Mutex<Vec<String>>,
/// }
///
/// impl RegistryObserver for Journal {
///     fn resolving(&self, _name: &str) {}
///
///     fn created(&self, name: &str, lifetime: Lifetime, hooked: bool, _took: Duration) {
///         self.lines.lock().unwrap().push(format!("{} {} hooked={}", lifetime, name, hooked));
///     }
///
///     fn failed(&self, name: &str, error: &MakerError) {
///         self.lines.lock().unwrap().push(format!("{} failed: {}", name, error));
///     }
/// }
///
/// let journal = Arc::new(Journal::default());
/// let mut builder = RegistryBuilder::new();
/// builder.add_observer(journal.clone());
/// builder.add_singleton("sparky", |_| Ok("Sparky".to_string()));
/// let registry = builder.build(ConfigurationBag::new());
///
/// registry.get::<String>("sparky").unwrap();
/// registry.get::<String>("sparky").unwrap();
/// assert_eq!(*journal.lines.lock().unwrap(), vec!["singleton sparky hooked=false"]);
/// ```
pub trait RegistryObserver: Send + Sync {
    /// A lookup of a registered entry started.
    fn resolving(&self, name: &str);

    /// Construction succeeded. `hooked` is true when a hook built the instance.
    fn created(&self, name: &str, lifetime: Lifetime, hooked: bool, duration: Duration);

    /// Default or hook construction failed; the error is returned to the caller.
    fn failed(&self, name: &str, error: &MakerError);

    /// A cached instance was dropped.
    fn cleared(&self, _name: &str) {}

    /// An entry's shutdown ran.
    fn shut_down(&self, _name: &str, _outcome: &MakerResult<()>) {}

    fn hook_installed(&self, _name: &str) {}
}

/// Fan-out over the registered observers.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn RegistryObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn RegistryObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, name: &str) {
        for observer in &self.observers {
            observer.resolving(name);
        }
    }

    #[inline]
    pub(crate) fn created(&self, name: &str, lifetime: Lifetime, hooked: bool, duration: Duration) {
        for observer in &self.observers {
            observer.created(name, lifetime, hooked, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, name: &str, error: &MakerError) {
        for observer in &self.observers {
            observer.failed(name, error);
        }
    }

    pub(crate) fn cleared(&self, name: &str) {
        for observer in &self.observers {
            observer.cleared(name);
        }
    }

    pub(crate) fn shut_down(&self, name: &str, outcome: &MakerResult<()>) {
        for observer in &self.observers {
            observer.shut_down(name, outcome);
        }
    }

    pub(crate) fn hook_installed(&self, name: &str) {
        for observer in &self.observers {
            observer.hook_installed(name);
        }
    }
}

/// Observer that prints every event.
///
/// Successful events go to stdout, failures to stderr, each line starting with
/// the configured prefix.
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a logging observer with the `[maker]` prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[maker]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryObserver for LoggingObserver {
    fn resolving(&self, name: &str) {
        println!("{} Resolving: {}", self.prefix, name);
    }

    fn created(&self, name: &str, lifetime: Lifetime, hooked: bool, duration: Duration) {
        let origin = if hooked { "hook" } else { "default" };
        println!(
            "{} Created {} {} via {} in {:?}",
            self.prefix, lifetime, name, origin, duration
        );
    }

    fn failed(&self, name: &str, error: &MakerError) {
        eprintln!("{} FAILED {}: {}", self.prefix, name, error);
    }

    fn cleared(&self, name: &str) {
        println!("{} Cleared: {}", self.prefix, name);
    }

    fn shut_down(&self, name: &str, outcome: &MakerResult<()>) {
        match outcome {
            Ok(()) => println!("{} Shut down: {}", self.prefix, name),
            Err(e) => eprintln!("{} Shutdown FAILED {}: {}", self.prefix, name, e),
        }
    }

    fn hook_installed(&self, name: &str) {
        println!("{} Hook installed: {}", self.prefix, name);
    }
}

/// Observer counting constructions and construction time.
pub struct MetricsObserver {
    pub constructions: AtomicU64,
    pub hooked_constructions: AtomicU64,
    pub failures: AtomicU64,
    pub total_construction_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self {
            constructions: AtomicU64::new(0),
            hooked_constructions: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            total_construction_nanos: AtomicU64::new(0),
        }
    }

    /// Successful constructions, default and hooked.
    pub fn construction_count(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }

    pub fn hooked_count(&self) -> u64 {
        self.hooked_constructions.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn total_construction_time(&self) -> Duration {
        Duration::from_nanos(self.total_construction_nanos.load(Ordering::Relaxed))
    }

    pub fn average_construction_time(&self) -> Option<Duration> {
        let count = self.construction_count();
        if count == 0 {
            return None;
        }
        let total = self.total_construction_nanos.load(Ordering::Relaxed);
        Some(Duration::from_nanos(total / count))
    }

    pub fn reset(&self) {
        self.constructions.store(0, Ordering::Relaxed);
        self.hooked_constructions.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.total_construction_nanos.store(0, Ordering::Relaxed);
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryObserver for MetricsObserver {
    fn resolving(&self, _name: &str) {}

    fn created(&self, _name: &str, _lifetime: Lifetime, hooked: bool, duration: Duration) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
        if hooked {
            self.hooked_constructions.fetch_add(1, Ordering::Relaxed);
        }
        self.total_construction_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn failed(&self, _name: &str, _error: &MakerError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigurationBag, FnHook, RegistryBuilder, Resolver};

    #[test]
    fn metrics_count_default_hooked_and_failed() {
        let metrics = Arc::new(MetricsObserver::new());
        let mut builder = RegistryBuilder::new();
        builder.add_observer(metrics.clone());
        builder.add_prototype("labrador", |_| Ok(1u32));
        builder.add_singleton("ceiba", |ctx| ctx.parse::<u32>("ceiba_age"));
        let registry = builder.build(ConfigurationBag::new());

        registry.get::<u32>("labrador").unwrap();
        registry.get::<u32>("labrador").unwrap();
        assert!(registry.get::<u32>("ceiba").is_err());
        registry
            .install_hook("labrador", Arc::new(FnHook::new(|| Ok(2u32))))
            .unwrap();
        registry.get::<u32>("labrador").unwrap();

        assert_eq!(metrics.construction_count(), 3);
        assert_eq!(metrics.hooked_count(), 1);
        assert_eq!(metrics.failure_count(), 1);
        assert!(metrics.average_construction_time().is_some());

        metrics.reset();
        assert_eq!(metrics.construction_count(), 0);
        assert!(metrics.average_construction_time().is_none());
    }

    #[test]
    fn average_handles_counts_beyond_u32() {
        let metrics = MetricsObserver::new();
        let count = 1u64 << 32;
        metrics.constructions.store(count, Ordering::Relaxed);
        metrics.total_construction_nanos.store(count * 3, Ordering::Relaxed);
        assert_eq!(metrics.average_construction_time(), Some(Duration::from_nanos(3)));

        metrics.constructions.store(count + 1, Ordering::Relaxed);
        metrics.total_construction_nanos.store((count + 1) * 7, Ordering::Relaxed);
        assert_eq!(metrics.average_construction_time(), Some(Duration::from_nanos(7)));
    }

    #[test]
    fn fast_path_hits_are_not_constructions() {
        let metrics = Arc::new(MetricsObserver::new());
        let mut builder = RegistryBuilder::new();
        builder.add_observer(metrics.clone());
        builder.add_singleton("sparky", |_| Ok("Sparky".to_string()));
        let registry = builder.build(ConfigurationBag::new());

        for _ in 0..5 {
            registry.get::<String>("sparky").unwrap();
        }
        assert_eq!(metrics.construction_count(), 1);
    }
}
