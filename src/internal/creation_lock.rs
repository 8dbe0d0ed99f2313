//! Per-entry lock serializing first-time singleton construction.

#[cfg(feature = "parking-lot")]
pub(crate) type CreationGuard<'a> = parking_lot::MutexGuard<'a, ()>;
#[cfg(not(feature = "parking-lot"))]
pub(crate) type CreationGuard<'a> = std::sync::MutexGuard<'a, ()>;

/// Exclusive lock owned by a single entry.
///
/// Guards no data of its own; holding it is what makes check-construct-store
/// atomic with respect to other resolvers of the same entry.
#[derive(Default)]
pub(crate) struct CreationLock {
    #[cfg(feature = "parking-lot")]
    inner: parking_lot::Mutex<()>,
    #[cfg(not(feature = "parking-lot"))]
    inner: std::sync::Mutex<()>,
}

impl CreationLock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock is held.
    ///
    /// A constructor that panicked while holding the std mutex poisons it; the
    /// cache slot was never written in that case, so the poison is ignored.
    pub(crate) fn acquire(&self) -> CreationGuard<'_> {
        #[cfg(feature = "parking-lot")]
        {
            self.inner.lock()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            self.inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }
    }
}
