//! Internal implementation details.

pub(crate) mod creation_lock;

pub(crate) use creation_lock::CreationLock;
