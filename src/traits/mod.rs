//! Core traits for the registry.

mod resolver;
mod shutdown;

pub use resolver::{Resolver, ResolverCore};
pub use shutdown::Shutdown;
