//! In-memory backend provider.

pub mod store;

pub use store::MemoryCacheProvider;
