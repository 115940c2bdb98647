//! Core traits implemented by other Warden crates.

pub mod cache;

pub use cache::CacheProvider;
