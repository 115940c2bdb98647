//! # warden-cache
//!
//! Key/value backend providers for the Warden session store:
//!
//! - **memory**: In-process backend using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis backend using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
