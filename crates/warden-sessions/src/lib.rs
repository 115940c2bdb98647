//! # warden-sessions
//!
//! The distributed session store: tracks authenticated device/browser
//! sessions per user on top of a TTL-capable key/value backend.
//!
//! - [`keys`]: deterministic, namespaced storage key derivation
//! - [`record`]: session metadata payload codec
//! - [`store`]: CRUD operations ([`SessionStore`])
//! - [`invalidator`]: bulk revocation and expiry sweeps
//!   ([`SessionInvalidator`])
//!
//! The backend is injected as an [`Arc<dyn CacheProvider>`]; the store
//! holds no process-wide state and delegates all coordination to the
//! backend's single-key atomicity. Multi-step scans are not atomic and
//! may observe concurrent mutation.
//!
//! [`Arc<dyn CacheProvider>`]: warden_core::traits::cache::CacheProvider

pub mod invalidator;
pub mod keys;
pub mod record;
pub mod store;

pub use invalidator::SessionInvalidator;
pub use record::SessionRecord;
pub use store::SessionStore;
