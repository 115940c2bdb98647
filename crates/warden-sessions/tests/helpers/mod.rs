//! Shared test helpers for integration tests.

use std::sync::{Arc, Once};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;

use warden_cache::CacheManager;
use warden_cache::memory::MemoryCacheProvider;
use warden_core::config::cache::MemoryCacheConfig;
use warden_core::config::session::SessionConfig;
use warden_sessions::{SessionRecord, SessionStore};

/// TTL used by most tests.
pub const TTL: Duration = Duration::from_secs(3600);

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warden=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// An in-memory backend and a session store on top of it.
///
/// The cache handle is returned separately so tests can poke at raw
/// backend keys (corrupt payloads, value entries, TTL behavior).
pub fn test_store() -> (Arc<CacheManager>, SessionStore) {
    init_tracing();
    let provider = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
    let cache = Arc::new(CacheManager::from_provider(provider));
    let store = SessionStore::new(cache.clone(), SessionConfig::default());
    (cache, store)
}

/// A session record as the login flow would hand it to the store.
pub fn login_record(session_id: &str) -> SessionRecord {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    SessionRecord {
        session_id: session_id.to_string(),
        user_ip: "1.2.3.4".to_string(),
        user_ip_country: "US".to_string(),
        user_agent: "UA1".to_string(),
        authenticated_at: t0,
        last_login_at: t0,
        encrypted: String::new(),
        expire_time: None,
    }
}
