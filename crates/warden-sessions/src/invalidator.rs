//! Bulk session revocation and expiry sweeps.

use chrono::Utc;
use tracing::{info, warn};

use warden_core::result::AppResult;

use crate::keys;
use crate::record;
use crate::store::SessionStore;

/// Bulk operations over a user's sessions, built on [`SessionStore`]
/// and the backend's key-pattern scan.
///
/// Scans are not atomic: sessions may be added or removed by concurrent
/// callers between the scan and the per-key deletions. Session
/// bookkeeping is not a security boundary by itself, so a transiently
/// stale or missing entry is accepted.
#[derive(Debug, Clone)]
pub struct SessionInvalidator {
    store: SessionStore,
}

impl SessionInvalidator {
    /// Creates a new invalidator over the store's backend.
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Revokes a single session.
    pub async fn revoke(&self, uid: &str, session_id: &str) -> AppResult<()> {
        self.store.delete(uid, session_id).await
    }

    /// Revokes every session of a user, optionally keeping one alive.
    ///
    /// Two-phase:
    ///
    /// 1. scan the user's index keys and delete the value entry of
    ///    every session *except* the kept one;
    /// 2. delete **every** index key, including the kept session's.
    ///
    /// After `invalidate_all(uid, Some("abc"))` the kept session's
    /// value entry may still sit in the backend until TTL eviction
    /// (phase 1 skipped it), but the session is gone from `get` and
    /// `list_active` because its index key was removed in phase 2.
    /// This asymmetry is deliberate and pinned by tests.
    ///
    /// Returns the number of sessions revoked (the kept one excluded).
    pub async fn invalidate_all(
        &self,
        uid: &str,
        keep_session_id: Option<&str>,
    ) -> AppResult<u64> {
        let pattern = keys::session_key_pattern(uid)?;
        let session_keys = self.store.cache.keys(&pattern).await?;

        let keep_key = keep_session_id
            .map(|sid| keys::storage_key(uid, sid))
            .transpose()?;

        // Phase 1: delete value entries of everything but the kept session.
        let mut revoked = 0u64;
        for key in &session_keys {
            if keep_key.as_deref() == Some(key.as_str()) {
                continue;
            }
            self.delete_value_entry(uid, key).await?;
            revoked += 1;
        }

        // Phase 2: delete every index key, the kept session's included.
        for key in &session_keys {
            self.store.cache.delete(key).await?;
        }

        info!(uid, revoked, "Invalidated user sessions");
        Ok(revoked)
    }

    /// Deletes every logically expired session of a user.
    ///
    /// The same sweep `list_active` performs on read, as a standalone
    /// maintenance pass. Undecodable payloads are left in place (they
    /// surface as errors on the read path) and logged. Returns the
    /// number of sessions removed.
    pub async fn sweep_expired(&self, uid: &str) -> AppResult<u64> {
        let pattern = keys::session_key_pattern(uid)?;
        let session_keys = self.store.cache.keys(&pattern).await?;

        let now = Utc::now();
        let mut removed = 0u64;

        for key in &session_keys {
            let Some(payload) = self.store.cache.get(key).await? else {
                continue;
            };
            match record::decode(&payload) {
                Ok(record) if record.is_expired(now) => {
                    let value_key = if record.encrypted.is_empty() {
                        keys::value_key_from_index(uid, key)
                    } else {
                        Some(record.encrypted)
                    };
                    if let Some(value_key) = value_key {
                        self.store.cache.delete(&value_key).await?;
                    }
                    self.store.cache.delete(key).await?;
                    removed += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(uid, key = %key, error = %e, "Skipping undecodable session payload");
                }
            }
        }

        if removed > 0 {
            info!(uid, removed, "Swept expired sessions");
        }
        Ok(removed)
    }

    /// Deletes the value entry referenced by an index key, falling back
    /// to the derived value key when the payload is gone or corrupt.
    async fn delete_value_entry(&self, uid: &str, index_key: &str) -> AppResult<()> {
        let value_key = match self.store.cache.get(index_key).await? {
            Some(payload) => match record::decode(&payload) {
                Ok(record) if !record.encrypted.is_empty() => Some(record.encrypted),
                Ok(_) => keys::value_key_from_index(uid, index_key),
                Err(e) => {
                    warn!(uid, key = %index_key, error = %e, "Undecodable session payload during invalidation");
                    keys::value_key_from_index(uid, index_key)
                }
            },
            None => keys::value_key_from_index(uid, index_key),
        };

        if let Some(value_key) = value_key {
            self.store.cache.delete(&value_key).await?;
        }
        Ok(())
    }
}
