//! Session CRUD operations over the key/value backend.

use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use warden_core::config::session::SessionConfig;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_core::traits::cache::CacheProvider;

use crate::keys;
use crate::record::{self, SessionRecord};

/// Session store over a TTL-capable key/value backend.
///
/// Each live session occupies two backend keys written with the same
/// TTL: the index key (scanned per user, read by [`get`](Self::get) and
/// [`list_active`](Self::list_active)) and the value key recorded in
/// the record's `encrypted` field. The store holds no in-process state;
/// all coordination is delegated to the backend's single-key atomicity.
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// The injected key/value backend.
    pub(crate) cache: Arc<dyn CacheProvider>,
    /// Session store configuration.
    config: SessionConfig,
}

impl SessionStore {
    /// Creates a new session store over the given backend.
    pub fn new(cache: Arc<dyn CacheProvider>, config: SessionConfig) -> Self {
        Self { cache, config }
    }

    /// Stores a new session record, or returns the existing one.
    ///
    /// Fetch-or-create: if a value already exists under the session's
    /// index key, the *existing* stored record is returned unchanged;
    /// repeated `add` calls for the same identifier do not refresh
    /// metadata or TTL; only [`update`](Self::update) does. On create,
    /// the record's `encrypted` tag and embedded expiry are populated
    /// and both keys are written with `ttl` (the configured default
    /// when `None`).
    pub async fn add(
        &self,
        uid: &str,
        record: &SessionRecord,
        ttl: Option<Duration>,
    ) -> AppResult<SessionRecord> {
        let key = keys::storage_key(uid, &record.session_id)?;

        if let Some(existing) = self.cache.get(&key).await? {
            debug!(uid, key = %key, "Session already stored, returning existing value");
            return record::decode(&existing);
        }

        let ttl = self.ttl_or_default(ttl);
        let stored = self
            .write(&key, record.clone(), record.last_login_at, ttl)
            .await?;
        debug!(uid, key = %key, "Session stored");
        Ok(stored)
    }

    /// Fetches a session record.
    ///
    /// Returns `NotFound` if the backend has no value (never added, or
    /// already evicted by TTL). Never sweeps and never consults the
    /// embedded logical expiry; only the scanning path pays for that.
    pub async fn get(&self, uid: &str, session_id: &str) -> AppResult<SessionRecord> {
        let key = keys::storage_key(uid, session_id)?;

        match self.cache.get(&key).await? {
            Some(payload) => record::decode(&payload),
            None => Err(AppError::not_found(format!(
                "no session '{session_id}' for user '{uid}'"
            ))),
        }
    }

    /// Overwrites a session record and resets its TTL.
    ///
    /// The target must exist; refreshing an already evicted session is
    /// `NotFound`. `last_login_at` is set to the current time, clamped
    /// so it never decreases relative to the previous stored value.
    /// Last-write-wins: there is no optimistic concurrency check, and
    /// concurrent updates from overlapping requests race by design.
    pub async fn update(
        &self,
        uid: &str,
        record: &SessionRecord,
        ttl: Option<Duration>,
    ) -> AppResult<SessionRecord> {
        let key = keys::storage_key(uid, &record.session_id)?;

        let previous = match self.cache.get(&key).await? {
            Some(payload) => record::decode(&payload)?,
            None => {
                return Err(AppError::not_found(format!(
                    "no session '{}' for user '{uid}' to update",
                    record.session_id
                )));
            }
        };

        let ttl = self.ttl_or_default(ttl);
        let last_login_at = cmp::max(Utc::now(), previous.last_login_at);
        let stored = self
            .write(&key, record.clone(), last_login_at, ttl)
            .await?;
        debug!(uid, key = %key, "Session updated");
        Ok(stored)
    }

    /// Deletes a session's value and index keys.
    ///
    /// Idempotent: deleting an absent session is a no-op.
    pub async fn delete(&self, uid: &str, session_id: &str) -> AppResult<()> {
        let key = keys::storage_key(uid, session_id)?;

        let value_key = match self.cache.get(&key).await? {
            Some(payload) => match record::decode(&payload) {
                Ok(stored) if !stored.encrypted.is_empty() => stored.encrypted,
                // Undecodable or untagged payload: fall back to the
                // current scheme's derivation.
                _ => keys::encrypted_key(session_id),
            },
            None => keys::encrypted_key(session_id),
        };

        self.cache.delete(&value_key).await?;
        self.cache.delete(&key).await?;
        debug!(uid, key = %key, "Session deleted");
        Ok(())
    }

    /// Lists the user's sessions that are still logically valid.
    ///
    /// Scans the user's index keys and decodes each value. Entries
    /// whose embedded expiry has already elapsed are deleted
    /// opportunistically (sweep-on-read) instead of being returned;
    /// those deletions are silent housekeeping, not errors. Decode
    /// failures surface to the caller. No ordering is guaranteed;
    /// callers needing order must sort by `authenticated_at` or
    /// `last_login_at` themselves.
    pub async fn list_active(&self, uid: &str) -> AppResult<Vec<SessionRecord>> {
        let pattern = keys::session_key_pattern(uid)?;
        let session_keys = self.cache.keys(&pattern).await?;

        let now = Utc::now();
        let mut sessions = Vec::with_capacity(session_keys.len());

        for key in &session_keys {
            // A concurrent logout or TTL eviction may race the scan.
            let Some(payload) = self.cache.get(key).await? else {
                continue;
            };
            let record = record::decode(&payload)?;

            if record.is_expired(now) {
                let value_key = if record.encrypted.is_empty() {
                    keys::value_key_from_index(uid, key)
                } else {
                    Some(record.encrypted)
                };
                if let Some(value_key) = value_key {
                    self.cache.delete(&value_key).await?;
                }
                self.cache.delete(key).await?;
                debug!(uid, key = %key, "Swept logically expired session");
            } else {
                sessions.push(record);
            }
        }

        Ok(sessions)
    }

    /// The TTL the store applies when callers do not supply one.
    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl()
    }

    fn ttl_or_default(&self, ttl: Option<Duration>) -> Duration {
        ttl.unwrap_or_else(|| self.config.default_ttl())
    }

    /// Populates the derived fields and writes both keys with `ttl`.
    async fn write(
        &self,
        key: &str,
        mut record: SessionRecord,
        last_login_at: chrono::DateTime<Utc>,
        ttl: Duration,
    ) -> AppResult<SessionRecord> {
        record.last_login_at = last_login_at;
        record.encrypted = keys::encrypted_key(&record.session_id);
        record.expire_time = Some(Utc::now().timestamp() + ttl.as_secs() as i64);

        let payload = record::encode(&record)?;
        self.cache.set(key, &payload, ttl).await?;
        self.cache.set(&record.encrypted, &payload, ttl).await?;
        Ok(record)
    }
}
