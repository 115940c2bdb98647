//! Deterministic storage key derivation for session records.
//!
//! Centralising key construction prevents typos and makes it easy to
//! find every key the session store uses. Two key forms exist per
//! session:
//!
//! - the **index key** `"<uid>_session_<digest>"` under which the
//!   record payload is stored and which the per-user scans enumerate;
//! - the **value key** `"_session_id:<version>::<digest>"`, a versioned
//!   form embedded in the record itself so that previously issued
//!   records self-describe the scheme that produced their keys, letting
//!   the scheme evolve without breaking lookups.

use sha2::{Digest, Sha256};

use warden_core::error::AppError;
use warden_core::result::AppResult;

/// Version of the key derivation scheme, embedded in every value key.
pub const KEY_SCHEME_VERSION: u32 = 2;

/// Lowercase hex SHA-256 digest of a session identifier.
///
/// Used only to distribute keys across the namespace, not for
/// authentication; there is no secret involved.
pub fn digest(session_id: &str) -> String {
    hex::encode(Sha256::digest(session_id.as_bytes()))
}

/// The versioned value key for a session, e.g. `"_session_id:2::<digest>"`.
pub fn encrypted_key(session_id: &str) -> String {
    format!("_session_id:{KEY_SCHEME_VERSION}::{}", digest(session_id))
}

/// The index key under which a session record is stored:
/// `"<uid>_session_<digest>"`.
///
/// Empty identifiers are rejected before derivation; a degenerate key
/// outside any user namespace must never reach the backend.
pub fn storage_key(uid: &str, session_id: &str) -> AppResult<String> {
    if uid.is_empty() {
        return Err(AppError::validation("user uid must not be empty"));
    }
    if session_id.is_empty() {
        return Err(AppError::validation("session id must not be empty"));
    }
    Ok(format!("{uid}_session_{}", digest(session_id)))
}

/// Recovers a session's value key from its index key.
///
/// Best-effort fallback for bulk invalidation when a payload cannot be
/// read back (evicted or undecodable): the digest is lifted from the
/// index key and re-tagged with the current scheme version. Returns
/// `None` if the key does not belong to `uid`'s namespace.
pub fn value_key_from_index(uid: &str, index_key: &str) -> Option<String> {
    let digest = index_key.strip_prefix(&format!("{uid}_session_"))?;
    Some(format!("_session_id:{KEY_SCHEME_VERSION}::{digest}"))
}

/// Glob pattern matching every index key of a user: `"<uid>_session_*"`.
pub fn session_key_pattern(uid: &str) -> AppResult<String> {
    if uid.is_empty() {
        return Err(AppError::validation("user uid must not be empty"));
    }
    Ok(format!("{uid}_session_*"))
}
