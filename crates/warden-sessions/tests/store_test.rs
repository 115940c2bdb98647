//! Integration tests for session CRUD over the in-memory backend.

mod helpers;

use chrono::Utc;

use warden_core::error::ErrorKind;
use warden_core::traits::cache::CacheProvider;
use warden_sessions::keys;
use warden_sessions::record;

use helpers::{TTL, login_record, test_store};

#[tokio::test]
async fn test_add_then_get_returns_stored_record() {
    let (_cache, store) = test_store();
    let record = login_record("abc");

    let stored = store.add("U1", &record, Some(TTL)).await.unwrap();
    let fetched = store.get("U1", "abc").await.unwrap();

    assert_eq!(fetched, stored);
    assert_eq!(fetched.session_id, record.session_id);
    assert_eq!(fetched.user_ip, record.user_ip);
    assert_eq!(fetched.user_ip_country, record.user_ip_country);
    assert_eq!(fetched.user_agent, record.user_agent);
    assert_eq!(fetched.authenticated_at, record.authenticated_at);
    assert_eq!(fetched.last_login_at, record.last_login_at);
    assert_eq!(fetched.encrypted, keys::encrypted_key("abc"));
    assert!(fetched.expire_time.is_some());
}

#[tokio::test]
async fn test_add_writes_value_entry_alongside_index_key() {
    let (cache, store) = test_store();
    store
        .add("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap();

    let value_entry = cache.get(&keys::encrypted_key("abc")).await.unwrap();
    assert!(value_entry.is_some());
    assert_eq!(
        record::decode(&value_entry.unwrap()).unwrap().session_id,
        "abc"
    );
}

#[tokio::test]
async fn test_add_is_fetch_or_create() {
    let (_cache, store) = test_store();
    let first = store
        .add("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap();

    // A second add with fresher metadata must not overwrite anything.
    let mut changed = login_record("abc");
    changed.user_agent = "UA2".to_string();
    changed.last_login_at = Utc::now();
    let second = store.add("U1", &changed, Some(TTL)).await.unwrap();

    assert_eq!(second, first);
    assert_eq!(store.get("U1", "abc").await.unwrap().user_agent, "UA1");
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found() {
    let (_cache, store) = test_store();
    let err = store.get("U1", "never-added").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let (cache, store) = test_store();
    store
        .add("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap();

    store.delete("U1", "abc").await.unwrap();

    let err = store.get("U1", "abc").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    // The value entry goes with it.
    assert_eq!(cache.get(&keys::encrypted_key("abc")).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_absent_session_is_noop() {
    let (_cache, store) = test_store();
    store.delete("U1", "never-added").await.unwrap();
}

#[tokio::test]
async fn test_update_never_decreases_last_login() {
    let (_cache, store) = test_store();
    let added = store
        .add("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap();

    let first = store.update("U1", &added, Some(TTL)).await.unwrap();
    assert!(first.last_login_at >= added.last_login_at);

    let second = store.update("U1", &first, Some(TTL)).await.unwrap();
    assert!(second.last_login_at >= first.last_login_at);
}

#[tokio::test]
async fn test_update_overwrites_metadata() {
    let (_cache, store) = test_store();
    store
        .add("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap();

    let mut refreshed = login_record("abc");
    refreshed.user_ip = "5.6.7.8".to_string();
    refreshed.user_agent = "UA2".to_string();
    store.update("U1", &refreshed, Some(TTL)).await.unwrap();

    let fetched = store.get("U1", "abc").await.unwrap();
    assert_eq!(fetched.user_ip, "5.6.7.8");
    assert_eq!(fetched.user_agent, "UA2");
}

#[tokio::test]
async fn test_update_unknown_session_is_not_found() {
    let (_cache, store) = test_store();
    let err = store
        .update("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_list_active_returns_live_sessions() {
    let (_cache, store) = test_store();
    store
        .add("U1", &login_record("abc"), Some(TTL))
        .await
        .unwrap();
    store
        .add("U1", &login_record("def"), Some(TTL))
        .await
        .unwrap();
    store
        .add("U2", &login_record("ghi"), Some(TTL))
        .await
        .unwrap();

    let mut ids: Vec<String> = store
        .list_active("U1")
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.session_id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["abc", "def"]);
}

#[tokio::test]
async fn test_list_active_sweeps_logically_expired_entries() {
    let (cache, store) = test_store();
    store
        .add("U1", &login_record("live"), Some(TTL))
        .await
        .unwrap();

    // Plant an entry whose embedded expiry already elapsed while its
    // backend TTL has not.
    let mut stale = login_record("stale");
    stale.encrypted = keys::encrypted_key("stale");
    stale.expire_time = Some(Utc::now().timestamp() - 60);
    let key = keys::storage_key("U1", "stale").unwrap();
    let payload = record::encode(&stale).unwrap();
    cache.set(&key, &payload, TTL).await.unwrap();
    cache.set(&stale.encrypted, &payload, TTL).await.unwrap();

    let sessions = store.list_active("U1").await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].session_id, "live");

    // Sweep-on-read removed both of the stale session's keys.
    assert_eq!(cache.get(&key).await.unwrap(), None);
    assert_eq!(cache.get(&stale.encrypted).await.unwrap(), None);
}

#[tokio::test]
async fn test_get_does_not_sweep_logically_expired_entries() {
    let (cache, store) = test_store();
    let mut stale = login_record("stale");
    stale.encrypted = keys::encrypted_key("stale");
    stale.expire_time = Some(Utc::now().timestamp() - 60);
    let key = keys::storage_key("U1", "stale").unwrap();
    cache
        .set(&key, &record::encode(&stale).unwrap(), TTL)
        .await
        .unwrap();

    // Only the scanning path pays for the sweep.
    let fetched = store.get("U1", "stale").await.unwrap();
    assert_eq!(fetched.session_id, "stale");
    assert!(cache.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_empty_session_id_rejected_before_derivation() {
    let (_cache, store) = test_store();

    let err = store.get("U1", "").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = store
        .add("U1", &login_record(""), Some(TTL))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_corrupt_payload_surfaces_decode_error() {
    let (cache, store) = test_store();
    let key = keys::storage_key("U1", "abc").unwrap();
    cache.set(&key, "not json", TTL).await.unwrap();

    let err = store.get("U1", "abc").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Serialization);

    let err = store.list_active("U1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Serialization);
}

#[tokio::test]
async fn test_add_without_ttl_uses_configured_default() {
    let (_cache, store) = test_store();
    let before = Utc::now().timestamp();
    let stored = store.add("U1", &login_record("abc"), None).await.unwrap();

    let default_secs = store.default_ttl().as_secs() as i64;
    let expire = stored.expire_time.unwrap();
    assert!(expire >= before + default_secs);
    assert!(expire <= Utc::now().timestamp() + default_secs);
}
