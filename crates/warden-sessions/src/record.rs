//! Session record payload and its JSON codec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;

/// Metadata describing one authenticated device/browser session.
///
/// Stored as a JSON object; timestamps are RFC 3339 in UTC. Unknown
/// extra fields in stored payloads are tolerated on decode so that
/// records written by a newer scheme still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session identifier issued by the login flow.
    pub session_id: String,
    /// IP address the session was authenticated from.
    pub user_ip: String,
    /// Country resolved for that IP.
    pub user_ip_country: String,
    /// Browser/device user agent.
    pub user_agent: String,
    /// When the session was first authenticated.
    pub authenticated_at: DateTime<Utc>,
    /// Last activity; monotonically non-decreasing across updates.
    pub last_login_at: DateTime<Utc>,
    /// Versioned value key of this session's shadow entry. Populated by
    /// the store on write; self-describes the key scheme in use.
    #[serde(default)]
    pub encrypted: String,
    /// Embedded logical expiry in unix seconds, checked by scans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<i64>,
}

impl SessionRecord {
    /// Whether the embedded logical expiry has elapsed as of `now`.
    ///
    /// Records without an embedded expiry are governed by backend TTL
    /// alone and are never considered logically expired.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_time
            .is_some_and(|expire| expire <= now.timestamp())
    }
}

/// Encode a record into its canonical JSON payload.
pub fn encode(record: &SessionRecord) -> AppResult<String> {
    Ok(serde_json::to_string(record)?)
}

/// Decode a stored payload back into a record.
///
/// A missing or malformed timestamp, or an unparsable payload, yields a
/// serialization error; a corrupted session record must never pass for
/// a valid authenticated state.
pub fn decode(payload: &str) -> AppResult<SessionRecord> {
    serde_json::from_str(payload).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Failed to decode session record: {e}"),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> SessionRecord {
        SessionRecord {
            session_id: "abc".to_string(),
            user_ip: "1.2.3.4".to_string(),
            user_ip_country: "US".to_string(),
            user_agent: "UA1".to_string(),
            authenticated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            last_login_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 15).unwrap(),
            encrypted: "_session_id:2::deadbeef".to_string(),
            expire_time: Some(1_714_650_000),
        }
    }

    #[test]
    fn test_roundtrip_preserves_all_fields() {
        let record = sample();
        let decoded = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_roundtrip_preserves_subsecond_precision() {
        let mut record = sample();
        record.last_login_at = Utc.timestamp_opt(1_714_650_000, 123_456_789).unwrap();
        let decoded = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(decoded.last_login_at, record.last_login_at);
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let mut value: serde_json::Value =
            serde_json::from_str(&encode(&sample()).unwrap()).unwrap();
        value["device_fingerprint"] = serde_json::json!("ff:aa");
        let decoded = decode(&value.to_string()).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_missing_timestamp_is_decode_error() {
        let mut value: serde_json::Value =
            serde_json::from_str(&encode(&sample()).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("authenticated_at");
        let err = decode(&value.to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[test]
    fn test_malformed_timestamp_is_decode_error() {
        let mut value: serde_json::Value =
            serde_json::from_str(&encode(&sample()).unwrap()).unwrap();
        value["last_login_at"] = serde_json::json!("yesterday");
        let err = decode(&value.to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[test]
    fn test_absent_expire_time_omitted_and_not_expired() {
        let mut record = sample();
        record.expire_time = None;
        let payload = encode(&record).unwrap();
        assert!(!payload.contains("expire_time"));
        assert!(!decode(&payload).unwrap().is_expired(Utc::now()));
    }

    #[test]
    fn test_is_expired_boundary() {
        let record = sample();
        let expire = record.expire_time.unwrap();
        assert!(record.is_expired(Utc.timestamp_opt(expire, 0).unwrap()));
        assert!(!record.is_expired(Utc.timestamp_opt(expire - 1, 0).unwrap()));
    }
}
