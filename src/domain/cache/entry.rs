//! Cached response record with creation time and TTL

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::DomainError;

/// A stored response payload
///
/// A zero TTL never expires. Negative TTLs are already expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(with = "base64_bytes")]
    payload: Vec<u8>,
    created_at: DateTime<Utc>,
    #[serde(rename = "ttl_ms", with = "ttl_millis")]
    ttl: TimeDelta,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(payload: impl Into<Vec<u8>>, ttl: TimeDelta) -> Self {
        Self::with_created_at(payload, Utc::now(), ttl)
    }

    /// Create an entry with an explicit creation time
    pub fn with_created_at(
        payload: impl Into<Vec<u8>>,
        created_at: DateTime<Utc>,
        ttl: TimeDelta,
    ) -> Self {
        Self {
            payload: payload.into(),
            created_at,
            ttl,
        }
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the entry is logically deleted at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if self.ttl.is_zero() {
            return false;
        }

        now - self.created_at > self.ttl
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize cache entry: {}", e)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DomainError> {
        serde_json::from_slice(bytes)
            .map_err(|e| DomainError::data_corruption(format!("Invalid cache entry: {}", e)))
    }
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod ttl_millis {
    use super::*;

    pub fn serialize<S: Serializer>(ttl: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(ttl.num_milliseconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        TimeDelta::try_milliseconds(millis)
            .ok_or_else(|| serde::de::Error::custom("ttl_ms out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CacheEntry::new(b"{}".to_vec(), TimeDelta::hours(1));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let created = Utc::now() - TimeDelta::hours(2);
        let entry = CacheEntry::with_created_at(b"x".to_vec(), created, TimeDelta::hours(1));

        assert!(entry.is_expired());
        assert!(!entry.is_expired_at(created + TimeDelta::minutes(59)));
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let created = Utc::now() - TimeDelta::days(3650);
        let entry = CacheEntry::with_created_at(b"x".to_vec(), created, TimeDelta::zero());

        assert!(!entry.is_expired());
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let entry = CacheEntry::new(b"x".to_vec(), TimeDelta::hours(-1));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_serialized_form() {
        let created = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let entry = CacheEntry::with_created_at(b"hi".to_vec(), created, TimeDelta::seconds(90));

        let json: serde_json::Value = serde_json::from_slice(&entry.to_bytes().unwrap()).unwrap();

        assert_eq!(json["payload"], "aGk=");
        assert_eq!(json["ttl_ms"], 90_000);
        assert_eq!(CacheEntry::from_bytes(&entry.to_bytes().unwrap()).unwrap(), entry);
    }

    #[test]
    fn test_corrupt_bytes_are_data_corruption() {
        let result = CacheEntry::from_bytes(b"not json");
        assert!(matches!(result, Err(DomainError::DataCorruption { .. })));

        let bad_payload = br#"{"payload":"!!","created_at":"2024-01-01T00:00:00Z","ttl_ms":0}"#;
        let result = CacheEntry::from_bytes(bad_payload);
        assert!(matches!(result, Err(DomainError::DataCorruption { .. })));

        let bad_ttl =
            br#"{"payload":"aGk=","created_at":"2024-01-01T00:00:00Z","ttl_ms":-9223372036854775808}"#;
        let result = CacheEntry::from_bytes(bad_ttl);
        assert!(matches!(result, Err(DomainError::DataCorruption { .. })));
    }
}
