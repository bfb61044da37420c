//! Storage backends for cached responses.
//!
//! A backend maps a cache key to a [`CacheEntry`]. Backends must be safe to
//! call from many tasks at once; the caching transport adds no locking of
//! its own and never relies on a `get`/`set` pair being atomic.
//!
//! Optional capabilities are exposed through [`Storage::as_flush`] and
//! [`Storage::as_origin`] so callers can discover them at runtime.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod memory;

pub use memory::MemoryStorage;

/// Origin name reported when a backend does not implement [`Origin`].
pub const UNKNOWN_ORIGIN: &str = "UNKNOWN";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cache entry not found")]
    NotFound,

    #[error("cached entry is invalid")]
    InvalidEntry,

    #[error("failed to (de)serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Internal(String),

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

/// A key-value store for cached responses.
pub trait Storage: Send + Sync {
    /// # Errors
    ///
    /// [`StorageError::NotFound`] when nothing is stored under `key`; any
    /// other variant for backend failures.
    fn get(&self, key: &str) -> Result<CacheEntry, StorageError>;

    /// Stores `entry`, replacing whatever was under `key`.
    fn set(&self, key: &str, entry: CacheEntry) -> Result<(), StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;

    fn as_flush(&self) -> Option<&dyn Flush> {
        None
    }

    fn as_origin(&self) -> Option<&dyn Origin> {
        None
    }
}

/// Removes every entry from a backend.
pub trait Flush {
    fn flush(&self) -> Result<(), StorageError>;
}

/// Names the backend in the cache-origin response header.
pub trait Origin {
    fn origin(&self) -> &str;
}

/// A stored response and the request that produced it.
///
/// `response` holds the literal HTTP/1.1 serialization of the response
/// (status line, headers, body) as produced by
/// [`Response::dump`](crate::http::Response::dump).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub request_method: String,
    pub request_uri: String,
    pub response: Bytes,
    #[serde(rename = "cachedTime")]
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        request_method: impl Into<String>,
        request_uri: impl Into<String>,
        response: Bytes,
        cached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            request_method: request_method.into(),
            request_uri: request_uri.into(),
            response,
            cached_at,
        }
    }

    /// Rejects entries with an empty method, URI, or dump, or a cached time
    /// at or before the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidEntry`].
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.request_method.is_empty()
            || self.request_uri.is_empty()
            || self.response.is_empty()
            || self.cached_at <= DateTime::<Utc>::UNIX_EPOCH
        {
            return Err(StorageError::InvalidEntry);
        }
        Ok(())
    }

    /// Encodes the entry as JSON for byte-oriented backends.
    pub fn to_json(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CacheEntry {
        CacheEntry::new(
            "GET",
            "http://example.com/",
            Bytes::from_static(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        )
    }

    #[test]
    fn validate() {
        assert!(entry().validate().is_ok());

        let mut e = entry();
        e.request_method.clear();
        assert!(matches!(e.validate(), Err(StorageError::InvalidEntry)));

        let mut e = entry();
        e.request_uri.clear();
        assert!(e.validate().is_err());

        let mut e = entry();
        e.response = Bytes::new();
        assert!(e.validate().is_err());

        let mut e = entry();
        e.cached_at = DateTime::<Utc>::UNIX_EPOCH;
        assert!(e.validate().is_err());
    }

    #[test]
    fn json_field_names() {
        let json = entry().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        let obj = value.as_object().unwrap();
        for field in ["requestMethod", "requestUri", "response", "cachedTime"] {
            assert!(obj.contains_key(field), "missing {field}");
        }
        assert_eq!(CacheEntry::from_json(&json).unwrap(), entry());
    }

    #[test]
    fn garbage_json_is_serialization_error() {
        assert!(matches!(
            CacheEntry::from_json(b"{not json"),
            Err(StorageError::Serialization(_))
        ));
    }
}
