//! Caching transport configuration.

use serde::Deserialize;

pub const DEFAULT_HIT_HEADER: &str = "X-HTTPCache";
pub const DEFAULT_ORIGIN_HEADER: &str = "X-HTTPCache-Origin";

/// Settings fixed when a [`CachingTransport`](crate::transport::CachingTransport)
/// is built.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use httpcache::CacheConfig;
///
/// let config = CacheConfig::from_json(r#"{ "private_cache": true }"#).unwrap();
/// assert!(config.private_cache);
/// assert!(config.rfc_compliance);
/// assert_eq!(config.hit_header, "X-HTTPCache");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Treat the cache as single-user: `private` responses may be stored and
    /// `s-maxage` is ignored.
    pub private_cache: bool,
    /// Let a shared cache store responses to requests carrying
    /// `Authorization`, keyed per credential.
    pub cache_authorized_requests: bool,
    /// Apply the cacheability and freshness rules. When off, only the status
    /// gate applies and entry lifetime is up to the storage backend.
    pub rfc_compliance: bool,
    /// Header set to `true` on responses served from cache.
    pub hit_header: String,
    /// Header naming the backend that served a cached response.
    pub origin_header: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            private_cache: false,
            cache_authorized_requests: false,
            rfc_compliance: true,
            hit_header: DEFAULT_HIT_HEADER.to_owned(),
            origin_header: DEFAULT_ORIGIN_HEADER.to_owned(),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn private_cache(mut self, private: bool) -> Self {
        self.private_cache = private;
        self
    }

    #[must_use]
    pub fn cache_authorized_requests(mut self, enabled: bool) -> Self {
        self.cache_authorized_requests = enabled;
        self
    }

    #[must_use]
    pub fn rfc_compliance(mut self, enabled: bool) -> Self {
        self.rfc_compliance = enabled;
        self
    }

    #[must_use]
    pub fn hit_header(mut self, name: impl Into<String>) -> Self {
        self.hit_header = name.into();
        self
    }

    #[must_use]
    pub fn origin_header(mut self, name: impl Into<String>) -> Self {
        self.origin_header = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert!(!config.private_cache);
        assert!(!config.cache_authorized_requests);
        assert!(config.rfc_compliance);
        assert_eq!(config.hit_header, DEFAULT_HIT_HEADER);
        assert_eq!(config.origin_header, DEFAULT_ORIGIN_HEADER);
        assert_eq!(CacheConfig::from_json("{}").unwrap(), config);
    }

    #[test]
    fn json_overrides() {
        let config = CacheConfig::from_json(
            r#"{"cache_authorized_requests": true, "rfc_compliance": false, "hit_header": "X-Cache"}"#,
        )
        .unwrap();
        assert!(config.cache_authorized_requests);
        assert!(!config.rfc_compliance);
        assert_eq!(config.hit_header, "X-Cache");
        assert_eq!(config.origin_header, DEFAULT_ORIGIN_HEADER);
    }

    #[test]
    fn bad_json() {
        assert!(CacheConfig::from_json(r#"{"private_cache": "yes"}"#).is_err());
    }

    #[test]
    fn builder() {
        let config = CacheConfig::new()
            .private_cache(true)
            .origin_header("X-Origin");
        assert!(config.private_cache);
        assert_eq!(config.origin_header, "X-Origin");
    }
}
