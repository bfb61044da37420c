use std::fmt;

use crate::control::RequestDirectives;
use crate::http::Request;

/// Identifies a stored entry: `METHOD URI`, plus the `Authorization` value
/// for credential-scoped entries.
///
/// Credentials join the key when the cache is configured to store
/// authorized requests, or when the request itself asks for a private entry
/// with `Cache-Control: private`. Keys never depend on anything else, so
/// the same request always maps to the same entry.
///
/// ```
/// use httpcache::http::Request;
/// use httpcache::transport::CacheKey;
///
/// let req = Request::get("http://example.com/a").header("Authorization", "Bearer t");
/// assert_eq!(CacheKey::for_request(&req, false).as_str(), "GET http://example.com/a");
/// assert_eq!(
///     CacheKey::for_request(&req, true).as_str(),
///     "GET http://example.com/a Bearer t"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_request(request: &Request, cache_authorized_requests: bool) -> Self {
        let directives = request
            .headers()
            .get_joined("cache-control")
            .and_then(|v| RequestDirectives::parse(&v).ok())
            .unwrap_or_default();

        Self::build(request, cache_authorized_requests, &directives)
    }

    pub(crate) fn build(
        request: &Request,
        cache_authorized_requests: bool,
        directives: &RequestDirectives,
    ) -> Self {
        let mut key = format!("{} {}", request.method(), request.uri());

        if cache_authorized_requests || directives.is_private() {
            if let Some(auth) = request.headers().get("authorization") {
                key.push(' ');
                key.push_str(auth);
            }
        }

        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
