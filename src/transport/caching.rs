use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::{BoxFuture, CacheKey, RoundTrip, TransportError};
use crate::config::CacheConfig;
use crate::control::RequestDirectives;
use crate::http::date::format_http_date;
use crate::http::{Headers, Method, Request, Response, StatusCode};
use crate::policy::{CacheabilityContext, satisfies_request};
use crate::storage::{CacheEntry, Storage, StorageError, UNKNOWN_ORIGIN};

/// A transport that answers from a response cache when it can.
///
/// Each request passes through the same steps exactly once:
///
/// 1. A request with `Cache-Control: no-cache` or `no-store` skips the cache.
/// 2. Otherwise the entry under the request's [`CacheKey`] is loaded. A
///    storage error, an invalid entry, an entry that no longer passes the
///    cacheability rules, or a stale entry all count as a miss. A hit is
///    returned without touching the network, marked with the hit and
///    origin headers and an `Expires` of the instant it was cached.
/// 3. On a miss the inner transport is called. Its errors are returned
///    as-is.
/// 4. A 2xx response other than 204 that passes the cacheability rules and
///    is still fresh is stored. Storage failures are logged and ignored.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use httpcache::CacheConfig;
/// use httpcache::http::{Request, Response, StatusCode};
/// use httpcache::storage::MemoryStorage;
/// use httpcache::transport::{CachingTransport, RoundTrip, from_fn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let origin = from_fn(|_req: Request| async {
///     Ok(Response::new(StatusCode::OK)
///         .header("Cache-Control", "max-age=300")
///         .body("hello"))
/// });
/// let transport = CachingTransport::new(origin, Arc::new(MemoryStorage::new()), CacheConfig::default());
///
/// let first = transport.round_trip(Request::get("http://example.com/")).await.unwrap();
/// assert!(first.headers().get("X-HTTPCache").is_none());
///
/// let second = transport.round_trip(Request::get("http://example.com/")).await.unwrap();
/// assert_eq!(second.headers().get("X-HTTPCache"), Some("true"));
/// assert_eq!(second.headers().get("X-HTTPCache-Origin"), Some("IN-MEMORY"));
/// # }
/// ```
pub struct CachingTransport<T, S: ?Sized> {
    inner: T,
    storage: Arc<S>,
    config: CacheConfig,
}

impl<T, S> CachingTransport<T, S>
where
    T: RoundTrip,
    S: Storage + ?Sized,
{
    pub fn new(inner: T, storage: Arc<S>, config: CacheConfig) -> Self {
        Self {
            inner,
            storage,
            config,
        }
    }

    /// The backing store, e.g. to flush it.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn handle(&self, request: Request) -> Result<Response, TransportError> {
        let directives = request
            .headers()
            .get_joined("cache-control")
            .and_then(|v| RequestDirectives::parse(&v).ok())
            .unwrap_or_default();
        let key = CacheKey::build(&request, self.config.cache_authorized_requests, &directives);

        if directives.forbids_cached_response() {
            debug!(key = %key, "request forbids cached response, bypassing lookup");
        } else if let Some(hit) = self.lookup(&request, &key) {
            debug!(key = %key, status = %hit.status(), "cache hit");
            return Ok(hit);
        }

        let method = request.method().clone();
        let uri = request.uri().to_owned();
        let request_headers = request.headers().clone();

        let response = self.inner.round_trip(request).await?;

        if self.should_store(&key, &method, &request_headers, &response) {
            self.store(&key, &method, uri, &response);
        }
        Ok(response)
    }

    fn context(
        &self,
        method: &Method,
        request_headers: &Headers,
        response: &Response,
    ) -> CacheabilityContext {
        CacheabilityContext::from_parts(
            method.clone(),
            request_headers.clone(),
            response.status(),
            response.headers().clone(),
        )
        .private_cache(self.config.private_cache)
        .authorized_requests_cacheable(self.config.cache_authorized_requests)
    }

    fn lookup(&self, request: &Request, key: &CacheKey) -> Option<Response> {
        let entry = match self.storage.get(key.as_str()) {
            Ok(entry) => entry,
            Err(StorageError::NotFound) => {
                debug!(key = %key, "cache miss");
                return None;
            }
            Err(e) => {
                debug!(key = %key, error = %e, "cache lookup failed, treating as miss");
                return None;
            }
        };

        if let Err(e) = entry.validate() {
            warn!(key = %key, error = %e, "discarding invalid cache entry");
            return None;
        }

        let mut cached = match Response::parse(&entry.response) {
            Ok(response) => response,
            Err(e) => {
                warn!(key = %key, error = %e, "discarding unreadable cache entry");
                return None;
            }
        };

        if self.config.rfc_compliance {
            let ctx = self
                .context(request.method(), request.headers(), &cached)
                .date_fallback(entry.cached_at);
            let result = ctx.evaluate();

            if !result.is_cacheable() {
                debug!(key = %key, reasons = ?result.reasons, "cached response no longer cacheable");
                return None;
            }
            if result.is_expired_at(ctx.now()) {
                debug!(key = %key, "cached response is stale");
                return None;
            }
            if !satisfies_request(&ctx, &result) {
                debug!(key = %key, "cached response too old for request");
                return None;
            }
        }

        let origin = self
            .storage
            .as_origin()
            .map_or(UNKNOWN_ORIGIN, |o| o.origin())
            .to_owned();
        let headers = cached.headers_mut();
        headers.set("Expires", format_http_date(entry.cached_at));
        headers.set(self.config.hit_header.as_str(), "true");
        headers.set(self.config.origin_header.as_str(), origin);

        Some(cached)
    }

    fn should_store(
        &self,
        key: &CacheKey,
        method: &Method,
        request_headers: &Headers,
        response: &Response,
    ) -> bool {
        let status = response.status();
        if !status.is_success() || status == StatusCode::NO_CONTENT {
            debug!(key = %key, status = %status, "status not stored");
            return false;
        }

        if !self.config.rfc_compliance {
            return true;
        }

        let ctx = self.context(method, request_headers, response);
        let result = ctx.evaluate();

        if !result.is_cacheable() {
            debug!(
                key = %key,
                reasons = ?result.reasons,
                error = ?result.error,
                "response not cacheable"
            );
            return false;
        }
        if result.expiration.is_none_or(|expires| expires <= ctx.now()) {
            debug!(key = %key, "response already expired, not stored");
            return false;
        }
        true
    }

    fn store(&self, key: &CacheKey, method: &Method, uri: String, response: &Response) {
        let entry = CacheEntry::new(method.as_str(), uri, response.dump(), Utc::now());

        match self.storage.set(key.as_str(), entry) {
            Ok(()) => debug!(key = %key, "response stored"),
            Err(e) => warn!(key = %key, error = %e, "failed to store response"),
        }
    }
}

impl<T, S> RoundTrip for CachingTransport<T, S>
where
    T: RoundTrip,
    S: Storage + ?Sized,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(self.handle(request))
    }
}
