//! Cacheability and expiration decisions.
//!
//! A [`CacheabilityContext`] gathers everything the rules look at: request
//! method and headers, response status and headers, both parsed directive
//! sets, the `Date`/`Expires`/`Last-Modified` instants, whether the cache
//! is private, and "now". [`CacheabilityContext::evaluate`] runs the
//! cacheability rules and then the freshness calculator.
//!
//! ```
//! use chrono::{DateTime, TimeDelta};
//! use httpcache::http::{Request, Response, StatusCode};
//! use httpcache::policy::CacheabilityContext;
//!
//! let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
//! let request = Request::get("http://example.com/");
//! let response = Response::new(StatusCode::OK)
//!     .header("Cache-Control", "max-age=60, s-maxage=900");
//!
//! let shared = CacheabilityContext::new(&request, &response).at(now).evaluate();
//! assert!(shared.is_cacheable());
//! assert_eq!(shared.expiration, Some(now + TimeDelta::seconds(900)));
//!
//! let private = CacheabilityContext::new(&request, &response)
//!     .private_cache(true)
//!     .at(now)
//!     .evaluate();
//! assert_eq!(private.expiration, Some(now + TimeDelta::seconds(60)));
//! ```

use chrono::{DateTime, TimeDelta, Utc};

use crate::control::{DirectiveError, RequestDirectives, ResponseDirectives, Warning};
use crate::http::date::{parse_expires, parse_http_date};
use crate::http::{Headers, Method, Request, Response, StatusCode};

mod cacheable;
mod freshness;
mod reason;

pub use cacheable::{cacheable, cacheable_by_default};
pub use freshness::{expiration, satisfies_request};
pub use reason::Reason;

/// Inputs to the cacheability and freshness rules.
#[derive(Debug, Clone)]
pub struct CacheabilityContext {
    request_method: Method,
    request_headers: Headers,
    request_directives: RequestDirectives,
    status: StatusCode,
    response_headers: Headers,
    response_directives: ResponseDirectives,
    response_date: Option<DateTime<Utc>>,
    response_expires: Option<DateTime<Utc>>,
    response_last_modified: Option<DateTime<Utc>>,
    cache_is_private: bool,
    authorized_cacheable: bool,
    now: DateTime<Utc>,
    parse_error: Option<DirectiveError>,
}

impl CacheabilityContext {
    /// Builds a shared-cache context for `request`/`response` at the current time.
    pub fn new(request: &Request, response: &Response) -> Self {
        Self::from_parts(
            request.method().clone(),
            request.headers().clone(),
            response.status(),
            response.headers().clone(),
        )
    }

    /// Builds a shared-cache context from raw parts at the current time.
    ///
    /// `Cache-Control` headers are parsed here. A malformed value leaves that
    /// side's directives at their defaults and is reported as the result's
    /// hard error by [`evaluate`](Self::evaluate). An `Expires` value that is
    /// not a valid date (such as `0`) counts as already expired.
    pub fn from_parts(
        request_method: Method,
        request_headers: Headers,
        status: StatusCode,
        response_headers: Headers,
    ) -> Self {
        let mut parse_error = None;

        let request_directives = request_headers
            .get_joined("cache-control")
            .map(|v| RequestDirectives::parse(&v))
            .transpose()
            .unwrap_or_else(|e| {
                parse_error = Some(e);
                None
            })
            .unwrap_or_default();

        let response_directives = response_headers
            .get_joined("cache-control")
            .map(|v| ResponseDirectives::parse(&v))
            .transpose()
            .unwrap_or_else(|e| {
                parse_error.get_or_insert(e);
                None
            })
            .unwrap_or_default();

        let response_date = response_headers.get("date").and_then(parse_http_date);
        let response_expires = response_headers.get("expires").map(parse_expires);
        let response_last_modified = response_headers
            .get("last-modified")
            .and_then(parse_http_date);

        Self {
            request_method,
            request_headers,
            request_directives,
            status,
            response_headers,
            response_directives,
            response_date,
            response_expires,
            response_last_modified,
            cache_is_private: false,
            authorized_cacheable: false,
            now: Utc::now(),
            parse_error,
        }
    }

    /// Marks the cache as private (single user) or shared.
    #[must_use]
    pub fn private_cache(mut self, private: bool) -> Self {
        self.cache_is_private = private;
        self
    }

    /// Lets a shared cache store responses to requests carrying
    /// `Authorization`. The caller must then scope its keys by credential.
    #[must_use]
    pub fn authorized_requests_cacheable(mut self, cacheable: bool) -> Self {
        self.authorized_cacheable = cacheable;
        self
    }

    /// Evaluates as of `now` instead of the construction time.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Uses `instant` as the response `Date` when the response has none.
    #[must_use]
    pub fn date_fallback(mut self, instant: DateTime<Utc>) -> Self {
        self.response_date.get_or_insert(instant);
        self
    }

    pub fn request_method(&self) -> &Method {
        &self.request_method
    }

    pub fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    pub fn request_directives(&self) -> &RequestDirectives {
        &self.request_directives
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    pub fn response_directives(&self) -> &ResponseDirectives {
        &self.response_directives
    }

    pub fn response_date(&self) -> Option<DateTime<Utc>> {
        self.response_date
    }

    pub fn response_expires(&self) -> Option<DateTime<Utc>> {
        self.response_expires
    }

    pub fn response_last_modified(&self) -> Option<DateTime<Utc>> {
        self.response_last_modified
    }

    pub fn cache_is_private(&self) -> bool {
        self.cache_is_private
    }

    pub fn authorized_cacheable(&self) -> bool {
        self.authorized_cacheable
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn parse_error(&self) -> Option<&DirectiveError> {
        self.parse_error.as_ref()
    }

    /// `s-maxage`, unless this is a private cache, which must ignore it.
    pub(crate) fn effective_s_maxage(&self) -> Option<TimeDelta> {
        if self.cache_is_private {
            None
        } else {
            self.response_directives.s_maxage().to_time_delta()
        }
    }

    /// Returns `true` when the response states its own lifetime: an
    /// `Expires` header, `max-age`, or `s-maxage` (shared caches only).
    pub fn has_explicit_freshness(&self) -> bool {
        self.response_expires.is_some()
            || self.response_directives.max_age().is_set()
            || self.effective_s_maxage().is_some()
    }

    /// Age of the response: `now` minus its `Date`, never negative.
    pub fn age(&self) -> TimeDelta {
        let date = self.response_date.unwrap_or(self.now);
        (self.now - date).max(TimeDelta::zero())
    }

    /// Runs the cacheability rules, then the freshness calculator.
    pub fn evaluate(&self) -> EvaluationResult {
        let mut result = EvaluationResult::default();
        cacheable(self, &mut result);
        expiration(self, &mut result);
        result
    }
}

/// Output of [`cacheable`] and [`expiration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Every rule that disqualifies the response, in rule order.
    pub reasons: Vec<Reason>,
    /// A directive set failed to parse.
    pub error: Option<DirectiveError>,
    /// When the response stops being fresh; `None` means already expired.
    pub expiration: Option<DateTime<Utc>>,
    pub warnings: Vec<Warning>,
}

impl EvaluationResult {
    /// No reasons and no error.
    pub fn is_cacheable(&self) -> bool {
        self.reasons.is_empty() && self.error.is_none()
    }

    /// Returns `true` when `now` is past the expiration, or there is none.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_none_or(|expires| now > expires)
    }
}
