use std::fmt;

use crate::http::Method;

/// Why a response may not be stored or served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    /// POST responses need explicit freshness to be cacheable.
    RequestMethodPost,
    RequestMethodPut,
    RequestMethodDelete,
    RequestMethodConnect,
    RequestMethodOptions,
    RequestMethodTrace,
    RequestMethodPatch,
    /// A method this cache does not know how to treat.
    RequestMethodUnknown,
    /// The request carried `Cache-Control: no-store`.
    RequestNoStore,
    /// The response carried `Cache-Control: no-store`.
    ResponseNoStore,
    /// The response is `private` and this cache is shared.
    ResponsePrivate,
    /// The request is credentialed and this cache is shared.
    RequestAuthorizationHeader,
    /// The status code is not cacheable without explicit freshness.
    ResponseUncacheableByDefault,
}

impl Reason {
    /// Returns the method-specific reason for a method that is not
    /// cacheable by default, or `None` for GET and HEAD.
    pub fn for_method(method: &Method) -> Option<Self> {
        Some(match method {
            Method::Get | Method::Head => return None,
            Method::Post => Self::RequestMethodPost,
            Method::Put => Self::RequestMethodPut,
            Method::Delete => Self::RequestMethodDelete,
            Method::Connect => Self::RequestMethodConnect,
            Method::Options => Self::RequestMethodOptions,
            Method::Trace => Self::RequestMethodTrace,
            Method::Patch => Self::RequestMethodPatch,
            Method::Custom(_) => Self::RequestMethodUnknown,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RequestMethodPost => "request method is POST",
            Self::RequestMethodPut => "request method is PUT",
            Self::RequestMethodDelete => "request method is DELETE",
            Self::RequestMethodConnect => "request method is CONNECT",
            Self::RequestMethodOptions => "request method is OPTIONS",
            Self::RequestMethodTrace => "request method is TRACE",
            Self::RequestMethodPatch => "request method is PATCH",
            Self::RequestMethodUnknown => "request method is not recognized",
            Self::RequestNoStore => "request has no-store",
            Self::ResponseNoStore => "response has no-store",
            Self::ResponsePrivate => "response is private and the cache is shared",
            Self::RequestAuthorizationHeader => "request is authorized and the cache is shared",
            Self::ResponseUncacheableByDefault => "status code is not cacheable by default",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
