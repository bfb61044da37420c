//! Outbound HTTP/1.1 requests.

use bytes::{BufMut, Bytes, BytesMut};

use super::{Headers, Method};

/// An outbound HTTP request.
///
/// The URI is kept exactly as the caller supplied it; it is both the address
/// handed to the wrapped transport and part of the cache key.
///
/// # Examples
///
/// ```
/// use httpcache::http::{Method, Request};
///
/// let request = Request::get("http://localhost:8080/hello")
///     .header("Cache-Control", "no-cache")
///     .header("Accept", "text/plain");
///
/// assert_eq!(request.method(), &Method::Get);
/// assert_eq!(request.uri(), "http://localhost:8080/hello");
/// assert_eq!(request.headers().get("cache-control"), Some("no-cache"));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Shorthand for `Request::new(Method::Get, uri)`.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Appends a request header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI as supplied by the caller.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a mutable reference to the request headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns the request body bytes.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Serializes the request head and body for the wire.
    ///
    /// `target` is the request-target (origin form, e.g. `/a?b=c`) and `host`
    /// the value for the `Host` header, which is added when the caller did
    /// not set one. `Content-Length` is written whenever a body is present and
    /// the caller did not set it; `Connection: close` is always requested.
    pub fn to_wire(&self, target: &str, host: &str) -> BytesMut {
        let mut buf = BytesMut::with_capacity(128 + self.headers.len() * 64 + self.body.len());

        buf.put(format!("{} {} HTTP/1.1\r\n", self.method, target).as_bytes());

        if !self.headers.contains("host") {
            buf.put(format!("Host: {host}\r\n").as_bytes());
        }
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case("connection") {
                continue;
            }
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }
        if !self.body.is_empty() && !self.headers.contains("content-length") {
            buf.put(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }
        buf.put(&b"Connection: close\r\n\r\n"[..]);
        buf.put(self.body.as_ref());

        buf
    }
}
