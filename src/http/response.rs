//! HTTP/1.1 responses: a builder, literal serialization, and parsing.
//!
//! A [`Response`] serialized with [`Response::dump`] and read back with
//! [`Response::parse`] yields the same status line, headers (names, order, and
//! values) and body. The dump is the canonical representation handed to a
//! storage backend.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use super::{Headers, StatusCode};

/// Errors that can occur while parsing an HTTP/1.1 response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response is incomplete - more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    #[error("body is {actual} bytes but Content-Length is {expected}")]
    BodyLength { expected: usize, actual: usize },

    #[error("value of header {name} is not valid UTF-8")]
    InvalidHeaderValue { name: String },
}

/// An HTTP/1.1 response.
///
/// # Examples
///
/// ```
/// use httpcache::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::OK)
///     .header("Cache-Control", "max-age=3600")
///     .body("hello");
///
/// let dump = response.dump();
/// let text = std::str::from_utf8(&dump).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("Content-Length: 5\r\n"));
///
/// let parsed = Response::parse(&dump).unwrap();
/// assert_eq!(parsed.status(), StatusCode::OK);
/// assert_eq!(parsed.body_bytes().as_ref(), b"hello");
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    reason: String,
    /// HTTP minor version: 0 for HTTP/1.0, 1 for HTTP/1.1.
    version: u8,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Maximum number of headers we accept per response.
    const MAX_HEADERS: usize = 96;

    /// Creates a new HTTP/1.1 response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: status.canonical_reason().to_owned(),
            version: 1,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    /// Appends a response header. Multiple calls with the same name are additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body and keeps `Content-Length` in step with it.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.set_body(body.into());
        self
    }

    /// Replaces the body in place. Any `Transfer-Encoding` header is dropped
    /// and `Content-Length` is rewritten to the new length.
    pub fn set_body(&mut self, body: Bytes) {
        self.headers.remove("transfer-encoding");
        self.headers.set("Content-Length", body.len().to_string());
        self.body = body;
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the reason phrase from the status line.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns the HTTP minor version number (0 = HTTP/1.0, 1 = HTTP/1.1).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a mutable reference to the response headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Returns the body. Cloning the returned [`Bytes`] is cheap and leaves
    /// the response readable.
    pub fn body_bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response and returns its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Returns the value of the `Content-Length` header parsed as a `usize`, if present.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length")?.trim().parse().ok()
    }

    /// Serializes the response literally: status line, headers in their
    /// stored order and casing, a blank line, then the body.
    ///
    /// Nothing is added or reordered, so the output parses back to an
    /// identical response.
    pub fn dump(&self) -> Bytes {
        let estimated_size = 64 + self.headers.len() * 64 + self.body.len();
        let mut buf = BytesMut::with_capacity(estimated_size);

        // Status line
        buf.put(
            format!(
                "HTTP/1.{} {} {}\r\n",
                self.version,
                self.status.as_u16(),
                self.reason
            )
            .as_bytes(),
        );

        // Headers
        for (name, value) in self.headers.iter() {
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }

        // Header/body separator
        buf.put(&b"\r\n"[..]);

        // Body
        buf.put(self.body.as_ref());

        buf.freeze()
    }

    /// Parses the status line and headers from `buf`.
    ///
    /// Returns the response with an empty body and the byte offset at which
    /// the body begins (immediately after the `\r\n\r\n` terminator).
    ///
    /// # Errors
    ///
    /// - [`ResponseError::Incomplete`] - more data is needed to complete the headers.
    /// - [`ResponseError::Parse`] - the data is malformed.
    /// - [`ResponseError::MissingField`] / [`ResponseError::InvalidStatus`] - the
    ///   status line is unusable.
    pub fn parse_head(buf: &[u8]) -> Result<(Self, usize), ResponseError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw = httparse::Response::new(&mut headers);

        let body_offset = match raw.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(ResponseError::Incomplete),
        };

        let code = raw
            .code
            .ok_or(ResponseError::MissingField { field: "status" })?;
        let status = StatusCode::from_u16(code).ok_or(ResponseError::InvalidStatus(code))?;
        let version = raw
            .version
            .ok_or(ResponseError::MissingField { field: "version" })?;
        let reason = raw.reason.unwrap_or_default().to_owned();

        let mut header_map = Headers::with_capacity(raw.headers.len());
        for header in raw.headers.iter() {
            let value = std::str::from_utf8(header.value).map_err(|_| {
                ResponseError::InvalidHeaderValue {
                    name: header.name.to_owned(),
                }
            })?;
            header_map.insert(header.name, value);
        }

        Ok((
            Self {
                status,
                reason,
                version,
                headers: header_map,
                body: Bytes::new(),
            },
            body_offset,
        ))
    }

    /// Parses a complete response, as produced by [`dump`](Self::dump).
    ///
    /// Everything after the header block is the body, taken literally.
    /// `Content-Length` is not checked against it: a stored `HEAD` response
    /// or a `304` advertises a length it never carried.
    pub fn parse(buf: &[u8]) -> Result<Self, ResponseError> {
        let (mut response, body_offset) = Self::parse_head(buf)?;
        response.body = Bytes::copy_from_slice(buf.get(body_offset..).unwrap_or_default());
        Ok(response)
    }

    // Attaches a body read off the wire without touching the headers.
    pub(crate) fn with_raw_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}
