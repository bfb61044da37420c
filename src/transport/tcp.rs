//! Plain HTTP/1.1 over Tokio TCP streams.
//!
//! Each request opens a connection, writes the request with
//! `Connection: close`, and reads one response. Bodies framed by
//! `Content-Length`, `Transfer-Encoding: chunked`, or connection close are
//! all read to completion before the response is returned.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use super::{BoxFuture, RoundTrip, TransportError};
use crate::http::{Method, Request, Response, ResponseError};

/// Maximum size of a response we will buffer (64 MiB).
const MAX_RESPONSE_SIZE: usize = 64 * 1024 * 1024;

/// Initial read buffer capacity per connection.
const INITIAL_BUF_SIZE: usize = 8192;

/// Sends requests over a new TCP connection each time.
///
/// Only `http://` URIs are supported.
///
/// # Examples
///
/// ```rust,no_run
/// use httpcache::http::Request;
/// use httpcache::transport::{RoundTrip, TcpTransport};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let response = TcpTransport::new()
///         .round_trip(Request::get("http://example.com/"))
///         .await?;
///     println!("{}", response.status());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

impl TcpTransport {
    pub fn new() -> Self {
        Self
    }

    async fn send(request: Request) -> Result<Response, TransportError> {
        let target = Target::parse(request.uri())?;
        let addr = format!("{}:{}", target.host, target.port);

        let mut stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| TransportError::Connect {
                addr: addr.clone(),
                source: e,
            })?;

        debug!(addr = %addr, method = %request.method(), path = %target.path, "sending request");

        let wire = request.to_wire(&target.path, &target.host_header());
        stream.write_all(&wire).await?;
        stream.flush().await?;

        read_response(&mut stream, request.method()).await
    }
}

impl RoundTrip for TcpTransport {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin(Self::send(request))
    }
}

/// The parts of an `http://` URI needed to open a connection.
#[derive(Debug, PartialEq, Eq)]
struct Target {
    host: String,
    port: u16,
    path: String,
}

impl Target {
    fn parse(uri: &str) -> Result<Self, TransportError> {
        let invalid = || TransportError::InvalidUri(uri.to_owned());
        let url = Url::parse(uri).map_err(|_| invalid())?;
        if url.scheme() != "http" {
            return Err(TransportError::UnsupportedScheme(url.scheme().to_owned()));
        }

        let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let port = url.port_or_known_default().ok_or_else(invalid)?;

        // userinfo and fragment are not sent on the wire
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_owned(),
        };

        Ok(Self {
            host: host.to_owned(),
            port,
            path,
        })
    }

    fn host_header(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// How the body of a response is delimited.
enum Framing {
    Empty,
    Length(usize),
    Chunked,
    UntilClose,
}

fn framing(method: &Method, response: &Response) -> Framing {
    let status = response.status().as_u16();
    if *method == Method::Head || (100..200).contains(&status) || status == 204 || status == 304 {
        return Framing::Empty;
    }

    let chunked = response
        .headers()
        .get_all("transfer-encoding")
        .any(|v| v.to_ascii_lowercase().contains("chunked"));
    if chunked {
        return Framing::Chunked;
    }

    match response.content_length() {
        Some(len) => Framing::Length(len),
        None => Framing::UntilClose,
    }
}

async fn read_response(stream: &mut TcpStream, method: &Method) -> Result<Response, TransportError> {
    let mut buf = BytesMut::with_capacity(INITIAL_BUF_SIZE);

    let (head, body_offset) = loop {
        let eof = fill(stream, &mut buf).await? == 0;
        match Response::parse_head(&buf) {
            Ok(pair) => break pair,
            Err(ResponseError::Incomplete) if !eof => continue,
            Err(e) => return Err(e.into()),
        }
    };
    let _ = buf.split_to(body_offset);

    match framing(method, &head) {
        Framing::Empty => Ok(head.with_raw_body(Bytes::new())),
        Framing::Length(len) => {
            while buf.len() < len {
                if fill(stream, &mut buf).await? == 0 {
                    return Err(ResponseError::BodyLength {
                        expected: len,
                        actual: buf.len(),
                    }
                    .into());
                }
            }
            buf.truncate(len);
            Ok(head.with_raw_body(buf.freeze()))
        }
        Framing::Chunked => {
            let body = loop {
                if let Some(body) = decode_chunked(&buf)? {
                    break body;
                }
                if fill(stream, &mut buf).await? == 0 {
                    return Err(ResponseError::Incomplete.into());
                }
            };
            let mut response = head;
            response.set_body(body);
            Ok(response)
        }
        Framing::UntilClose => {
            while fill(stream, &mut buf).await? != 0 {}
            Ok(head.with_raw_body(buf.freeze()))
        }
    }
}

/// Reads more data into `buf`, returning the number of bytes read.
async fn fill(stream: &mut TcpStream, buf: &mut BytesMut) -> Result<usize, TransportError> {
    if buf.len() > MAX_RESPONSE_SIZE {
        return Err(TransportError::Other(format!(
            "response exceeds {MAX_RESPONSE_SIZE} bytes"
        )));
    }
    Ok(stream.read_buf(buf).await?)
}

/// Decodes a complete chunked body, or returns `None` if more data is needed.
/// Trailer fields are read and discarded.
fn decode_chunked(mut buf: &[u8]) -> Result<Option<Bytes>, TransportError> {
    let mut body = BytesMut::new();

    loop {
        let (offset, size) = match httparse::parse_chunk_size(buf) {
            Ok(httparse::Status::Complete(pair)) => pair,
            Ok(httparse::Status::Partial) => return Ok(None),
            Err(_) => return Err(TransportError::Other("invalid chunk size".into())),
        };
        buf = buf.get(offset..).unwrap_or_default();

        if size == 0 {
            return Ok(trailer_end(buf).map(|_| body.freeze()));
        }

        let size = usize::try_from(size)
            .map_err(|_| TransportError::Other("chunk too large".into()))?;
        let Some(chunk) = buf.get(..size) else {
            return Ok(None);
        };
        match buf.get(size..size + 2) {
            Some(b"\r\n") => {}
            Some(_) => return Err(TransportError::Other("chunk missing CRLF".into())),
            None => return Ok(None),
        }
        body.extend_from_slice(chunk);
        buf = buf.get(size + 2..).unwrap_or_default();
    }
}

/// Finds the end of the trailer section following the last chunk.
fn trailer_end(buf: &[u8]) -> Option<usize> {
    if buf.starts_with(b"\r\n") {
        return Some(2);
    }
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}
