//! Round-trippers: one request in, one response out.
//!
//! ## Core types
//!
//! - [`RoundTrip`]: trait implemented by every transport.
//! - [`from_fn`]: turns an async closure into a transport.
//! - [`TcpTransport`]: plain HTTP/1.1 over a fresh TCP connection per request.
//! - [`CachingTransport`]: wraps another transport with a response cache.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::http::{Request, Response, ResponseError};

mod caching;
mod key;
mod tcp;

pub use caching::CachingTransport;
pub use key::CacheKey;
pub use tcp::TcpTransport;

/// A boxed, sendable future borrowed from a transport.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors produced by transports.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request URI: {0}")]
    InvalidUri(String),

    #[error("unsupported URI scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid response: {0}")]
    Response(#[from] ResponseError),

    #[error("{0}")]
    Other(String),
}

/// Sends one request and yields one response.
///
/// Implementations must be safe to call concurrently: a client may have
/// many requests in flight through the same transport.
///
/// # Examples
///
/// ```rust,no_run
/// use httpcache::http::{Request, Response};
/// use httpcache::transport::{BoxFuture, RoundTrip, TransportError};
///
/// struct AlwaysOk;
///
/// impl RoundTrip for AlwaysOk {
///     fn round_trip(&self, _req: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
///         Box::pin(async { Ok(Response::default().body("ok")) })
///     }
/// }
/// ```
pub trait RoundTrip: Send + Sync {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>>;
}

impl<T: RoundTrip + ?Sized> RoundTrip for Box<T> {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        (**self).round_trip(request)
    }
}

impl<T: RoundTrip + ?Sized> RoundTrip for std::sync::Arc<T> {
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        (**self).round_trip(request)
    }
}

/// A transport backed by an async function. Built with [`from_fn`].
pub struct FnTransport<F> {
    f: F,
}

/// Converts an async closure into a [`RoundTrip`].
///
/// # Examples
///
/// ```
/// use httpcache::http::{Request, Response, StatusCode};
/// use httpcache::transport::{RoundTrip, from_fn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = from_fn(|_req: Request| async {
///     Ok(Response::new(StatusCode::OK).body("hello"))
/// });
/// let response = transport.round_trip(Request::get("http://example.com/")).await.unwrap();
/// assert_eq!(response.body_bytes().as_ref(), b"hello");
/// # }
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    FnTransport { f }
}

impl<F, Fut> RoundTrip for FnTransport<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    fn round_trip(&self, request: Request) -> BoxFuture<'_, Result<Response, TransportError>> {
        Box::pin((self.f)(request))
    }
}
