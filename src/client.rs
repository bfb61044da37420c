//! A minimal HTTP client that owns a transport stack.

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::http::{Request, Response};
use crate::storage::{MemoryStorage, Storage};
use crate::transport::{CachingTransport, RoundTrip, TcpTransport, TransportError};

/// Sends requests through a boxed [`RoundTrip`].
///
/// # Examples
///
/// ```rust,no_run
/// use httpcache::{CacheConfig, Client};
/// use httpcache::http::Request;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::with_memory_cache(CacheConfig::default());
///     let response = client.send(Request::get("http://example.com/")).await?;
///     println!("{} ({} bytes)", response.status(), response.body_bytes().len());
///     Ok(())
/// }
/// ```
pub struct Client {
    transport: Box<dyn RoundTrip>,
}

impl Client {
    /// Wraps any transport.
    pub fn new(transport: impl RoundTrip + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// A plain TCP client with no cache.
    pub fn uncached() -> Self {
        Self::new(TcpTransport::new())
    }

    /// A TCP client caching into `storage`.
    pub fn with_storage(storage: Arc<dyn Storage>, config: CacheConfig) -> Self {
        Self::new(CachingTransport::new(TcpTransport::new(), storage, config))
    }

    /// A TCP client caching into a fresh [`MemoryStorage`].
    pub fn with_memory_cache(config: CacheConfig) -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()), config)
    }

    /// # Errors
    ///
    /// Returns whatever error the underlying transport produced.
    pub async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.transport.round_trip(request).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::uncached()
    }
}
