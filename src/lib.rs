//! # httpcache
//!
//! Transparent HTTP response caching for async HTTP/1.1 clients, following
//! the `Cache-Control` rules of RFC 7234.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use httpcache::{CacheConfig, Client};
//! use httpcache::http::Request;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_memory_cache(CacheConfig::default());
//!
//!     // The second call is answered from memory while the response is fresh.
//!     for _ in 0..2 {
//!         let response = client.send(Request::get("http://example.com/")).await?;
//!         println!("{:?}", response.headers().get("X-HTTPCache"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - [`control`]: `Cache-Control` directive parsing.
//! - [`policy`]: whether a response may be cached, and until when.
//! - [`storage`]: the backend contract and an in-memory backend.
//! - [`transport`]: the round-trip abstraction, a TCP transport, and the
//!   caching transport that ties everything together.

pub mod client;
pub mod config;
pub mod control;
pub mod http;
pub mod policy;
pub mod storage;
pub mod transport;

pub use client::Client;
pub use config::CacheConfig;
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use storage::{CacheEntry, MemoryStorage, Storage, StorageError};
pub use transport::{CachingTransport, RoundTrip, TransportError};
