//! The minimal transport interface consumed by the dispatcher.
//!
//! The core never opens sockets itself: it hands a fully resolved
//! [`ComposedRequest`] to a [`Transport`] and receives a [`RawResponse`] back.
//! Aborting a call is done by dropping the future returned by [`Transport::send`],
//! which happens when the task driving it is aborted on cancellation.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

use super::response::RawResponse;

mod reqwest_client;
pub use self::reqwest_client::ReqwestTransport;

/// The future returned by [`Transport::send`].
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send>>;

/// A resolved request, ready to be sent.
///
/// Built by the dispatcher from an endpoint configuration and call parameters;
/// owned by the transport once handed off.
#[derive(Clone, derive_more::Debug)]
pub struct ComposedRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL, query string included.
    pub url: Url,
    /// Request headers, `content-type` included when a body is present.
    pub headers: HeaderMap,
    /// The serialized body.
    #[debug(ignore)]
    pub body: Option<Bytes>,
}

/// Capability to perform one HTTP exchange.
///
/// Implementations must not retry: exactly one exchange per call.
///
/// # Example
///
/// ```rust
/// use apicall_core::{ComposedRequest, RawResponse, Transport, TransportFuture};
/// use http::{HeaderMap, StatusCode};
///
/// #[derive(Debug)]
/// struct AlwaysNoContent;
///
/// impl Transport for AlwaysNoContent {
///     fn send(&self, _request: ComposedRequest) -> TransportFuture {
///         Box::pin(async {
///             Ok(RawResponse::new(StatusCode::NO_CONTENT, HeaderMap::new(), Vec::new()))
///         })
///     }
/// }
/// ```
pub trait Transport: Debug + Send + Sync + 'static {
    /// Sends the request and resolves with the raw response.
    ///
    /// Dropping the returned future must abort the exchange.
    fn send(&self, request: ComposedRequest) -> TransportFuture;
}

/// Transport level failures.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// Failure reported by reqwest.
    Request(reqwest::Error),

    /// The exchange did not complete in time.
    #[display("Request timed out after {timeout:?}")]
    #[from(skip)]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },

    /// Connection level failure reported by a custom transport.
    #[display("Connection failure: {message}")]
    #[from(skip)]
    Connection {
        /// Description of the failure.
        message: String,
    },
}
