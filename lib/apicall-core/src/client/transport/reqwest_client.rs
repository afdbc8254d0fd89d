use reqwest::{Body, Request};

use super::{ComposedRequest, Transport, TransportError, TransportFuture};
use crate::client::response::RawResponse;

/// Default [`Transport`] backed by a [`reqwest::Client`].
///
/// Connection pooling, TLS and proxies are whatever the wrapped client is
/// configured with.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing reqwest client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build_request(request: ComposedRequest) -> Request {
        let ComposedRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut request = Request::new(method, url);
        *request.headers_mut() = headers;
        if let Some(body) = body {
            *request.body_mut() = Some(Body::from(body));
        }
        request
    }
}

impl From<reqwest::Client> for ReqwestTransport {
    fn from(client: reqwest::Client) -> Self {
        Self::new(client)
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: ComposedRequest) -> TransportFuture {
        let client = self.client.clone();
        let request = Self::build_request(request);

        Box::pin(async move {
            let response = client.execute(request).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(TransportError::from)?;
            Ok(RawResponse::new(status, headers, body))
        })
    }
}
