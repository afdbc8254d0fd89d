use std::sync::Arc;
use std::time::Duration;

use headers::HeaderMapExt;
use http::header::{ACCEPT, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use tracing::debug;

use super::base_url::compose;
use super::endpoint::{BodyKind, Endpoint, EndpointConfig};
use super::response::{RawResponse, ResponseBody};
use super::transport::{ComposedRequest, Transport, TransportError};
use super::{ApiClient, ApiClientError, CallBody, CancelableOperation, RequestParams, codec};

fn validate_body(config: &EndpointConfig, body: Option<&CallBody>) -> Result<(), ApiClientError> {
    let Some(body) = body else {
        if config.body == BodyKind::None {
            return Ok(());
        }
        return Err(ApiClientError::invalid_params(format!(
            "{} {} expects a {} body, none given",
            config.method, config.path, config.body
        )));
    };

    if !config.method.allows_body() {
        return Err(ApiClientError::invalid_params(format!(
            "{} requests cannot carry a body",
            config.method
        )));
    }
    if body.kind() != config.body {
        return Err(ApiClientError::invalid_params(format!(
            "{} {} expects {} body, got a {} body",
            config.method,
            config.path,
            config.body,
            body.kind()
        )));
    }

    Ok(())
}

fn endpoint_headers(config: &EndpointConfig) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());
    for (name, value) in config.headers {
        let name = HeaderName::try_from(*name)?;
        let value = HeaderValue::from_str(value)?;
        headers.insert(name, value);
    }
    Ok(headers)
}

async fn exchange(
    transport: Arc<dyn Transport>,
    request: ComposedRequest,
    timeout: Option<Duration>,
) -> Result<RawResponse, TransportError> {
    let response = transport.send(request);
    match timeout {
        Some(timeout) => tokio::time::timeout(timeout, response)
            .await
            .map_err(|_| TransportError::Timeout { timeout })?,
        None => response.await,
    }
}

impl ApiClient {
    /// Resolves a call into the request the transport will send, without sending it.
    ///
    /// Headers are layered: client default headers, then the endpoint headers,
    /// then `content-type` when a body is present. `accept: application/json` is
    /// added unless already set.
    ///
    /// # Errors
    ///
    /// Every validation error of [`ApiClient::dispatch`].
    pub fn compose_request(
        &self,
        config: &EndpointConfig,
        params: RequestParams,
    ) -> Result<ComposedRequest, ApiClientError> {
        let RequestParams { path, query, body } = params;

        validate_body(config, body.as_ref())?;
        let url = compose(&self.base_url, config.path, &path, &query, config.query)?;

        let mut headers = self.default_headers.clone();
        headers.extend(endpoint_headers(config)?);

        let body = match &body {
            Some(body) => {
                let media_type = codec::media_type(config.media_type)?;
                let (content_type, data) = codec::encode(body, &media_type)?;
                headers.typed_insert(content_type);
                Some(data)
            }
            None => None,
        };

        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        Ok(ComposedRequest {
            method: Method::from(config.method),
            url,
            headers,
            body,
        })
    }

    /// Dispatches one call of an endpoint.
    ///
    /// Parameters are validated and the request composed synchronously; the
    /// exchange itself runs as a task on the current tokio runtime, driven by the
    /// returned [`CancelableOperation`]. Canceling the operation aborts that task.
    ///
    /// Exactly one transport call is made, never retried.
    ///
    /// # Errors
    ///
    /// Fails before any I/O when:
    /// - a path placeholder has no value ([`ApiClientError::MissingPathParam`]),
    /// - parameters or body do not match the endpoint ([`ApiClientError::InvalidRequestParams`]),
    /// - a header or the media type is invalid,
    /// - there is no tokio runtime ([`ApiClientError::NoRuntime`]).
    ///
    /// Failures of the exchange itself settle the operation as
    /// [`Outcome::Failed`](crate::Outcome::Failed).
    pub fn dispatch<R>(
        &self,
        config: &EndpointConfig,
        params: RequestParams,
    ) -> Result<CancelableOperation<R>, ApiClientError>
    where
        R: ResponseBody,
    {
        let request = self.compose_request(config, params)?;
        let transport = Arc::clone(&self.transport);
        let timeout = self.timeout;

        CancelableOperation::spawn(async move {
            debug!(?request, "sending...");
            let response = exchange(transport, request, timeout).await?;
            debug!(?response, "...receiving");
            R::from_response(response)
        })
    }

    /// Dispatches one call of a typed [`Endpoint`].
    ///
    /// # Errors
    ///
    /// See [`ApiClient::dispatch`].
    pub fn call<E>(&self, params: RequestParams) -> Result<CancelableOperation<E::Response>, ApiClientError>
    where
        E: Endpoint,
    {
        self.dispatch(&E::CONFIG, params)
    }
}
