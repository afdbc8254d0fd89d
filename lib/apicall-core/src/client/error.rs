use super::transport::TransportError;

/// Errors that can occur when dispatching an endpoint call.
///
/// Validation failures (`MissingPathParam`, `InvalidRequestParams`, header and
/// media type problems) are returned synchronously by
/// [`ApiClient::dispatch`](crate::ApiClient::dispatch), before any network activity.
/// Everything that depends on I/O settles the
/// [`CancelableOperation`](crate::CancelableOperation) as failed instead.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// The transport could not complete the exchange.
    ///
    /// Network failures, connection resets and timeouts end up here.
    TransportError(TransportError),

    /// Invalid HTTP header name, either from the client defaults or an endpoint.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value, either from the client defaults or an endpoint.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error.
    ///
    /// Occurs when a request body or a parameter cannot be converted to JSON.
    JsonValueError(serde_json::Error),

    /// A placeholder of the path template has no value.
    #[display("Path '{template}' is missing a value for '{{{name}}}'")]
    #[from(skip)]
    MissingPathParam {
        /// Name of the placeholder.
        name: String,
        /// The endpoint path template.
        template: String,
    },

    /// The call parameters do not match the endpoint declaration.
    #[display("Invalid request parameters: {reason}")]
    #[from(skip)]
    InvalidRequestParams {
        /// Why the parameters were rejected.
        reason: String,
    },

    /// The response body cannot be read as its media type.
    #[display("Malformed response body ({content_type}): {error}")]
    #[from(skip)]
    MalformedResponseBody {
        /// The media type used to read the body.
        content_type: String,
        /// What went wrong while reading.
        error: String,
    },

    /// The response body was parsed but does not match the expected shape.
    #[display("Response body does not match the expected shape at '{path}': {error}")]
    #[from(skip)]
    SchemaMismatch {
        /// Path of the offending value inside the body.
        path: String,
        /// The underlying deserialization error.
        error: serde_json::Error,
    },

    /// Server returned a non-2xx status for an endpoint without a domain error type.
    #[display("Unexpected status code {status_code}: {body}")]
    #[from(skip)]
    UnexpectedStatusCode {
        /// The HTTP status code received.
        status_code: u16,
        /// The response body for debugging, truncated.
        body: String,
    },

    /// The base URL cannot be used to build request URLs.
    #[display("Invalid base URL '{url}': {reason}")]
    #[from(skip)]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The endpoint declares a media type that cannot be parsed.
    #[display("Invalid media type: {media_type}")]
    #[from(skip)]
    InvalidMediaType {
        /// The declared media type.
        media_type: String,
    },

    /// Request body serialization failed.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
    },

    /// A parameter value cannot be rendered in a URL.
    #[display("Unsupported value for parameter '{name}': {message}. Got: {value}")]
    #[from(skip)]
    UnsupportedParameterValue {
        /// The parameter name.
        name: String,
        /// Why the value is not supported.
        message: String,
        /// The offending value.
        value: serde_json::Value,
    },

    /// A parameter value could not be serialized.
    #[display("Parameter '{name}' cannot be serialized: {message}")]
    #[from(skip)]
    UnserializableParameter {
        /// The parameter name.
        name: String,
        /// The serialization failure.
        message: String,
    },

    /// `dispatch` was called outside of a tokio runtime.
    #[display("No tokio runtime available to drive the request")]
    #[from(skip)]
    NoRuntime,
}

impl ApiClientError {
    pub(in crate::client) fn invalid_params(reason: impl Into<String>) -> Self {
        Self::InvalidRequestParams {
            reason: reason.into(),
        }
    }
}
