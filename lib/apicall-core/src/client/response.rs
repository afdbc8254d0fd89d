//! Typed responses.
//!
//! The response type of an endpoint decides how a non-2xx status is handled:
//!
//! - any plain [`DeserializeOwned`] type turns it into a
//!   [`ApiClientError::UnexpectedStatusCode`] failure,
//! - [`ApiResult<T, E>`] maps it to its `Err` arm through [`FromErrorResponse`],
//!   keeping domain errors as ordinary values.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use mime::Mime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::ApiClientError;
use super::codec;

pub(in crate::client) const BODY_MAX_LENGTH: usize = 1024;

/// The raw response handed back by a [`Transport`](crate::Transport).
#[derive(Clone, derive_more::Debug)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
    #[debug(ignore)]
    body: Bytes,
}

impl RawResponse {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The parsed `content-type` header, if any.
    ///
    /// An unparsable header is treated as absent.
    pub fn content_type(&self) -> Option<Mime> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    /// The body as text for error reports, truncated to a reasonable length.
    pub(in crate::client) fn body_excerpt(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        if text.chars().count() > BODY_MAX_LENGTH {
            let truncated = text.chars().take(BODY_MAX_LENGTH).collect::<String>();
            format!("{truncated}... (truncated)")
        } else {
            text.into_owned()
        }
    }
}

/// Types an endpoint response can be decoded into.
pub trait ResponseBody: Sized + Send + 'static {
    /// Decodes the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error when the status or the body cannot be represented by `Self`.
    fn from_response(response: RawResponse) -> Result<Self, ApiClientError>;
}

impl<T> ResponseBody for T
where
    T: DeserializeOwned + Send + 'static,
{
    fn from_response(response: RawResponse) -> Result<Self, ApiClientError> {
        if !response.status().is_success() {
            return Err(ApiClientError::UnexpectedStatusCode {
                status_code: response.status().as_u16(),
                body: response.body_excerpt(),
            });
        }
        codec::decode(response.body(), response.content_type().as_ref())
    }
}

/// Result of an endpoint that reports domain failures as data.
///
/// Serialized as `{"kind":"Ok","value":..}` or `{"kind":"Err","error":..}`.
/// Being a [`ResponseBody`] itself, it does not implement `Deserialize`: read
/// that form back with [`ApiResult::deserialize_tagged`].
///
/// # Example
///
/// ```rust
/// use apicall_core::ApiResult;
///
/// let result: ApiResult<u32, String> = Ok(42).into();
/// assert_eq!(result.into_result(), Ok(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ApiResult<T, E> {
    /// The call succeeded.
    Ok {
        /// The decoded response.
        value: T,
    },
    /// The endpoint reported a domain error.
    Err {
        /// The mapped error.
        error: E,
    },
}

impl<T, E> ApiResult<T, E> {
    /// Returns `true` for the `Ok` arm.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Returns `true` for the `Err` arm.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Converts into a standard [`Result`].
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Ok { value } => Ok(value),
            Self::Err { error } => Err(error),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename = "ApiResult")]
enum TaggedApiResult<T, E> {
    Ok { value: T },
    Err { error: E },
}

impl<T, E> ApiResult<T, E> {
    /// Reads the `{"kind":..}` form written by `Serialize`.
    ///
    /// Usable as `#[serde(deserialize_with = "ApiResult::deserialize_tagged")]`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apicall_core::ApiResult;
    ///
    /// # fn example() -> Result<(), serde_json::Error> {
    /// let value = serde_json::json!({"kind": "Err", "error": "InvalidPassword"});
    /// let result = ApiResult::<u32, String>::deserialize_tagged(value)?;
    /// assert_eq!(result.into_result(), Err("InvalidPassword".to_string()));
    /// # Ok(())
    /// # }
    /// ```
    pub fn deserialize_tagged<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
        E: Deserialize<'de>,
    {
        let result = match TaggedApiResult::<T, E>::deserialize(deserializer)? {
            TaggedApiResult::Ok { value } => Self::Ok { value },
            TaggedApiResult::Err { error } => Self::Err { error },
        };
        Ok(result)
    }
}

impl<T, E> From<Result<T, E>> for ApiResult<T, E> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(value) => Self::Ok { value },
            Err(error) => Self::Err { error },
        }
    }
}

impl<T, E> ResponseBody for ApiResult<T, E>
where
    T: DeserializeOwned + Send + 'static,
    E: FromErrorResponse + Send + 'static,
{
    fn from_response(response: RawResponse) -> Result<Self, ApiClientError> {
        if response.status().is_success() {
            let value = codec::decode(response.body(), response.content_type().as_ref())?;
            Ok(Self::Ok { value })
        } else {
            let error = E::from_error_response(&response);
            Ok(Self::Err { error })
        }
    }
}

/// Maps a non-2xx response to a domain error.
///
/// The mapping is infallible: whatever the body contains, a value is produced.
pub trait FromErrorResponse: Sized {
    /// Builds the domain error.
    fn from_error_response(response: &RawResponse) -> Self;
}

impl FromErrorResponse for StatusCode {
    fn from_error_response(response: &RawResponse) -> Self {
        response.status()
    }
}

/// Generic domain error: the status and whatever the body held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The body, as JSON when it parses, as a string otherwise, absent when empty.
    pub body: Option<serde_json::Value>,
}

impl FromErrorResponse for ErrorResponse {
    fn from_error_response(response: &RawResponse) -> Self {
        let body = if response.body().is_empty() {
            None
        } else {
            let value = serde_json::from_slice(response.body()).unwrap_or_else(|_| {
                serde_json::Value::String(String::from_utf8_lossy(response.body()).into_owned())
            });
            Some(value)
        };

        Self {
            status: response.status().as_u16(),
            body,
        }
    }
}
