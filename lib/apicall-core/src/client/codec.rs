//! Request body encoding and response body decoding.
//!
//! Whether a body is already serialized text or a structured value is declared
//! by the endpoint ([`BodyKind`](crate::BodyKind)) and carried by [`CallBody`];
//! the codec never guesses from the runtime value, so a pre-serialized string
//! is never encoded twice.

use bytes::Bytes;
use headers::ContentType;
use mime::Mime;
use serde::de::DeserializeOwned;

use super::{ApiClientError, CallBody};

/// Media type used when an endpoint declares none.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json; charset=utf-8";

/// Parses the media type declared by an endpoint, falling back to [`DEFAULT_MEDIA_TYPE`].
///
/// # Errors
///
/// Returns [`ApiClientError::InvalidMediaType`] when the declaration cannot be parsed.
pub fn media_type(declared: Option<&str>) -> Result<Mime, ApiClientError> {
    let media_type = declared.unwrap_or(DEFAULT_MEDIA_TYPE);
    media_type
        .parse()
        .map_err(|_| ApiClientError::InvalidMediaType {
            media_type: media_type.to_string(),
        })
}

fn is_json(media_type: &Mime) -> bool {
    media_type.subtype() == mime::JSON || media_type.suffix() == Some(mime::JSON)
}

fn is_form(media_type: &Mime) -> bool {
    media_type.type_() == mime::APPLICATION && media_type.subtype() == mime::WWW_FORM_URLENCODED
}

/// Encodes a request body for the given media type.
///
/// - [`CallBody::Raw`] is sent as is,
/// - [`CallBody::Json`] is serialized as JSON, or as form data for
///   `application/x-www-form-urlencoded`.
///
/// # Errors
///
/// Returns [`ApiClientError::SerializationError`] when a structured value cannot be
/// represented in the media type.
pub fn encode(body: &CallBody, media_type: &Mime) -> Result<(ContentType, Bytes), ApiClientError> {
    let content_type = ContentType::from(media_type.clone());

    let data = match body {
        CallBody::Raw(text) => Bytes::from(text.clone()),
        CallBody::Json(value) if is_json(media_type) => Bytes::from(serde_json::to_vec(value)?),
        CallBody::Json(value) if is_form(media_type) => {
            let form = serde_urlencoded::to_string(value).map_err(|err| {
                ApiClientError::SerializationError {
                    message: format!("Failed to serialize form data: {err}"),
                }
            })?;
            Bytes::from(form)
        }
        CallBody::Json(_) => {
            return Err(ApiClientError::SerializationError {
                message: format!("cannot serialize a structured body as '{media_type}'"),
            });
        }
    };

    Ok((content_type, data))
}

/// Decodes a response body into `T`.
///
/// JSON (or an absent content type) is parsed as JSON, an empty body being `null`.
/// Any other content type is read as text and presented to `T` as a JSON string.
///
/// # Errors
///
/// - [`ApiClientError::MalformedResponseBody`] when the bytes are not valid for the
///   content type,
/// - [`ApiClientError::SchemaMismatch`] when the value does not fit `T`.
pub fn decode<T>(body: &[u8], content_type: Option<&Mime>) -> Result<T, ApiClientError>
where
    T: DeserializeOwned,
{
    let value = match content_type {
        Some(content_type) if !is_json(content_type) => {
            let text = std::str::from_utf8(body).map_err(|err| {
                ApiClientError::MalformedResponseBody {
                    content_type: content_type.to_string(),
                    error: err.to_string(),
                }
            })?;
            serde_json::Value::String(text.to_string())
        }
        _ if body.is_empty() => serde_json::Value::Null,
        _ => serde_json::from_slice(body).map_err(|err| ApiClientError::MalformedResponseBody {
            content_type: content_type.map_or_else(
                || mime::APPLICATION_JSON.to_string(),
                ToString::to_string,
            ),
            error: err.to_string(),
        })?,
    };

    serde_path_to_error::deserialize(value).map_err(|err| ApiClientError::SchemaMismatch {
        path: err.path().to_string(),
        error: err.into_inner(),
    })
}
