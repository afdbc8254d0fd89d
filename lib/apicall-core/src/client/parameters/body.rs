use serde::Serialize;

use crate::client::ApiClientError;
use crate::client::endpoint::BodyKind;

/// The body of a call.
///
/// The two variants are the two ways generated functions hand over a payload:
/// text that is already serialized, and a structured value the codec serializes.
/// Which one an endpoint expects is declared by its [`BodyKind`].
///
/// # Examples
///
/// ```rust
/// use apicall_core::CallBody;
/// # use serde::Serialize;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// #[derive(Serialize)]
/// struct Auth {
///     email: String,
///     password: String,
/// }
///
/// let auth = Auth {
///     email: "user@example.com".to_string(),
///     password: "secret".to_string(),
/// };
///
/// let typed = CallBody::json(&auth)?;
/// let raw = CallBody::raw(r#"{"email":"user@example.com","password":"secret"}"#);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CallBody {
    /// Text sent as is.
    Raw(String),
    /// A structured value serialized according to the endpoint media type.
    Json(serde_json::Value),
}

impl CallBody {
    /// Creates a body from already serialized text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::Raw(text.into())
    }

    /// Creates a structured body from a serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted to JSON.
    pub fn json<T>(value: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)?;
        Ok(Self::Json(value))
    }

    /// The kind of body, as an endpoint would declare it.
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Raw(_) => BodyKind::Raw,
            Self::Json(_) => BodyKind::Json,
        }
    }
}
