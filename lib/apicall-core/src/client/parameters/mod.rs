//! Per-call parameters.
//!
//! - [`PathParams`] - values for the `{name}` placeholders of the path template
//! - [`QueryParams`] - query string parameters
//! - [`CallBody`] - request body content
//! - [`RequestParams`] - all of the above for one call

use serde::Serialize;

mod param;

mod path;
pub use self::path::PathParams;

mod query;
pub use self::query::QueryParams;

mod body;
pub use self::body::CallBody;

use super::ApiClientError;

/// Everything a single call supplies on top of its endpoint configuration.
///
/// Owned by the call that builds it and consumed by
/// [`ApiClient::dispatch`](crate::ApiClient::dispatch).
///
/// # Example
///
/// ```rust
/// use apicall_core::RequestParams;
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = RequestParams::new()
///     .with_path_param("post", 7)
///     .with_query_param("tags", vec!["rust", "web"])
///     .with_json_body(&serde_json::json!({"a": 1}))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestParams {
    pub(in crate::client) path: PathParams,
    pub(in crate::client) query: QueryParams,
    pub(in crate::client) body: Option<CallBody>,
}

impl RequestParams {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path parameter.
    pub fn with_path_param<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Serialize,
    {
        self.path = self.path.add_param(name, value);
        self
    }

    /// Replaces all path parameters.
    pub fn with_path(mut self, path: PathParams) -> Self {
        self.path = path;
        self
    }

    /// Adds a query parameter.
    pub fn with_query_param<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Serialize,
    {
        self.query = self.query.add_param(name, value);
        self
    }

    /// Replaces all query parameters.
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Sets an already serialized body.
    pub fn with_raw_body(self, text: impl Into<String>) -> Self {
        self.with_body(CallBody::raw(text))
    }

    /// Sets a structured body.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be converted to JSON.
    pub fn with_json_body<T>(self, value: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let body = CallBody::json(value)?;
        Ok(self.with_body(body))
    }

    /// Sets the body.
    pub fn with_body(mut self, body: CallBody) -> Self {
        self.body = Some(body);
        self
    }

    /// The path parameters.
    pub fn path(&self) -> &PathParams {
        &self.path
    }

    /// The query parameters.
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// The body, if any.
    pub fn body(&self) -> Option<&CallBody> {
        self.body.as_ref()
    }
}
