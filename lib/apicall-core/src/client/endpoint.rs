//! Static endpoint descriptions.
//!
//! A generated endpoint function is a thin adapter: it owns one `const`
//! [`EndpointConfig`] and turns its arguments into [`RequestParams`](crate::RequestParams).
//!
//! ```rust
//! use apicall_core::{
//!     ApiClient, ApiClientError, ApiResult, CancelableOperation, Endpoint, EndpointConfig,
//!     RequestParams,
//! };
//! use http::StatusCode;
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Serialize)]
//! # struct Auth { email: String, password: String }
//! # #[derive(Deserialize)]
//! # struct AuthResponse { token: String }
//!
//! struct UserLogin;
//!
//! impl Endpoint for UserLogin {
//!     const CONFIG: EndpointConfig = EndpointConfig::post("/user/login").with_json_body();
//!     type Response = ApiResult<AuthResponse, StatusCode>;
//! }
//!
//! pub fn user_login(
//!     client: &ApiClient,
//!     body: &Auth,
//! ) -> Result<CancelableOperation<ApiResult<AuthResponse, StatusCode>>, ApiClientError> {
//!     client.call::<UserLogin>(RequestParams::new().with_json_body(body)?)
//! }
//! ```

use std::fmt;

use http::Method;

use super::response::ResponseBody;

/// HTTP methods an endpoint can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `CONNECT`
    Connect,
    /// `PATCH`
    Patch,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Whether a request with this method may carry a body.
    pub const fn allows_body(self) -> bool {
        !matches!(self, Self::Head | Self::Options | Self::Connect | Self::Trace)
    }
}

impl From<HttpMethod> for Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Connect => Self::CONNECT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Trace => Self::TRACE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Method::from(*self), f)
    }
}

/// The kind of body an endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum BodyKind {
    /// No body.
    #[default]
    #[display("no")]
    None,
    /// Already serialized text, sent as is.
    #[display("raw")]
    Raw,
    /// A structured value serialized by the codec.
    #[display("structured")]
    Json,
}

/// Immutable description of one endpoint.
///
/// Built once, in a `const`, by each generated function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointConfig {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The path template, with `{name}` placeholders, relative to the base URL.
    pub path: &'static str,
    /// The request media type, `application/json; charset=utf-8` when `None`.
    pub media_type: Option<&'static str>,
    /// The expected body.
    pub body: BodyKind,
    /// Declared query parameter names; query strings follow this order.
    ///
    /// When empty, any query parameter is accepted and insertion order is used.
    pub query: &'static [&'static str],
    /// Headers sent with every call.
    pub headers: &'static [(&'static str, &'static str)],
}

impl EndpointConfig {
    /// Creates a configuration without body, query declaration or fixed headers.
    pub const fn new(method: HttpMethod, path: &'static str) -> Self {
        Self {
            method,
            path,
            media_type: None,
            body: BodyKind::None,
            query: &[],
            headers: &[],
        }
    }

    /// A `GET` endpoint.
    pub const fn get(path: &'static str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// A `POST` endpoint.
    pub const fn post(path: &'static str) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// A `PUT` endpoint.
    pub const fn put(path: &'static str) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// A `DELETE` endpoint.
    pub const fn delete(path: &'static str) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// A `PATCH` endpoint.
    pub const fn patch(path: &'static str) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Declares the request media type.
    pub const fn with_media_type(self, media_type: &'static str) -> Self {
        Self {
            media_type: Some(media_type),
            ..self
        }
    }

    /// Declares an already serialized body.
    pub const fn with_raw_body(self) -> Self {
        Self {
            body: BodyKind::Raw,
            ..self
        }
    }

    /// Declares a structured body.
    pub const fn with_json_body(self) -> Self {
        Self {
            body: BodyKind::Json,
            ..self
        }
    }

    /// Declares the query parameter names, in order.
    pub const fn with_query(self, query: &'static [&'static str]) -> Self {
        Self { query, ..self }
    }

    /// Declares headers sent with every call.
    pub const fn with_headers(self, headers: &'static [(&'static str, &'static str)]) -> Self {
        Self { headers, ..self }
    }
}

/// A typed endpoint: its configuration plus its response type.
pub trait Endpoint {
    /// The static configuration.
    const CONFIG: EndpointConfig;

    /// What the response decodes into.
    ///
    /// Use [`ApiResult`](crate::ApiResult) to get non-2xx responses as domain errors.
    type Response: ResponseBody;
}
