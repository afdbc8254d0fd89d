//! # Apicall Core
//!
//! The request-dispatch core behind generated, typed HTTP endpoint functions.
//!
//! A code generator emits one small function per endpoint. Each of them owns a
//! static [`EndpointConfig`] (method, path template, body kind, media type) and
//! forwards its arguments to [`ApiClient::dispatch`]. This crate does the rest:
//!
//! - composes the URL from the base URL, the path template and the query parameters,
//! - encodes the body per the declared media type,
//! - runs the exchange through a [`Transport`] on the current tokio runtime,
//! - decodes the response into the declared type, domain errors included,
//! - hands back a [`CancelableOperation`], awaitable and cancelable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apicall_core::{
//!     ApiClient, ApiClientError, ApiResult, CancelableOperation, Endpoint, EndpointConfig,
//!     Outcome, RequestParams,
//! };
//! use http::StatusCode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct Auth {
//!     email: String,
//!     password: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct AuthResponse {
//!     token: String,
//! }
//!
//! // What a generator emits for `POST /user/login`
//! struct UserLogin;
//!
//! impl Endpoint for UserLogin {
//!     const CONFIG: EndpointConfig = EndpointConfig::post("/user/login").with_json_body();
//!     type Response = ApiResult<AuthResponse, StatusCode>;
//! }
//!
//! fn user_login(
//!     client: &ApiClient,
//!     body: &Auth,
//! ) -> Result<CancelableOperation<ApiResult<AuthResponse, StatusCode>>, ApiClientError> {
//!     client.call::<UserLogin>(RequestParams::new().with_json_body(body)?)
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::builder()
//!     .with_base_url("http://localhost:3000")?
//!     .build()?;
//!
//! let auth = Auth {
//!     email: "jo@example.com".to_string(),
//!     password: "hunter2".to_string(),
//! };
//! match user_login(&client, &auth)?.await {
//!     Outcome::Settled(ApiResult::Ok { value }) => println!("token: {}", value.token),
//!     Outcome::Settled(ApiResult::Err { error }) => println!("rejected with {error}"),
//!     Outcome::Failed(error) => eprintln!("call failed: {error}"),
//!     Outcome::Canceled => {}
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Cancellation
//!
//! Every dispatch returns a [`CancelableOperation`]. Canceling it (directly, through
//! a [`CancelHandle`], or by dropping it) aborts the in-flight exchange; a response
//! arriving afterwards is discarded. Exactly one of settle, fail or cancel takes
//! effect.
//!
//! ## Errors
//!
//! Parameter problems ([`ApiClientError::MissingPathParam`],
//! [`ApiClientError::InvalidRequestParams`]) are reported by `dispatch` itself,
//! before any I/O. Transport and decoding problems settle the operation as
//! [`Outcome::Failed`]. Non-2xx responses are either domain errors (with
//! [`ApiResult`]) or [`ApiClientError::UnexpectedStatusCode`].

mod client;

pub use self::client::codec;
pub use self::client::{
    ApiClient, ApiClientBuilder, ApiClientError, ApiResult, BaseUrl, BodyKind, CallBody,
    CancelHandle, CancelableOperation, ComposedRequest, Endpoint, EndpointConfig, ErrorResponse,
    FromErrorResponse, HttpMethod, OperationState, Outcome, PathParams, QueryParams, RawResponse,
    RequestParams, ReqwestTransport, ResponseBody, Settler, Transport, TransportError,
    TransportFuture, compose,
};
