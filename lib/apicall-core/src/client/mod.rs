use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;

mod builder;
pub use self::builder::ApiClientBuilder;

mod base_url;
pub use self::base_url::{BaseUrl, compose};

pub mod codec;

mod dispatch;

mod endpoint;
pub use self::endpoint::{BodyKind, Endpoint, EndpointConfig, HttpMethod};

mod error;
pub use self::error::ApiClientError;

mod operation;
pub use self::operation::{CancelHandle, CancelableOperation, OperationState, Outcome, Settler};

mod parameters;
pub use self::parameters::{CallBody, PathParams, QueryParams, RequestParams};

mod response;
pub use self::response::{ApiResult, ErrorResponse, FromErrorResponse, RawResponse, ResponseBody};

mod transport;
pub use self::transport::{
    ComposedRequest, ReqwestTransport, Transport, TransportError, TransportFuture,
};

/// Dispatches endpoint calls against one base URL.
///
/// Generated endpoint functions take an `ApiClient` and an argument set, and call
/// [`ApiClient::dispatch`] (or [`ApiClient::call`]) with their static
/// [`EndpointConfig`]. Use [`ApiClientBuilder`] to create instances.
///
/// Cloning is cheap: clones share the same transport.
///
/// # Example
///
/// ```rust,no_run
/// use apicall_core::{ApiClient, EndpointConfig, RequestParams};
/// # use serde::Deserialize;
/// # #[derive(Deserialize)]
/// # struct User { id: u32, name: String }
///
/// const GET_USER: EndpointConfig = EndpointConfig::get("/users/{id}");
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_base_url("https://api.example.com")?
///     .build()?;
///
/// let params = RequestParams::new().with_path_param("id", 123);
/// let user = client.dispatch::<User>(&GET_USER, params)?.await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: BaseUrl,
    transport: Arc<dyn Transport>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

// Create
impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }
}

impl ApiClient {
    /// The base URL endpoint paths are resolved against.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }
}
