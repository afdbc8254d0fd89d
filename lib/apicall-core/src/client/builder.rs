use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use super::transport::{ReqwestTransport, Transport};
use super::{ApiClient, ApiClientError, BaseUrl};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:80/";

/// Builder for creating [`ApiClient`] instances.
///
/// # Default Configuration
///
/// - **Base URL**: `http://127.0.0.1:80/`
/// - **Transport**: [`ReqwestTransport`] over a default `reqwest::Client`
/// - **Default headers**: none
/// - **Timeout**: none, the transport's own limits apply
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use apicall_core::ApiClient;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_base_url("https://api.example.com/v1")?
///     .with_header("x-api-key", "secret")?
///     .with_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    base_url: BaseUrl,
    transport: Option<Arc<dyn Transport>>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Builds the final `ApiClient`.
    ///
    /// # Errors
    ///
    /// Currently infallible once the builder methods succeeded; the `Result`
    /// keeps room for checks that need the whole configuration.
    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let Self {
            base_url,
            transport,
            default_headers,
            timeout,
        } = self;

        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::default()),
        };

        Ok(ApiClient {
            base_url,
            transport,
            default_headers,
            timeout,
        })
    }

    /// Sets the base URL every endpoint path is relative to.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidBaseUrl`] if the URL is not an absolute
    /// `http`/`https` URL without query nor fragment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use apicall_core::ApiClient;
    ///
    /// let builder = ApiClient::builder().with_base_url("http://localhost:3000");
    /// assert!(builder.is_ok());
    ///
    /// let builder = ApiClient::builder().with_base_url("localhost:3000/?debug");
    /// assert!(builder.is_err());
    /// ```
    pub fn with_base_url<U>(mut self, base_url: U) -> Result<Self, ApiClientError>
    where
        U: TryInto<BaseUrl, Error = ApiClientError>,
    {
        self.base_url = base_url.try_into()?;
        Ok(self)
    }

    /// Uses a custom [`Transport`].
    pub fn with_transport(mut self, transport: impl Transport) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses the default transport over an already configured `reqwest::Client`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::time::Duration;
    ///
    /// use apicall_core::ApiClient;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let http = reqwest::Client::builder()
    ///     .connect_timeout(Duration::from_secs(2))
    ///     .build()?;
    ///
    /// let client = ApiClient::builder().with_reqwest_client(http).build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_reqwest_client(self, client: reqwest::Client) -> Self {
        self.with_transport(ReqwestTransport::new(client))
    }

    /// Adds a header sent with every call.
    ///
    /// Endpoint headers with the same name take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or the value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiClientError> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Limits the duration of each exchange.
    ///
    /// An exchange exceeding it fails with [`TransportError::Timeout`](crate::TransportError::Timeout).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        let base_url = BaseUrl::parse(DEFAULT_BASE_URL)
            .unwrap_or_else(|err| unreachable!("default base URL is valid: {err}"));

        Self {
            base_url,
            transport: None,
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }
}
