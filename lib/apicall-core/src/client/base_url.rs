//! Base URL handling and request URL composition.

use std::fmt;
use std::str::FromStr;

use url::Url;

use super::ApiClientError;
use super::parameters::{PathParams, QueryParams};

/// The absolute URL every endpoint path is relative to.
///
/// Only `http` and `https` URLs with a host are accepted, without query nor fragment.
/// A path prefix (`http://localhost:3000/api`) is kept in front of every endpoint path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Parses and validates a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidBaseUrl`] when the URL cannot serve as a base.
    pub fn parse(url: &str) -> Result<Self, ApiClientError> {
        let invalid = |reason: String| ApiClientError::InvalidBaseUrl {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }
        if parsed.host().is_none() {
            return Err(invalid("missing host".to_string()));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid(
                "a base URL cannot have a query or a fragment".to_string(),
            ));
        }

        Ok(Self(parsed))
    }

    /// The underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl FromStr for BaseUrl {
    type Err = ApiClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for BaseUrl {
    type Error = ApiClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Collapses runs of `/`, keeping a leading and a trailing one.
fn normalize_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut previous_slash = false;
    for ch in path.chars() {
        let is_slash = ch == '/';
        if !(is_slash && previous_slash) {
            result.push(ch);
        }
        previous_slash = is_slash;
    }
    result
}

/// Builds the full URL of a call.
///
/// The resolved path template is joined to the base URL path with exactly one
/// `/` between them, and the query string (if any) is appended.
///
/// # Errors
///
/// Fails like [`PathParams`] resolution and [`QueryParams`] rendering do.
///
/// # Example
///
/// ```rust
/// use apicall_core::{BaseUrl, PathParams, QueryParams, compose};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let base = BaseUrl::parse("http://localhost:3000/")?;
/// let path = PathParams::new().add_param("post", 7);
/// let query = QueryParams::new().add_param("draft", true);
///
/// let url = compose(&base, "/backend/user/{post}", &path, &query, &[])?;
/// assert_eq!(url.as_str(), "http://localhost:3000/backend/user/7?draft=true");
/// # Ok(())
/// # }
/// ```
pub fn compose(
    base: &BaseUrl,
    template: &str,
    path: &PathParams,
    query: &QueryParams,
    declared_query: &[&str],
) -> Result<Url, ApiClientError> {
    let resolved = path.resolve(template)?;
    let query = query.to_query_string(declared_query)?;

    let base_url = base.as_url();
    let joined = format!(
        "{}/{}",
        base_url.path().trim_end_matches('/'),
        resolved.trim_start_matches('/')
    );

    let mut url = base_url.clone();
    url.set_path(&normalize_path(&joined));
    url.set_query(query.as_deref());

    Ok(url)
}
