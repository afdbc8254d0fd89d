use indexmap::IndexMap;
use serde::Serialize;
use url::form_urlencoded;

use super::param::ParamValue;
use crate::client::ApiClientError;

/// Query parameters of a call.
///
/// Values may be primitives or sequences of primitives. A sequence produces one
/// `name=value` pair per item, in order; `None` values are omitted entirely.
///
/// # Examples
///
/// ```rust
/// use apicall_core::QueryParams;
///
/// let query = QueryParams::new()
///     .add_param("search", "hello world")
///     .add_param("page", Some(2))
///     .add_param("limit", Option::<u32>::None)
///     .add_param("tags", vec!["rust", "web"]);
/// // would be rendered as: search=hello+world&page=2&tags=rust&tags=web
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: IndexMap<String, ParamValue>,
}

impl QueryParams {
    /// Creates an empty set of query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter, replacing any previous value with the same name.
    pub fn add_param<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Serialize,
    {
        self.params.insert(name.into(), ParamValue::resolve(&value));
        self
    }

    /// Builds query parameters from the fields of a serializable struct or map.
    ///
    /// Fields keep their declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not serialize to a JSON object.
    pub fn from_serialize<T>(value: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value)? {
            serde_json::Value::Object(fields) => {
                let params = fields
                    .into_iter()
                    .map(|(name, value)| (name, ParamValue::from_json(value)))
                    .collect();
                Ok(Self { params })
            }
            other => Err(ApiClientError::UnsupportedParameterValue {
                name: "<query>".to_string(),
                message: "query parameters must be built from a struct or a map".to_string(),
                value: other,
            }),
        }
    }

    /// Number of parameters, absent ones included.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Renders the query string, without the leading `?`.
    ///
    /// Pairs follow `declared` when it is not empty (and any other name is rejected),
    /// insertion order otherwise. Returns `None` when no pair is produced.
    pub(in crate::client) fn to_query_string(
        &self,
        declared: &[&str],
    ) -> Result<Option<String>, ApiClientError> {
        let ordered: Vec<(&str, &ParamValue)> = if declared.is_empty() {
            self.params
                .iter()
                .map(|(name, value)| (name.as_str(), value))
                .collect()
        } else {
            if let Some(unknown) = self
                .params
                .keys()
                .find(|name| !declared.contains(&name.as_str()))
            {
                return Err(ApiClientError::invalid_params(format!(
                    "query parameter '{unknown}' is not declared by the endpoint"
                )));
            }
            declared
                .iter()
                .filter_map(|name| self.params.get(*name).map(|value| (*name, value)))
                .collect()
        };

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        let mut written = false;
        for (name, value) in ordered {
            if value.is_absent() {
                continue;
            }
            for item in value.to_query_values(name)? {
                serializer.append_pair(name, &item);
                written = true;
            }
        }

        Ok(written.then(|| serializer.finish()))
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Serialize,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |query, (name, value)| query.add_param(name, value))
    }
}
