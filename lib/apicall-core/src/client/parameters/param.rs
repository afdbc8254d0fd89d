use serde::Serialize;

use crate::client::error::ApiClientError;

/// A parameter value, serialized once to JSON when added to the call.
///
/// Only primitives (strings, numbers, booleans) and, for query parameters,
/// sequences of primitives can be rendered in a URL. `null` stands for an
/// absent value. A serialization failure is kept, and reported when the URL
/// is composed.
#[derive(Debug, Clone, PartialEq)]
pub(in crate::client) struct ParamValue {
    value: Result<serde_json::Value, String>,
}

impl ParamValue {
    pub(in crate::client) fn resolve<T>(value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|err| err.to_string());
        Self { value }
    }

    pub(in crate::client) fn from_json(value: serde_json::Value) -> Self {
        Self { value: Ok(value) }
    }

    pub(in crate::client) fn is_absent(&self) -> bool {
        matches!(self.value, Ok(serde_json::Value::Null))
    }

    fn json(&self, name: &str) -> Result<&serde_json::Value, ApiClientError> {
        self.value
            .as_ref()
            .map_err(|message| ApiClientError::UnserializableParameter {
                name: name.to_string(),
                message: message.clone(),
            })
    }

    fn primitive_to_string(
        name: &str,
        value: &serde_json::Value,
    ) -> Result<String, ApiClientError> {
        match value {
            serde_json::Value::String(text) => Ok(text.clone()),
            serde_json::Value::Number(number) => Ok(number.to_string()),
            serde_json::Value::Bool(flag) => Ok(flag.to_string()),
            serde_json::Value::Null => Ok(String::new()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Err(ApiClientError::UnsupportedParameterValue {
                    name: name.to_string(),
                    message: "nested complex values not supported in parameters".to_string(),
                    value: value.clone(),
                })
            }
        }
    }

    /// Renders the value of a path parameter.
    ///
    /// Returns `None` for an absent value.
    pub(in crate::client) fn to_path_value(
        &self,
        name: &str,
    ) -> Result<Option<String>, ApiClientError> {
        match self.json(name)? {
            serde_json::Value::Null => Ok(None),
            value @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Err(ApiClientError::UnsupportedParameterValue {
                    name: name.to_string(),
                    message: "path parameters must be primitive values".to_string(),
                    value: value.clone(),
                })
            }
            value => Self::primitive_to_string(name, value).map(Some),
        }
    }

    /// Renders the values of a query parameter, one per `name=value` pair.
    ///
    /// Sequences are repeated in order, absent values (and absent items) are omitted.
    pub(in crate::client) fn to_query_values(
        &self,
        name: &str,
    ) -> Result<Vec<String>, ApiClientError> {
        match self.json(name)? {
            serde_json::Value::Null => Ok(vec![]),
            serde_json::Value::Array(items) => {
                let mut result = Vec::with_capacity(items.len());
                for item in items.iter().filter(|item| !item.is_null()) {
                    result.push(Self::primitive_to_string(name, item)?);
                }
                Ok(result)
            }
            value @ serde_json::Value::Object(_) => Err(ApiClientError::UnsupportedParameterValue {
                name: name.to_string(),
                message: "object values not supported in query parameters".to_string(),
                value: value.clone(),
            }),
            value => Self::primitive_to_string(name, value).map(|text| vec![text]),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn param(value: serde_json::Value) -> ParamValue {
        ParamValue::from_json(value)
    }

    #[test]
    fn test_resolve_primitives() {
        let number = ParamValue::resolve(&7);
        let text = ParamValue::resolve("hound");
        let none = ParamValue::resolve(&Option::<u32>::None);

        assert_eq!(number, param(json!(7)));
        assert_eq!(text, param(json!("hound")));
        assert!(none.is_absent());
    }

    #[test]
    fn test_to_path_value() {
        assert_eq!(
            param(json!(7)).to_path_value("post").expect("primitive"),
            Some("7".to_string())
        );
        assert_eq!(
            param(json!(true)).to_path_value("flag").expect("primitive"),
            Some("true".to_string())
        );
        assert_eq!(param(json!(null)).to_path_value("post").expect("absent"), None);
    }

    #[test]
    fn test_to_path_value_rejects_sequences() {
        let result = param(json!(["a", "b"])).to_path_value("tags");

        insta::assert_snapshot!(
            result.expect_err("should reject"),
            @r#"Unsupported value for parameter 'tags': path parameters must be primitive values. Got: ["a","b"]"#
        );
    }

    #[test]
    fn test_to_query_values() {
        assert_eq!(
            param(json!("rust")).to_query_values("q").expect("primitive"),
            vec!["rust"]
        );
        assert_eq!(
            param(json!(["rust", null, 3, false]))
                .to_query_values("tags")
                .expect("sequence"),
            vec!["rust", "3", "false"]
        );
        assert!(
            param(json!(null))
                .to_query_values("page")
                .expect("absent")
                .is_empty()
        );
    }

    #[test]
    fn test_to_query_values_rejects_nested_values() {
        assert!(param(json!({"a": 1})).to_query_values("filter").is_err());
        assert!(param(json!([[1, 2]])).to_query_values("matrix").is_err());
    }

    #[test]
    fn test_unserializable_value_is_reported_on_render() {
        let filter = HashMap::from([((1_u8, 2_u8), 3_u8)]);
        let value = ParamValue::resolve(&filter);

        assert!(!value.is_absent());
        insta::assert_snapshot!(
            value.to_query_values("filter").expect_err("should report"),
            @"Parameter 'filter' cannot be serialized: key must be a string"
        );
        assert!(matches!(
            value.to_path_value("filter"),
            Err(ApiClientError::UnserializableParameter { .. })
        ));
    }
}
