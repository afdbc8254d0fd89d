use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use serde::Serialize;

use super::param::ParamValue;
use crate::client::ApiClientError;

/// Regular expression for matching path parameters in the format `{param_name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// Everything but the RFC 3986 unreserved characters.
const PATH_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_path_param_value(name: &str, value: String) -> Result<String, ApiClientError> {
    // `%2E` still counts as a dot segment for URL parsers
    if matches!(value.as_str(), "" | "." | "..") {
        return Err(ApiClientError::UnsupportedParameterValue {
            name: name.to_string(),
            message: "path values cannot be empty nor a dot segment".to_string(),
            value: serde_json::Value::String(value),
        });
    }
    Ok(utf8_percent_encode(&value, PATH_VALUE).to_string())
}

/// Path parameters of a call, by placeholder name.
///
/// # Examples
///
/// ```rust
/// use apicall_core::PathParams;
///
/// let path = PathParams::new()
///     .add_param("user_id", 123)
///     .add_param("post_id", "my-post");
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    args: IndexMap<String, ParamValue>,
}

impl PathParams {
    /// Creates an empty set of path parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a path parameter, replacing any previous value with the same name.
    ///
    /// The value must serialize to a string, a number or a boolean; `None` counts as missing.
    pub fn add_param<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Serialize,
    {
        self.args.insert(name.into(), ParamValue::resolve(&value));
        self
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Substitutes every `{name}` placeholder of the template.
    ///
    /// Values are percent-encoded individually, so they never introduce a `/`.
    /// Empty values and the dot segments `.` and `..` are rejected.
    pub(in crate::client) fn resolve(&self, template: &str) -> Result<String, ApiClientError> {
        if RE.replace_all(template, "").contains(['{', '}']) {
            return Err(ApiClientError::invalid_params(format!(
                "path template '{template}' has an unbalanced or invalid placeholder"
            )));
        }

        let names = RE
            .captures_iter(template)
            .filter_map(|caps| caps.name("name"))
            .map(|name| name.as_str())
            .collect::<Vec<_>>();

        if let Some(unknown) = self.args.keys().find(|arg| !names.contains(&arg.as_str())) {
            return Err(ApiClientError::invalid_params(format!(
                "path parameter '{unknown}' is not a placeholder of '{template}'"
            )));
        }

        let mut encoded = HashMap::with_capacity(names.len());
        for name in names {
            let value = self
                .args
                .get(name)
                .map(|value| value.to_path_value(name))
                .transpose()?
                .flatten()
                .ok_or_else(|| ApiClientError::MissingPathParam {
                    name: name.to_string(),
                    template: template.to_string(),
                })?;
            encoded.insert(name, encode_path_param_value(name, value)?);
        }

        let path = RE.replace_all(template, |caps: &Captures<'_>| {
            caps.name("name")
                .and_then(|name| encoded.get(name.as_str()))
                .cloned()
                .unwrap_or_default()
        });
        Ok(path.into_owned())
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Serialize,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |path, (name, value)| path.add_param(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_resolve_path() {
        let path = PathParams::new().add_param("breed", "hound");

        let resolved = path.resolve("/breed/{breed}/images").expect("full resolve");

        insta::assert_snapshot!(resolved, @"/breed/hound/images");
    }

    #[test]
    fn test_resolve_with_multiple_parameters() {
        let path = PathParams::new()
            .add_param("user_id", 123)
            .add_param("post_id", "abc");

        let resolved = path
            .resolve("/users/{user_id}/posts/{post_id}")
            .expect("should resolve");

        assert_eq!(resolved, "/users/123/posts/abc");
    }

    #[test]
    fn test_resolve_with_missing_parameter() {
        let path = PathParams::new().add_param("user_id", 123);

        let result = path.resolve("/users/{user_id}/posts/{post_id}");

        let Err(ApiClientError::MissingPathParam { name, .. }) = result else {
            panic!("should report the missing placeholder");
        };
        assert_eq!(name, "post_id");
    }

    #[test]
    fn test_resolve_treats_none_as_missing() {
        let path = PathParams::new().add_param("id", Option::<u32>::None);

        let result = path.resolve("/users/{id}");

        assert!(matches!(
            result,
            Err(ApiClientError::MissingPathParam { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_unknown_parameter() {
        let path = PathParams::new().add_param("id", 1).add_param("other", 2);

        let result = path.resolve("/users/{id}");

        assert!(matches!(
            result,
            Err(ApiClientError::InvalidRequestParams { .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_invalid_template() {
        let path = PathParams::new().add_param("id", 1);

        let result = path.resolve("/users/{id}/{not-valid}");

        assert!(matches!(
            result,
            Err(ApiClientError::InvalidRequestParams { .. })
        ));
    }

    #[test]
    fn test_resolve_with_url_encoding() {
        let path = PathParams::new().add_param("query", "hello world");

        let resolved = path.resolve("/search/{query}").expect("should resolve");

        assert_eq!(resolved, "/search/hello%20world");
    }

    #[test]
    fn test_resolve_never_introduces_slashes() {
        let path = PathParams::new().add_param("name", "a/b?c#d");

        let resolved = path.resolve("/items/{name}").expect("should resolve");

        insta::assert_snapshot!(resolved, @"/items/a%2Fb%3Fc%23d");
    }

    #[test]
    fn test_resolve_keeps_unreserved_characters() {
        let path = PathParams::new().add_param("name", "test@example.com_v1~x-y");

        let resolved = path.resolve("/items/{name}").expect("should resolve");

        insta::assert_snapshot!(resolved, @"/items/test%40example.com_v1~x-y");
    }

    #[test]
    fn test_resolve_duplicate_placeholders() {
        let path = PathParams::new()
            .add_param("version", "v1")
            .add_param("id", 456);

        let resolved = path
            .resolve("/api/{version}/users/{id}/posts/{id}/comments/{version}")
            .expect("should resolve");

        assert_eq!(resolved, "/api/v1/users/456/posts/456/comments/v1");
    }

    #[test]
    fn test_add_param_overwrites_existing() {
        let path = PathParams::new().add_param("id", 123).add_param("id", 456);

        let resolved = path.resolve("/test/{id}").expect("should resolve");

        assert_eq!(resolved, "/test/456");
    }

    #[test]
    fn test_placeholder_name_is_not_a_prefix_match() {
        let path = PathParams::from_iter([("user_id", 1), ("id", 2)]);

        let resolved = path
            .resolve("/users/{user_id}/posts/{id}")
            .expect("should resolve");

        assert_eq!(resolved, "/users/1/posts/2");
    }

    #[test]
    fn test_template_without_placeholder() {
        let resolved = PathParams::new().resolve("/user").expect("should resolve");

        assert_eq!(resolved, "/user");
    }

    #[test]
    fn test_resolve_rejects_dot_segments() {
        for value in [".", "..", ""] {
            let path = PathParams::new().add_param("id", value);

            let result = path.resolve("/users/{id}/profile");

            assert!(
                matches!(
                    result,
                    Err(ApiClientError::UnsupportedParameterValue { .. })
                ),
                "{value:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_resolve_keeps_dots_inside_a_value() {
        let path = PathParams::new().add_param("file", "...").add_param("v", "1.2");

        let resolved = path.resolve("/files/{file}/{v}").expect("should resolve");

        assert_eq!(resolved, "/files/.../1.2");
    }

    #[test]
    fn test_resolve_reports_unserializable_value() {
        let path = PathParams::new().add_param("id", HashMap::from([((1_u8, 2_u8), 3_u8)]));

        let result = path.resolve("/users/{id}");

        assert!(matches!(
            result,
            Err(ApiClientError::UnserializableParameter { .. })
        ));
    }
}
