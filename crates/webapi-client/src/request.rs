//! Request descriptors and the fluent request builder

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::content::RequestContent;
use crate::error::Result;

/// The supported HTTP request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMethod {
    /// HTTP GET
    #[default]
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
}

impl RequestMethod {
    /// Whether a request body is attached for this method
    pub(crate) fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    pub(crate) fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A query string value: text or a number
///
/// Numbers render with Rust's default formatting: locale independent, no
/// grouping separators (`3.5` renders as the literal `3.5`).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Text value, rendered as-is
    Text(String),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for QueryValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

/// The information required to compose one API request
///
/// The optional accessors default to `None`; absent and empty collections are
/// equivalent at every read site.
pub trait ApiRequest {
    /// The request method
    fn method(&self) -> RequestMethod;

    /// The request path, resolved against the client's base URI
    fn path(&self) -> &str;

    /// Query string parameters, if any were set
    fn query_params(&self) -> Option<&BTreeMap<String, QueryValue>> {
        None
    }

    /// Request headers, if any were set
    fn headers(&self) -> Option<&BTreeMap<String, String>> {
        None
    }

    /// Request content, attached only for POST and PUT
    fn content(&self) -> Option<&RequestContent> {
        None
    }
}

/// An immutable request descriptor produced by [`RequestBuilder::build`]
#[derive(Debug, Clone)]
pub struct Request {
    method: RequestMethod,
    path: String,
    query_params: Option<BTreeMap<String, QueryValue>>,
    headers: Option<BTreeMap<String, String>>,
    content: Option<RequestContent>,
}

impl ApiRequest for Request {
    fn method(&self) -> RequestMethod {
        self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query_params(&self) -> Option<&BTreeMap<String, QueryValue>> {
        self.query_params.as_ref()
    }

    fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }

    fn content(&self) -> Option<&RequestContent> {
        self.content.as_ref()
    }
}

/// Fluent builder for [`Request`] descriptors
///
/// Query and header maps are allocated lazily: a built descriptor on which no
/// parameters or headers were added exposes `None` collections.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: RequestMethod,
    path: String,
    query_params: Option<BTreeMap<String, QueryValue>>,
    headers: Option<BTreeMap<String, String>>,
    content: Option<RequestContent>,
}

impl RequestBuilder {
    /// Create a builder for a GET request with an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request method
    pub fn method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the request path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Add one query string parameter
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query_params
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add multiple query string parameters
    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        let map = self.query_params.get_or_insert_with(BTreeMap::new);
        for (key, value) in params {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Add one request header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add multiple request headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = self.headers.get_or_insert_with(BTreeMap::new);
        for (key, value) in headers {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Attach a JSON body serialized from `payload`
    pub fn json_body<B>(mut self, payload: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        self.content = Some(RequestContent::json(payload)?);
        Ok(self)
    }

    /// Attach an already-constructed content strategy
    pub fn content(mut self, content: RequestContent) -> Self {
        self.content = Some(content);
        self
    }

    /// Produce the immutable request descriptor
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            query_params: self.query_params,
            headers: self.headers,
            content: self.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = RequestBuilder::new().path("users").build();

        assert_eq!(request.method(), RequestMethod::Get);
        assert_eq!(request.path(), "users");
        assert!(request.query_params().is_none());
        assert!(request.headers().is_none());
        assert!(request.content().is_none());
    }

    #[test]
    fn test_builder_lazy_maps_allocate_on_first_entry() {
        let request = RequestBuilder::new()
            .path("users")
            .query_param("limit", 10)
            .header("X-Custom", "abc")
            .build();

        let params = request.query_params().expect("params were added");
        assert_eq!(params.get("limit"), Some(&QueryValue::Integer(10)));
        let headers = request.headers().expect("headers were added");
        assert_eq!(headers.get("X-Custom").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_numeric_query_value_renders_invariant() {
        assert_eq!(QueryValue::from(3.5).to_string(), "3.5");
        assert_eq!(QueryValue::from(3.0).to_string(), "3");
        assert_eq!(QueryValue::from(1_000_000).to_string(), "1000000");
        assert_eq!(QueryValue::from("plain").to_string(), "plain");
    }

    #[test]
    fn test_builder_bulk_setters() {
        let request = RequestBuilder::new()
            .method(RequestMethod::Delete)
            .path("things/1")
            .query_params([("a", 1), ("b", 2)])
            .headers([("X-One", "1"), ("X-Two", "2")])
            .build();

        assert_eq!(request.method(), RequestMethod::Delete);
        assert_eq!(request.query_params().map(BTreeMap::len), Some(2));
        assert_eq!(request.headers().map(BTreeMap::len), Some(2));
    }

    #[test]
    fn test_json_body_sets_content() {
        let request = RequestBuilder::new()
            .method(RequestMethod::Post)
            .path("users")
            .json_body(&serde_json::json!({"name": "test"}))
            .expect("JSON body should serialize")
            .build();

        match request.content() {
            Some(RequestContent::Json(value)) => {
                assert_eq!(value, &serde_json::json!({"name": "test"}));
            }
            other => panic!("Expected JSON content, got {other:?}"),
        }
    }

    #[test]
    fn test_trait_defaults_mean_absent() {
        struct PingRequest;

        impl ApiRequest for PingRequest {
            fn method(&self) -> RequestMethod {
                RequestMethod::Get
            }

            fn path(&self) -> &str {
                "ping"
            }
        }

        let request = PingRequest;
        assert!(request.query_params().is_none());
        assert!(request.headers().is_none());
        assert!(request.content().is_none());
    }
}
