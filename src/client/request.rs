//! Request descriptions and decoded responses.

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;

use crate::{Error, Result};

/// Where a request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path appended to the configured base URL
    Path(String),
    /// Absolute URL used as-is
    Uri(String),
}

/// Everything needed to issue one logical API call.
///
/// # Example
///
/// ```
/// use directory_client::RequestSpec;
///
/// let spec = RequestSpec::get("/users")
///     .query("status", "active")
///     .field("include", "groups");
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub(crate) method: Method,
    pub(crate) target: Target,
    pub(crate) options: Vec<(String, String)>,
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) body: Option<Value>,
    pub(crate) headers: Option<HeaderMap>,
}

impl RequestSpec {
    /// A request to `path` under the base URL.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self::with_target(method, Target::Path(path.into()))
    }

    /// A request to an absolute URL, bypassing the base URL.
    pub fn absolute(method: Method, uri: impl Into<String>) -> Self {
        Self::with_target(method, Target::Uri(uri.into()))
    }

    fn with_target(method: Method, target: Target) -> Self {
        Self {
            method,
            target,
            options: Vec::new(),
            fields: Vec::new(),
            body: None,
            headers: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Shorthand for a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a query option.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.options.push((key.into(), value.to_string()));
        self
    }

    /// Add several query options.
    pub fn queries<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.options
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Add a GET-only extra query parameter.
    ///
    /// Sending a spec with fields and any other method fails with
    /// [`Error::Config`].
    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Set a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Send these headers instead of the default authenticated ones.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Replace a query option, dropping any earlier values for `key`.
    pub(crate) fn set_query(&mut self, key: &str, value: impl ToString) {
        self.options.retain(|(k, _)| k != key);
        self.options.push((key.to_string(), value.to_string()));
    }

    /// Compose the final URL: base or absolute target, then options and
    /// fields as one query string.
    pub(crate) fn resolve_url(&self, base_api_url: &str) -> Result<String> {
        if !self.fields.is_empty() && self.method != Method::GET {
            return Err(Error::Config(format!(
                "fields are only allowed on GET requests, not {}",
                self.method
            )));
        }

        let mut url = match &self.target {
            Target::Uri(uri) if !uri.is_empty() => {
                url::Url::parse(uri)?;
                uri.clone()
            }
            Target::Path(path) if !path.is_empty() => format!("{base_api_url}{path}"),
            _ => return Err(Error::Config("request needs a path or uri".to_string())),
        };

        let pairs: Vec<&(String, String)> =
            self.options.iter().chain(self.fields.iter()).collect();
        if !pairs.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        Ok(url)
    }
}

/// A decoded successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The body parsed as JSON
    Json(Value),
    /// The server returned an empty body
    NoContent,
}

impl Response {
    pub(crate) fn from_body(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Ok(Response::NoContent);
        }
        let text = std::str::from_utf8(body).map_err(|e| {
            Error::UnexpectedResponse(format!("response body is not UTF-8: {e}"))
        })?;
        Ok(Response::Json(serde_json::from_str(text)?))
    }

    /// The JSON body, or `None` for an empty response.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Response::Json(v) => Some(v),
            Response::NoContent => None,
        }
    }

    /// The JSON body, treating an empty response as an error.
    pub fn json(self) -> Result<Value> {
        self.into_json()
            .ok_or_else(|| Error::UnexpectedResponse("expected a JSON body".to_string()))
    }

    /// Whether the server returned no content.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Response::NoContent)
    }
}
