// HTTP request view and response sink

use std::collections::HashMap;

/// Immutable view of an incoming request
#[derive(Debug, Clone, Default)]
pub struct WebRequest {
    pub method: String,
    /// Absolute request path, including the context prefix
    pub path: String,
    /// Deployment context prefix, empty when deployed at the root
    pub context_path: String,
    pub headers: HashMap<String, String>,
    params: HashMap<String, Vec<String>>,
}

impl WebRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Append one value to a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Append the parameters of a URL-encoded query string
    pub fn with_query(self, query: &str) -> Result<Self, crate::Error> {
        self.with_urlencoded(query)
    }

    /// Append the parameters of a form-encoded body
    pub fn with_form_body(self, body: &[u8]) -> Result<Self, crate::Error> {
        let body = std::str::from_utf8(body)
            .map_err(|e| crate::Error::Http(format!("Form body is not UTF-8: {}", e)))?;
        self.with_urlencoded(body)
    }

    fn with_urlencoded(mut self, encoded: &str) -> Result<Self, crate::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded)
            .map_err(|e| crate::Error::Http(format!("Malformed parameters: {}", e)))?;
        for (name, value) in pairs {
            self.params.entry(name).or_default().push(value);
        }
        Ok(self)
    }

    /// All values supplied for a parameter, in order
    pub fn param_values(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }

    /// First value supplied for a parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, Vec<String>> {
        &self.params
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Destination for a response body
pub trait ResponseSink: Send {
    fn write(&mut self, body: &str);
}

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::ok()
    }
}

impl ResponseSink for HttpResponse {
    fn write(&mut self, body: &str) {
        self.body.extend_from_slice(body.as_bytes());
    }
}
