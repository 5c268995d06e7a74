//! Transport-neutral HTTP request/response model used by the interceptor
//! and the remote sink.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;

/// Per-request flags attached by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Opt this request out of interceptor observation
    pub disable_logging: bool,
}

/// Outbound request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(Value),
    /// Plain text
    Text(String),
    /// Raw bytes of a known content type
    Bytes {
        /// MIME type sent as `Content-Type`
        content_type: String,
        /// Body bytes
        data: Vec<u8>,
    },
    /// An uploaded file
    File {
        /// File name reported to the server
        name: String,
        /// MIME type of the file
        content_type: String,
        /// File content
        data: Vec<u8>,
    },
    /// URL-encoded form fields
    Form(Vec<(String, String)>),
}

/// Outbound HTTP request as seen by the interceptor
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL without query parameters
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Query parameters, appended to the URL on send
    pub params: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
    /// Per-request flags read by the interceptor
    pub context: RequestContext,
}

impl HttpRequest {
    /// Request with an empty body and no headers
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            params: Vec::new(),
            body: RequestBody::Empty,
            context: RequestContext::default(),
        }
    }

    /// `GET` request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// `POST` request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add a header. Invalid names or values are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn with_json(self, value: Value) -> Self {
        self.with_body(RequestBody::Json(value))
    }

    /// Mark the request so the interceptor passes it through unobserved.
    #[must_use]
    pub const fn without_logging(mut self) -> Self {
        self.context.disable_logging = true;
        self
    }

    /// Query parameters in `a=1&b=two%20words` form.
    pub fn params_string(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let Ok(mut scratch) = Url::parse("http://params.invalid/") else {
            return String::new();
        };
        scratch
            .query_pairs_mut()
            .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        scratch.query().unwrap_or_default().to_string()
    }
}

/// Successful HTTP response with its full body
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Final URL after redirects
    pub url: String,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Canonical reason phrase, empty when unknown
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// `Content-Type` header value, empty when absent
    pub fn content_type(&self) -> String {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }
}

/// Failed exchange: either an error status from the server or a transport
/// failure (status 0).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("HTTP failure {status} {status_text} for {url}: {message}")]
pub struct HttpErrorResponse {
    /// HTTP status, 0 for transport failures
    pub status: u16,
    /// Reason phrase, `Unknown Error` for transport failures
    pub status_text: String,
    /// URL of the failed request
    pub url: String,
    /// Human-readable description
    pub message: String,
    /// Parsed error body, when the server sent JSON
    pub error: Option<Value>,
}

impl HttpErrorResponse {
    /// Transport-level failure with no HTTP status
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: "Unknown Error".to_string(),
            url: url.into(),
            message: message.into(),
            error: None,
        }
    }

    /// Error built from a non-success response; the body is kept as JSON when
    /// it parses, otherwise as a string.
    pub fn from_response(response: &HttpResponse) -> Self {
        let error = if response.body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&response.body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&response.body).into_owned())
            }))
        };
        Self {
            status: response.status.as_u16(),
            status_text: response.status_text().to_string(),
            url: response.url.clone(),
            message: format!(
                "Http failure response for {}: {} {}",
                response.url,
                response.status.as_u16(),
                response.status_text()
            ),
            error,
        }
    }
}
