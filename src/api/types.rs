//! Request envelope and normalized response.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::error::ApiError;

// =============================================================================
// REQUEST
// =============================================================================

/// Per-call request options. Built fresh for every call, never persisted.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self { method: Method::GET, headers: HeaderMap::new(), body: None }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post(body: Value) -> Self {
        Self::default().with_method(Method::POST).with_body(body)
    }

    #[must_use]
    pub fn put(body: Value) -> Self {
        Self::default().with_method(Method::PUT).with_body(body)
    }

    #[must_use]
    pub fn patch(body: Value) -> Self {
        Self::default().with_method(Method::PATCH).with_body(body)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::default().with_method(Method::DELETE)
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a caller header. `Content-Type` and `Authorization` are always
    /// overwritten by the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not a legal header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Normalized outcome of a successful request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// `204 No Content`: the null result.
    NoContent,
    /// JSON body.
    Json { status: u16, data: Value },
    /// Body declared as something other than JSON, returned verbatim.
    Text { status: u16, body: String },
}

impl ApiResponse {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::NoContent => 204,
            Self::Json { status, .. } | Self::Text { status, .. } => *status,
        }
    }

    #[must_use]
    pub fn is_no_content(&self) -> bool {
        matches!(self, Self::NoContent)
    }

    /// Collapse into a JSON value: `Null` for no content, `String` for text.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::NoContent => Value::Null,
            Self::Json { data, .. } => data,
            Self::Text { body, .. } => Value::String(body),
        }
    }
}
