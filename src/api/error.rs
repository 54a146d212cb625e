//! API client errors.

use reqwest::StatusCode;
use serde_json::Value;

use crate::storage::StorageError;

/// Errors produced by [`super::ApiClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, refused connection, timeout.
    #[error("network request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A response body could not be decoded into the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A header name or value is not valid on the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Mirroring the token into storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// HTTP status for `Http` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Best available message for a failed response.
///
/// Prefers the body's `detail`, then `message`; falls back to
/// `HTTP <status>: <reason>`. Structured `detail` payloads (validation error
/// lists) are rendered as compact JSON.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message"] {
            match map.get(key) {
                Some(Value::String(text)) if !text.is_empty() => return text.clone(),
                Some(value @ (Value::Array(_) | Value::Object(_))) => return value.to_string(),
                _ => {}
            }
        }
    }
    let reason = status.canonical_reason().unwrap_or_default();
    format!("HTTP {}: {reason}", status.as_u16()).trim_end().to_owned()
}
