//! Query-string and path-segment helpers for endpoint builders.

use std::borrow::Cow;

/// Ordered query parameters. Absent and empty values are skipped.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.to_owned(), value));
        }
        self
    }

    #[must_use]
    pub fn push_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append the encoded query to `path`, or return `path` unchanged.
    #[must_use]
    pub fn to_endpoint(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_owned();
        }
        let encoded = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{encoded}")
    }
}

/// Percent-encode an id for use as a single path segment.
#[must_use]
pub fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
