//! Authenticated REST client for the platform admin API.
//!
//! DESIGN
//! ======
//! `ApiClient::request` is the single choke point: it joins `base_url` and
//! the endpoint, merges headers, and normalizes the three success shapes
//! (no content, JSON, text) plus the error payload conventions of the
//! backends (`{"detail": ..}` from the device services, `{"message": ..}`
//! from the relay). Resource modules only build endpoints and bodies.
//!
//! TOKEN OWNERSHIP
//! ===============
//! The client exclusively owns the bearer token. Every mutation is mirrored
//! to storage under [`TOKEN_KEY`]; reads never touch storage.

pub mod auth;
pub mod clients;
pub mod devices;
pub mod error;
pub mod query;
pub mod relay;
pub mod types;
pub mod users;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{AdminConfig, Timeouts};
use crate::storage::{SessionStorage, StorageError};

pub use error::ApiError;
pub use types::{ApiResponse, RequestOptions};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "admin_token";

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client and pick up any token already in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or storage
    /// cannot be read.
    pub fn new(base_url: &str, timeouts: Timeouts, storage: Arc<dyn SessionStorage>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(timeouts.connect_secs));
        if let Some(secs) = timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;

        let token = storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let base_url = crate::config::normalize_base_url(base_url);
        tracing::debug!(%base_url, has_token = token.is_some(), "api client initialized");

        Ok(Self { http, base_url, token: RwLock::new(token), storage })
    }

    /// # Errors
    ///
    /// See [`ApiClient::new`].
    pub fn from_config(config: &AdminConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, ApiError> {
        Self::new(&config.base_url, config.timeouts, storage)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -------------------------------------------------------------------------
    // token
    // -------------------------------------------------------------------------

    /// Hold `token` and mirror it to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage mirror fails; the in-memory token is
    /// updated regardless.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token.to_owned());
        self.storage.set(TOKEN_KEY, token)
    }

    /// Drop the token and remove it from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage mirror fails; the in-memory token is
    /// cleared regardless.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        self.storage.remove(TOKEN_KEY)
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    fn headers(&self, extra: &HeaderMap) -> Result<HeaderMap, ApiError> {
        let mut headers = extra.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.token().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    // -------------------------------------------------------------------------
    // requests
    // -------------------------------------------------------------------------

    /// Issue a request to `base_url + endpoint`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Network`] on transport failure
    /// - [`ApiError::Http`] on a non-success status, with the best message
    ///   the body offers
    /// - [`ApiError::Decode`] if a JSON body does not parse
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(%url, method = %options.method, "api request");

        let headers = self.headers(&options.headers)?;
        let mut request = self.http.request(options.method, &url).headers(headers);
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, %url, "api request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), %url, "api response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error::error_message(status, &body);
            tracing::warn!(status = status.as_u16(), %url, %message, "api request rejected");
            return Err(ApiError::Http { status: status.as_u16(), message });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::NoContent);
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json") || ct.contains("+json"));

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !is_json {
            return Ok(ApiResponse::Text { status: status.as_u16(), body: text });
        }
        if text.trim().is_empty() {
            return Ok(ApiResponse::NoContent);
        }

        let data = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(error = %e, %url, "api response is not valid JSON");
            ApiError::Decode(e.to_string())
        })?;
        Ok(ApiResponse::Json { status: status.as_u16(), data })
    }

    /// Request and collapse the response into a JSON value (`Null` for 204).
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn send_json(&self, method: Method, endpoint: &str, body: Option<Value>) -> Result<Value, ApiError> {
        let mut options = RequestOptions::default().with_method(method);
        options.body = body;
        Ok(self.request(endpoint, options).await?.into_value())
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.send_json(Method::GET, endpoint, None).await
    }

    /// Request and decode a typed body. `Ok(None)` for no content.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; text bodies and shape mismatches are
    /// [`ApiError::Decode`].
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Option<T>, ApiError> {
        match self.request(endpoint, options).await? {
            ApiResponse::NoContent => Ok(None),
            ApiResponse::Json { data, .. } => serde_json::from_value(data)
                .map(Some)
                .map_err(|e| ApiError::Decode(e.to_string())),
            ApiResponse::Text { status, .. } => Err(ApiError::Decode(format!(
                "expected JSON body, got non-JSON content (status {status})"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
