//! Client (tenant) management endpoints.

use reqwest::Method;
use serde_json::Value;

use super::query::{Query, segment};
use super::{ApiClient, ApiError};

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub is_active: Option<bool>,
}

impl ClientQuery {
    fn endpoint(self) -> String {
        Query::new()
            .push_opt("skip", self.skip)
            .push_opt("limit", self.limit)
            .push_opt("is_active", self.is_active)
            .to_endpoint("/api/clients")
    }
}

fn client_path(client_id: &str) -> String {
    format!("/api/clients/{}", segment(client_id))
}

impl ApiClient {
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn clients(&self, query: ClientQuery) -> Result<Value, ApiError> {
        self.get(&query.endpoint()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn client(&self, client_id: &str) -> Result<Value, ApiError> {
        self.get(&client_path(client_id)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_client(&self, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/api/clients", Some(data)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_client(&self, client_id: &str, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &client_path(client_id), Some(data)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_client(&self, client_id: &str) -> Result<Value, ApiError> {
        self.send_json(Method::DELETE, &client_path(client_id), None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn client_uuids(&self) -> Result<Value, ApiError> {
        self.get("/api/clients/uuids").await
    }

    /// Number of devices assigned to each client.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn client_device_counts(&self) -> Result<Value, ApiError> {
        self.get("/api/clients/device-counts").await
    }

    /// Ask the backend for a client id that is not yet taken.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn generate_unique_client_id(&self) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/api/clients/generate-unique-id", None)
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn client_devices(&self, client_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/api/device-assignment/clients/{}/devices", segment(client_id)))
            .await
    }
}

#[cfg(test)]
#[path = "clients_test.rs"]
mod tests;
