//! Edge relay endpoints: system probes and the relay's own admin surface
//! (clients, local servers, cameras, alerts, config).

use reqwest::Method;
use serde_json::Value;

use super::query::{Query, segment};
use super::{ApiClient, ApiError};

const RELAY_ADMIN: &str = "/api/admin";

fn relay_path(resource: &str, id: &str) -> String {
    format!("{RELAY_ADMIN}/{resource}/{}", segment(id))
}

impl ApiClient {
    // -------------------------------------------------------------------------
    // system
    // -------------------------------------------------------------------------

    /// `GET /health`. Relays answer with plain text or JSON.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get("/health").await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn system_info(&self) -> Result<Value, ApiError> {
        self.get("/api/info").await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn system_status(&self) -> Result<Value, ApiError> {
        self.get("/api/status").await
    }

    // -------------------------------------------------------------------------
    // relay clients
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn relay_clients(&self) -> Result<Value, ApiError> {
        self.get(&format!("{RELAY_ADMIN}/clients")).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_relay_client(&self, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::POST, &format!("{RELAY_ADMIN}/clients"), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_relay_client(&self, client_id: &str, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &relay_path("clients", client_id), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_relay_client(&self, client_id: &str) -> Result<Value, ApiError> {
        self.send_json(Method::DELETE, &relay_path("clients", client_id), None)
            .await
    }

    // -------------------------------------------------------------------------
    // local servers
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn local_servers(&self) -> Result<Value, ApiError> {
        self.get(&format!("{RELAY_ADMIN}/servers")).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_local_server(&self, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::POST, &format!("{RELAY_ADMIN}/servers"), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_local_server(&self, server_id: &str, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &relay_path("servers", server_id), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_local_server(&self, server_id: &str) -> Result<Value, ApiError> {
        self.send_json(Method::DELETE, &relay_path("servers", server_id), None)
            .await
    }

    // -------------------------------------------------------------------------
    // cameras
    // -------------------------------------------------------------------------

    /// Cameras across all servers, or only those behind `server_id`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn cameras(&self, server_id: Option<&str>) -> Result<Value, ApiError> {
        let endpoint = Query::new()
            .push_opt("server_id", server_id)
            .to_endpoint(&format!("{RELAY_ADMIN}/cameras"));
        self.get(&endpoint).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_camera(&self, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::POST, &format!("{RELAY_ADMIN}/cameras"), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_camera(&self, camera_id: &str, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &relay_path("cameras", camera_id), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_camera(&self, camera_id: &str) -> Result<Value, ApiError> {
        self.send_json(Method::DELETE, &relay_path("cameras", camera_id), None)
            .await
    }

    // -------------------------------------------------------------------------
    // alerts
    // -------------------------------------------------------------------------

    /// Alerts matching `filters`, passed through as query parameters in order.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn alerts(&self, filters: &[(&str, &str)]) -> Result<Value, ApiError> {
        let endpoint = filters
            .iter()
            .fold(Query::new(), |query, (key, value)| query.push(key, value))
            .to_endpoint(&format!("{RELAY_ADMIN}/alerts"));
        self.get(&endpoint).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_alert(&self, alert_id: &str, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &relay_path("alerts", alert_id), Some(data))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_alert(&self, alert_id: &str) -> Result<Value, ApiError> {
        self.send_json(Method::DELETE, &relay_path("alerts", alert_id), None)
            .await
    }

    // -------------------------------------------------------------------------
    // config
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn system_config(&self) -> Result<Value, ApiError> {
        self.get(&format!("{RELAY_ADMIN}/config")).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_system_config(&self, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &format!("{RELAY_ADMIN}/config"), Some(data))
            .await
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
