//! Device inventory, discovery and managed-device endpoints.
//!
//! Discovery and managed-device routes sit behind the gateway's doubled
//! `/api/api` prefix; the plain inventory does not.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};

use super::query::{Query, segment};
use super::{ApiClient, ApiError};

const DISCOVERY_BASE: &str = "/api/api/devices/discovery";
const MANAGED_BASE: &str = "/api/api/devices/managed";

/// Sample size used when summarizing the inventory.
pub const STATS_SAMPLE_LIMIT: u32 = 1000;

pub const DEFAULT_REJECT_REASON: &str = "Device rejected by admin";

// =============================================================================
// QUERIES
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct DeviceQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub status_filter: Option<String>,
    pub template_id: Option<String>,
}

impl DeviceQuery {
    fn endpoint(&self) -> String {
        Query::new()
            .push_opt("limit", self.limit)
            .push_opt("offset", self.offset)
            .push_opt("status_filter", self.status_filter.as_deref())
            .push_opt("template_id", self.template_id.as_deref())
            .to_endpoint("/api/devices")
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ManagedQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
}

// =============================================================================
// STATS
// =============================================================================

/// Inventory health summary. `ERROR` devices count as warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub warning: usize,
}

impl DeviceStats {
    #[must_use]
    pub fn from_devices(devices: &[Value]) -> Self {
        let mut stats = Self { total: devices.len(), ..Self::default() };
        for device in devices {
            match device.get("status").and_then(Value::as_str) {
                Some("ONLINE") => stats.online += 1,
                Some("OFFLINE") => stats.offline += 1,
                Some("ERROR") => stats.warning += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Device listings come back bare or wrapped in `{devices|items: [...]}`.
pub(crate) fn as_list(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => ["devices", "items"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

impl ApiClient {
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn devices(&self, query: &DeviceQuery) -> Result<Value, ApiError> {
        tracing::debug!(?query, "listing devices");
        self.get(&query.endpoint()).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn device(&self, device_id: &str) -> Result<Value, ApiError> {
        self.get(&format!("/api/devices/{}", segment(device_id))).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_device(&self, device_id: &str, data: Value) -> Result<Value, ApiError> {
        let endpoint = format!("/api/devices/{}", segment(device_id));
        self.send_json(Method::PUT, &endpoint, Some(data)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_device(&self, device_id: &str) -> Result<Value, ApiError> {
        let endpoint = format!("/api/devices/{}", segment(device_id));
        self.send_json(Method::DELETE, &endpoint, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn assign_device_to_client(&self, device_id: &str, client_id: &str) -> Result<Value, ApiError> {
        let endpoint = format!("/api/devices/{}/assign", segment(device_id));
        self.send_json(Method::PUT, &endpoint, Some(json!({ "client_id": client_id })))
            .await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn unassign_device(&self, device_id: &str) -> Result<Value, ApiError> {
        let endpoint = format!("/api/devices/{}/unassign", segment(device_id));
        self.send_json(Method::PUT, &endpoint, None).await
    }

    /// Summarize up to [`STATS_SAMPLE_LIMIT`] devices by status.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn device_stats(&self) -> Result<DeviceStats, ApiError> {
        let query = DeviceQuery { limit: Some(STATS_SAMPLE_LIMIT), ..DeviceQuery::default() };
        let devices = self.devices(&query).await?;
        let stats = DeviceStats::from_devices(as_list(&devices));
        tracing::debug!(?stats, "device stats calculated");
        Ok(stats)
    }

    // -------------------------------------------------------------------------
    // discovery
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn discovered_devices(&self, query: &DiscoveryQuery) -> Result<Value, ApiError> {
        let endpoint = Query::new()
            .push_opt("status", query.status.as_deref())
            .push_opt("page", query.page)
            .push_opt("page_size", query.page_size)
            .to_endpoint(DISCOVERY_BASE);
        self.get(&endpoint).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn discovery_stats(&self) -> Result<Value, ApiError> {
        self.get(&format!("{DISCOVERY_BASE}/stats")).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn approve_device(&self, device_id: &str, approval: Value) -> Result<Value, ApiError> {
        let endpoint = format!("/api/api/devices/{}/approve", segment(device_id));
        self.send_json(Method::POST, &endpoint, Some(approval)).await
    }

    /// Reject a discovered device; `reason` defaults to [`DEFAULT_REJECT_REASON`].
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn reject_device(&self, device_id: &str, reason: Option<&str>) -> Result<Value, ApiError> {
        let endpoint = format!("/api/api/devices/{}/reject", segment(device_id));
        let reason = reason.unwrap_or(DEFAULT_REJECT_REASON);
        self.send_json(Method::POST, &endpoint, Some(json!({ "reason": reason })))
            .await
    }

    // -------------------------------------------------------------------------
    // managed
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn managed_devices(&self, query: &ManagedQuery) -> Result<Value, ApiError> {
        let endpoint = Query::new()
            .push_opt("page", query.page)
            .push_opt("page_size", query.page_size)
            .push_opt("search", query.search.as_deref())
            .push_opt("status", query.status.as_deref())
            .to_endpoint(MANAGED_BASE);
        self.get(&endpoint).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn managed_devices_stats(&self) -> Result<Value, ApiError> {
        self.get(&format!("{MANAGED_BASE}/stats")).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_managed_device(&self, device_id: &str, data: Value) -> Result<Value, ApiError> {
        let endpoint = format!("{MANAGED_BASE}/{}", segment(device_id));
        self.send_json(Method::PUT, &endpoint, Some(data)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_managed_device(&self, device_id: &str) -> Result<Value, ApiError> {
        let endpoint = format!("{MANAGED_BASE}/{}", segment(device_id));
        self.send_json(Method::DELETE, &endpoint, None).await
    }
}

#[cfg(test)]
#[path = "devices_test.rs"]
mod tests;
