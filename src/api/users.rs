//! Admin user management endpoints.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};

use super::query::segment;
use super::{ApiClient, ApiError};
use crate::identity::Role;

/// Flattened admin account row for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: Value,
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub roles: Vec<Role>,
    pub is_active: Option<bool>,
    pub last_login: Option<String>,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl AccountSummary {
    /// Map one `/admin/users` row. `admin_id` becomes `id`.
    #[must_use]
    pub fn from_admin(user: &Value) -> Self {
        let text = |key: &str| user.get(key).and_then(Value::as_str).map(ToOwned::to_owned);
        Self {
            id: user.get("admin_id").cloned().unwrap_or(Value::Null),
            username: text("username"),
            email: text("email"),
            full_name: text("full_name"),
            roles: text("role").map(Role::from).into_iter().collect(),
            is_active: user.get("is_active").and_then(Value::as_bool),
            last_login: text("last_login"),
            kind: "admin",
        }
    }
}

fn user_path(user_id: &str) -> String {
    format!("/admin/users/{}", segment(user_id))
}

impl ApiClient {
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn users(&self) -> Result<Value, ApiError> {
        self.get("/admin/users").await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn create_user(&self, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::POST, "/admin/users", Some(data)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn update_user(&self, user_id: &str, data: Value) -> Result<Value, ApiError> {
        self.send_json(Method::PUT, &user_path(user_id), Some(data)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_user(&self, user_id: &str) -> Result<Value, ApiError> {
        self.send_json(Method::DELETE, &user_path(user_id), None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn toggle_user_status(&self, user_id: &str, is_active: bool) -> Result<Value, ApiError> {
        let endpoint = format!("{}/status", user_path(user_id));
        self.send_json(Method::PATCH, &endpoint, Some(json!({ "is_active": is_active })))
            .await
    }

    /// All admin accounts as [`AccountSummary`] rows. A non-list response
    /// yields no rows.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn account_summaries(&self) -> Result<Vec<AccountSummary>, ApiError> {
        let users = self.users().await?;
        let rows = users
            .as_array()
            .map(|users| users.iter().map(AccountSummary::from_admin).collect())
            .unwrap_or_default();
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
